//! Token Safety Scoring
//!
//! Point-weighted risk model over public market and chain data:
//!
//! | Component          | Max |
//! |--------------------|-----|
//! | Holder concentration | 40 |
//! | Mint authority     | 20  |
//! | Liquidity          | 20  |
//! | Volume / liquidity | 10  |
//! | Transaction cadence| 10  |
//!
//! Scoring is a pure function of its inputs. Tier thresholds live in
//! [`ScoringPolicy`] so they can be tuned from configuration.

use serde::{Deserialize, Serialize};

use super::error::AnalysisError;
use super::holders::{validate_concentration, HolderAnalysis, MintAuthorities};
use super::market_pair::MarketPair;

pub const MAX_CONCENTRATION_POINTS: u8 = 40;
pub const MAX_MINT_AUTHORITY_POINTS: u8 = 20;
pub const MAX_LIQUIDITY_POINTS: u8 = 20;
pub const MAX_VOLUME_RATIO_POINTS: u8 = 10;
pub const MAX_CADENCE_POINTS: u8 = 10;

/// Threshold/points pair for a single-metric tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub threshold: f64,
    pub points: u8,
}

impl Tier {
    pub const fn new(threshold: f64, points: u8) -> Self {
        Self { threshold, points }
    }
}

/// Transaction cadence tier: both bounds must hold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadenceTier {
    /// Inclusive lower bound on transactions per hour
    pub min_tx_per_hour: f64,
    /// Exclusive lower bound on average trade size in USD
    pub min_avg_trade_usd: f64,
    pub points: u8,
}

/// Tunable thresholds for the safety score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Top-10 concentration tiers, first with `pct < threshold` wins
    pub concentration_tiers: Vec<Tier>,
    /// Points awarded when mint authority is revoked
    pub mint_revoked_points: u8,
    /// Liquidity tiers, first with `liquidity > threshold` wins
    pub liquidity_tiers: Vec<Tier>,
    /// Volume/liquidity percentage tiers, first with `ratio > threshold` wins
    pub volume_ratio_tiers: Vec<Tier>,
    /// Cadence tiers, first matching wins
    pub cadence_tiers: Vec<CadenceTier>,
    /// Minimum score for the low-risk tier
    pub low_risk_min_score: u8,
    /// Minimum score for the medium-risk tier
    pub medium_risk_min_score: u8,
    /// Liquidity below this raises a critical note
    pub low_liquidity_alert_usd: f64,
    /// Concentration above this raises a critical note
    pub critical_concentration_pct: f64,
    /// Concentration above this raises a warning note
    pub warning_concentration_pct: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            concentration_tiers: vec![
                Tier::new(30.0, 40),
                Tier::new(50.0, 30),
                Tier::new(70.0, 20),
                Tier::new(90.0, 10),
            ],
            mint_revoked_points: MAX_MINT_AUTHORITY_POINTS,
            liquidity_tiers: vec![
                Tier::new(500_000.0, 20),
                Tier::new(100_000.0, 15),
                Tier::new(50_000.0, 10),
                Tier::new(10_000.0, 5),
            ],
            volume_ratio_tiers: vec![
                Tier::new(100.0, 10),
                Tier::new(50.0, 7),
                Tier::new(20.0, 5),
            ],
            cadence_tiers: vec![
                CadenceTier { min_tx_per_hour: 50.0, min_avg_trade_usd: 100.0, points: 10 },
                CadenceTier { min_tx_per_hour: 20.0, min_avg_trade_usd: 50.0, points: 7 },
                CadenceTier { min_tx_per_hour: 5.0, min_avg_trade_usd: 20.0, points: 5 },
            ],
            low_risk_min_score: 70,
            medium_risk_min_score: 50,
            low_liquidity_alert_usd: 10_000.0,
            critical_concentration_pct: 80.0,
            warning_concentration_pct: 60.0,
        }
    }
}

impl ScoringPolicy {
    /// Reject policies that could break the 0-100 score range or tier monotonicity
    pub fn validate(&self) -> Result<(), String> {
        check_points("concentration", &self.concentration_tiers, MAX_CONCENTRATION_POINTS)?;
        check_points("liquidity", &self.liquidity_tiers, MAX_LIQUIDITY_POINTS)?;
        check_points("volume_ratio", &self.volume_ratio_tiers, MAX_VOLUME_RATIO_POINTS)?;

        if self.mint_revoked_points > MAX_MINT_AUTHORITY_POINTS {
            return Err(format!(
                "mint_revoked_points must be <= {}, got {}",
                MAX_MINT_AUTHORITY_POINTS, self.mint_revoked_points
            ));
        }

        if self.concentration_tiers.windows(2).any(|w| w[0].threshold > w[1].threshold) {
            return Err("concentration tiers must have ascending thresholds".to_string());
        }
        if self.liquidity_tiers.windows(2).any(|w| w[0].threshold < w[1].threshold) {
            return Err("liquidity tiers must have descending thresholds".to_string());
        }
        if self.volume_ratio_tiers.windows(2).any(|w| w[0].threshold < w[1].threshold) {
            return Err("volume_ratio tiers must have descending thresholds".to_string());
        }

        for tier in &self.cadence_tiers {
            if tier.points > MAX_CADENCE_POINTS {
                return Err(format!(
                    "cadence tier points must be <= {}, got {}",
                    MAX_CADENCE_POINTS, tier.points
                ));
            }
            if !tier.min_tx_per_hour.is_finite() || !tier.min_avg_trade_usd.is_finite() {
                return Err("cadence tier thresholds must be finite".to_string());
            }
        }
        if self.cadence_tiers.windows(2).any(|w| w[0].points < w[1].points) {
            return Err("cadence tiers must have descending points".to_string());
        }

        if self.medium_risk_min_score > self.low_risk_min_score {
            return Err(format!(
                "medium_risk_min_score ({}) must not exceed low_risk_min_score ({})",
                self.medium_risk_min_score, self.low_risk_min_score
            ));
        }
        if self.warning_concentration_pct > self.critical_concentration_pct {
            return Err("warning_concentration_pct must not exceed critical_concentration_pct".to_string());
        }

        Ok(())
    }
}

fn check_points(name: &str, tiers: &[Tier], max: u8) -> Result<(), String> {
    if let Some(tier) = tiers.iter().find(|t| t.points > max) {
        return Err(format!("{} tier points must be <= {}, got {}", name, max, tier.points));
    }
    if tiers.windows(2).any(|w| w[0].points < w[1].points) {
        return Err(format!("{} tiers must have descending points", name));
    }
    if tiers.iter().any(|t| !t.threshold.is_finite()) {
        return Err(format!("{} tier thresholds must be finite", name));
    }
    Ok(())
}

/// Categorical risk derived from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a rationale note
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteSeverity {
    Positive,
    Info,
    Warning,
    Critical,
}

/// One line of human-readable rationale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyNote {
    pub severity: NoteSeverity,
    pub message: String,
}

impl SafetyNote {
    fn new(severity: NoteSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Points per scoring component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub concentration: u8,
    pub mint_authority: u8,
    pub liquidity: u8,
    pub volume_ratio: u8,
    pub tx_cadence: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        self.concentration
            .saturating_add(self.mint_authority)
            .saturating_add(self.liquidity)
            .saturating_add(self.volume_ratio)
            .saturating_add(self.tx_cadence)
    }
}

/// Metrics the score is computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyMetrics {
    pub liquidity_usd: f64,
    pub volume_24h: f64,
    pub txns_24h: u64,
    /// Top-10 holder share of supply in percent
    pub top_holders_pct: f64,
    pub mint_authority_revoked: bool,
    pub freeze_authority_revoked: bool,
}

impl SafetyMetrics {
    /// Gather metrics from the fetched pair, holders and mint state
    pub fn collect(pair: &MarketPair, holders: &HolderAnalysis, authorities: &MintAuthorities) -> Self {
        Self {
            liquidity_usd: pair.liquidity_usd,
            volume_24h: pair.volume_24h,
            txns_24h: pair.txns_24h(),
            top_holders_pct: holders.top_holders_pct,
            mint_authority_revoked: authorities.mint_revoked(),
            freeze_authority_revoked: authorities.freeze_revoked(),
        }
    }

    /// 24h volume as a percentage of liquidity (0 without liquidity)
    pub fn volume_ratio_pct(&self) -> f64 {
        if self.liquidity_usd <= 0.0 {
            return 0.0;
        }
        self.volume_24h / self.liquidity_usd * 100.0
    }

    /// Average transactions per hour over 24h
    pub fn tx_per_hour(&self) -> f64 {
        self.txns_24h as f64 / 24.0
    }

    /// Average USD per transaction (0 without transactions)
    pub fn avg_trade_usd(&self) -> f64 {
        if self.txns_24h == 0 {
            return 0.0;
        }
        self.volume_24h / self.txns_24h as f64
    }
}

/// Result of a safety analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSafetyAnalysis {
    pub token_address: String,
    pub symbol: Option<String>,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    /// Total supply in whole tokens
    pub total_supply: f64,
    pub metrics: SafetyMetrics,
    pub breakdown: ScoreBreakdown,
    /// 0-100, higher is safer
    pub score: u8,
    pub risk: RiskTier,
    pub notes: Vec<SafetyNote>,
}

impl TokenSafetyAnalysis {
    /// Notes at warning level or above
    pub fn red_flags(&self) -> impl Iterator<Item = &SafetyNote> {
        self.notes.iter().filter(|n| n.severity >= NoteSeverity::Warning)
    }
}

/// Scoring engine
#[derive(Debug, Clone, Default)]
pub struct SafetyScorer {
    policy: ScoringPolicy,
}

impl SafetyScorer {
    /// Create a scorer with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score `token_address` from its best pair, holder breakdown and mint
    /// state. The token may sit on either side of the pair.
    pub fn score(
        &self,
        token_address: &str,
        pair: &MarketPair,
        holders: &HolderAnalysis,
        authorities: &MintAuthorities,
    ) -> Result<TokenSafetyAnalysis, AnalysisError> {
        let metrics = SafetyMetrics::collect(pair, holders, authorities);
        let (breakdown, notes) = self.evaluate(&metrics)?;
        let score = breakdown.total();

        Ok(TokenSafetyAnalysis {
            token_address: token_address.to_string(),
            symbol: pair.token(token_address).map(|t| t.symbol.clone()),
            mint_authority: authorities.mint_authority.clone(),
            freeze_authority: authorities.freeze_authority.clone(),
            total_supply: holders.total_supply,
            metrics,
            breakdown,
            score,
            risk: self.risk_tier(score),
            notes,
        })
    }

    /// Score raw metrics without the surrounding token context
    pub fn score_metrics(&self, metrics: &SafetyMetrics) -> Result<(ScoreBreakdown, RiskTier), AnalysisError> {
        let (breakdown, _) = self.evaluate(metrics)?;
        Ok((breakdown, self.risk_tier(breakdown.total())))
    }

    fn evaluate(&self, metrics: &SafetyMetrics) -> Result<(ScoreBreakdown, Vec<SafetyNote>), AnalysisError> {
        check_amount("liquidity", metrics.liquidity_usd)?;
        check_amount("24h volume", metrics.volume_24h)?;
        let top_pct = validate_concentration(metrics.top_holders_pct)?;

        let breakdown = ScoreBreakdown {
            concentration: self.concentration_points(top_pct),
            mint_authority: if metrics.mint_authority_revoked {
                self.policy.mint_revoked_points
            } else {
                0
            },
            liquidity: first_above(&self.policy.liquidity_tiers, metrics.liquidity_usd),
            volume_ratio: first_above(&self.policy.volume_ratio_tiers, metrics.volume_ratio_pct()),
            tx_cadence: self.cadence_points(metrics.tx_per_hour(), metrics.avg_trade_usd()),
        };

        let notes = self.rationale(metrics, top_pct, &breakdown);
        Ok((breakdown, notes))
    }

    /// Map a total score to a risk tier
    pub fn risk_tier(&self, score: u8) -> RiskTier {
        if score >= self.policy.low_risk_min_score {
            RiskTier::Low
        } else if score >= self.policy.medium_risk_min_score {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    /// Points for a top-10 concentration percentage
    pub fn concentration_points(&self, pct: f64) -> u8 {
        self.policy
            .concentration_tiers
            .iter()
            .find(|t| pct < t.threshold)
            .map(|t| t.points)
            .unwrap_or(0)
    }

    /// Points for transaction cadence
    pub fn cadence_points(&self, tx_per_hour: f64, avg_trade_usd: f64) -> u8 {
        self.policy
            .cadence_tiers
            .iter()
            .find(|t| tx_per_hour >= t.min_tx_per_hour && avg_trade_usd > t.min_avg_trade_usd)
            .map(|t| t.points)
            .unwrap_or(0)
    }

    fn rationale(&self, metrics: &SafetyMetrics, top_pct: f64, breakdown: &ScoreBreakdown) -> Vec<SafetyNote> {
        let mut notes = Vec::new();

        if metrics.liquidity_usd < self.policy.low_liquidity_alert_usd {
            notes.push(SafetyNote::new(
                NoteSeverity::Critical,
                format!(
                    "Very low liquidity (${:.0}): expect heavy slippage and easy price manipulation",
                    metrics.liquidity_usd
                ),
            ));
        }

        if top_pct > self.policy.critical_concentration_pct {
            notes.push(SafetyNote::new(
                NoteSeverity::Critical,
                format!("Top 10 holders control {:.1}% of supply", top_pct),
            ));
        } else if top_pct > self.policy.warning_concentration_pct {
            notes.push(SafetyNote::new(
                NoteSeverity::Warning,
                format!("High holder concentration: top 10 hold {:.1}% of supply", top_pct),
            ));
        }

        if !metrics.mint_authority_revoked {
            notes.push(SafetyNote::new(
                NoteSeverity::Warning,
                "Mint authority is active: supply can still be inflated",
            ));
        }

        if !metrics.freeze_authority_revoked {
            notes.push(SafetyNote::new(
                NoteSeverity::Warning,
                "Freeze authority is active: holder accounts can be frozen",
            ));
        }

        notes.push(SafetyNote::new(
            NoteSeverity::Info,
            format!(
                "Liquidity ${:.0} ({}), volume/liquidity {:.0}% ({}), {:.1} tx/h averaging ${:.0} ({})",
                metrics.liquidity_usd,
                tier_label(breakdown.liquidity, MAX_LIQUIDITY_POINTS),
                metrics.volume_ratio_pct(),
                tier_label(breakdown.volume_ratio, MAX_VOLUME_RATIO_POINTS),
                metrics.tx_per_hour(),
                metrics.avg_trade_usd(),
                tier_label(breakdown.tx_cadence, MAX_CADENCE_POINTS),
            ),
        ));

        if !notes.iter().any(|n| n.severity >= NoteSeverity::Warning) {
            notes.push(SafetyNote::new(
                NoteSeverity::Positive,
                "No major red flags detected",
            ));
        }

        notes
    }
}

fn check_amount(name: &str, value: f64) -> Result<(), AnalysisError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AnalysisError::ComputationInvalid(format!(
            "{} must be a non-negative finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn first_above(tiers: &[Tier], value: f64) -> u8 {
    tiers
        .iter()
        .find(|t| value > t.threshold)
        .map(|t| t.points)
        .unwrap_or(0)
}

fn tier_label(points: u8, max: u8) -> &'static str {
    let ratio = points as f64 / max as f64;
    if ratio >= 1.0 {
        "excellent"
    } else if ratio >= 0.7 {
        "good"
    } else if ratio >= 0.5 {
        "fair"
    } else if ratio > 0.0 {
        "weak"
    } else {
        "none"
    }
}
