//! Text rendering for command results

use std::fmt::Write;
use chrono::Utc;

use crate::application::{TrendingToken, WatchSnapshot};
use crate::domain::{
    short_address, HolderAnalysis, MarketPair, NoteSeverity, TokenSafetyAnalysis, TrackedWallet,
    WalletPortfolio, WhaleAlert, WhaleDirection,
};

/// Compact USD amount: `$1.25M`, `$980.4K`, `$12.50`
pub fn format_usd(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1_000_000_000.0 {
        format!("{}${:.2}B", sign, abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{}${:.2}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}${:.1}K", sign, abs / 1_000.0)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}

fn severity_marker(severity: NoteSeverity) -> &'static str {
    match severity {
        NoteSeverity::Positive => "[ok]",
        NoteSeverity::Info => "[i]",
        NoteSeverity::Warning => "[!]",
        NoteSeverity::Critical => "[!!]",
    }
}

pub fn render_pair(pair: &MarketPair) -> String {
    let mut out = String::new();
    let price = pair
        .price_usd
        .map(|p| format!("${}", p))
        .unwrap_or_else(|| "n/a".to_string());

    let _ = writeln!(out, "{}/{} on {}", pair.base_token.symbol, pair.quote_token.symbol, pair.dex_id);
    let _ = writeln!(out, "  Pool:        {}", pair.pair_address);
    let _ = writeln!(out, "  Price:       {} ({:+.2}% 24h)", price, pair.price_change_24h);
    let _ = writeln!(out, "  Liquidity:   {}", format_usd(pair.liquidity_usd));
    let _ = writeln!(out, "  Volume 24h:  {}", format_usd(pair.volume_24h));
    let _ = writeln!(
        out,
        "  Txns 24h:    {} ({} buys / {} sells, {:.0}% buys)",
        pair.txns_24h(),
        pair.buys_24h,
        pair.sells_24h,
        pair.buy_pressure_pct()
    );
    if let Some(fdv) = pair.fdv {
        let _ = writeln!(out, "  FDV:         {}", format_usd(fdv));
    }
    if let Some(age) = pair.age_hours(Utc::now()) {
        let _ = writeln!(out, "  Age:         {}d {}h", age / 24, age % 24);
    }
    if let Some(url) = &pair.url {
        let _ = writeln!(out, "  {}", url);
    }
    out
}

pub fn render_analysis(analysis: &TokenSafetyAnalysis) -> String {
    let mut out = String::new();
    let b = &analysis.breakdown;

    let _ = writeln!(
        out,
        "{} ({})",
        analysis.symbol.as_deref().unwrap_or("?"),
        analysis.token_address
    );
    let _ = writeln!(out, "  Safety score: {}/100 - {} risk", analysis.score, analysis.risk);
    let _ = writeln!(out, "  Concentration  {:>2}/40  (top 10 hold {:.1}%)", b.concentration, analysis.metrics.top_holders_pct);
    let _ = writeln!(
        out,
        "  Mint authority {:>2}/20  ({})",
        b.mint_authority,
        if analysis.metrics.mint_authority_revoked { "revoked" } else { "active" }
    );
    let _ = writeln!(out, "  Liquidity      {:>2}/20  ({})", b.liquidity, format_usd(analysis.metrics.liquidity_usd));
    let _ = writeln!(out, "  Volume ratio   {:>2}/10  ({:.0}%)", b.volume_ratio, analysis.metrics.volume_ratio_pct());
    let _ = writeln!(out, "  Tx cadence     {:>2}/10  ({:.1} tx/h)", b.tx_cadence, analysis.metrics.tx_per_hour());
    let _ = writeln!(out);
    for note in &analysis.notes {
        let _ = writeln!(out, "  {} {}", severity_marker(note.severity), note.message);
    }
    out
}

pub fn render_holders(analysis: &HolderAnalysis, top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Top {} holders control {:.2}% of {:.0} tokens",
        analysis.holders.len(),
        analysis.top_holders_pct,
        analysis.total_supply
    );
    for (rank, holder) in analysis.holders.iter().take(top).enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<44} {:>20.2} {:>7.2}%",
            rank + 1,
            holder.address,
            holder.amount,
            holder.percentage
        );
    }
    out
}

pub fn render_pair_list(pairs: &[MarketPair]) -> String {
    if pairs.is_empty() {
        return "No pairs found\n".to_string();
    }
    let mut out = String::new();
    for pair in pairs {
        let _ = writeln!(
            out,
            "{:<10} {:<10} liq {:>10}  vol {:>10}  {}",
            pair.base_token.symbol,
            pair.dex_id,
            format_usd(pair.liquidity_usd),
            format_usd(pair.volume_24h),
            pair.base_token.address
        );
    }
    out
}

pub fn render_trending(tokens: &[TrendingToken]) -> String {
    if tokens.is_empty() {
        return "No boosted tokens\n".to_string();
    }
    let mut out = String::new();
    for (rank, entry) in tokens.iter().enumerate() {
        let summary = match &entry.pair {
            Some(pair) => format!(
                "{:<10} liq {:>10}  vol {:>10}",
                pair.base_token.symbol,
                format_usd(pair.liquidity_usd),
                format_usd(pair.volume_24h)
            ),
            None => "no pair".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>2}. {:<13} {}  boost {:.0}",
            rank + 1,
            short_address(&entry.token.token_address),
            summary,
            entry.token.total_amount.unwrap_or(0.0)
        );
    }
    out
}

pub fn render_whales(alerts: &[WhaleAlert]) -> String {
    if alerts.is_empty() {
        return "No whale alerts\n".to_string();
    }
    let mut out = String::new();
    for alert in alerts {
        let side = match alert.direction {
            WhaleDirection::Buy => "BUY ",
            WhaleDirection::Sell => "SELL",
        };
        let when = alert
            .published_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        let _ = writeln!(out, "{} {}  {}", side, when, alert.title);
    }
    out
}

pub fn render_wallets(wallets: &[TrackedWallet]) -> String {
    if wallets.is_empty() {
        return "No tracked wallets\n".to_string();
    }
    let mut out = String::new();
    for wallet in wallets {
        let _ = writeln!(
            out,
            "{:<20} {}  (since {})",
            wallet.name,
            wallet.address,
            wallet.added_at.format("%Y-%m-%d")
        );
    }
    out
}

pub fn render_portfolio(portfolio: &WalletPortfolio) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({})",
        portfolio.name.as_deref().unwrap_or("wallet"),
        portfolio.address
    );
    let _ = writeln!(out, "  SOL: {:.4}", portfolio.sol_balance);
    for token in &portfolio.tokens {
        let _ = writeln!(out, "  {:<44} {:.4}", token.mint, token.amount);
    }
    out
}

pub fn render_snapshot(snapshot: &WatchSnapshot) -> String {
    let time = snapshot.fetched_at.format("%H:%M:%S");
    match &snapshot.pair {
        Some(pair) => format!(
            "{} {:<10} {:>14} liq {:>10} vol {:>10} {:+.2}%",
            time,
            pair.base_token.symbol,
            pair.price_usd
                .map(|p| format!("${}", p))
                .unwrap_or_else(|| "n/a".to_string()),
            format_usd(pair.liquidity_usd),
            format_usd(pair.volume_24h),
            pair.price_change_24h
        ),
        None => format!("{} {} no pairs", time, short_address(&snapshot.token_address)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_pair::fixtures::pair;
    use crate::domain::{
        build_holder_analysis, MintAuthorities, RawHolderAccount, SafetyScorer, TokenSupply,
    };

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(12.5), "$12.50");
        assert_eq!(format_usd(980_400.0), "$980.4K");
        assert_eq!(format_usd(1_250_000.0), "$1.25M");
        assert_eq!(format_usd(3_000_000_000.0), "$3.00B");
        assert_eq!(format_usd(-1_500.0), "-$1.5K");
    }

    #[test]
    fn test_render_analysis_lists_notes() {
        let holders = build_holder_analysis(
            vec![RawHolderAccount { address: "Whale".into(), amount: 900 }],
            TokenSupply::new(1_000, 0),
        )
        .unwrap();
        let authorities = MintAuthorities {
            mint_authority: Some("Auth".into()),
            freeze_authority: None,
            supply: 1_000,
            decimals: 0,
        };
        let analysis = SafetyScorer::new()
            .score("BaseMint111", &pair("solana", "Pool1", 5_000.0), &holders, &authorities)
            .unwrap();

        let text = render_analysis(&analysis);
        assert!(text.contains("BONK"));
        assert!(text.contains("high risk"));
        assert!(text.contains("[!!]"));
        assert!(text.contains("Mint authority is active"));
    }

    #[test]
    fn test_render_holders_respects_top() {
        let holders = build_holder_analysis(
            (0..5)
                .map(|i| RawHolderAccount { address: format!("H{}", i), amount: 10 })
                .collect(),
            TokenSupply::new(100, 0),
        )
        .unwrap();

        let text = render_holders(&holders, 2);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("50.00%"));
    }

    #[test]
    fn test_render_empty_lists() {
        assert_eq!(render_pair_list(&[]), "No pairs found\n");
        assert_eq!(render_whales(&[]), "No whale alerts\n");
        assert_eq!(render_wallets(&[]), "No tracked wallets\n");
    }

    #[test]
    fn test_render_pair() {
        let text = render_pair(&pair("solana", "Pool1", 250_000.0));
        assert!(text.starts_with("BONK/SOL on raydium"));
        assert!(text.contains("$250.0K"));
        assert!(text.contains("Price:       n/a"));
    }
}
