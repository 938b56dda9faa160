//! Analysis Service
//!
//! The presentation boundary. Validates addresses, fans out to the market and
//! chain ports, and turns the joined data into scores, breakdowns and
//! portfolios. Nothing here formats output.

use std::sync::Arc;

use crate::domain::{
    validate_address, AnalysisError, BoostedToken, HolderAnalysis, MarketPair, SafetyScorer,
    TokenSafetyAnalysis, TrackedWallet, WalletPortfolio,
};
use crate::ports::{ChainDataPort, MarketDataPort};

/// A boosted token with its best pair, when one resolved
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TrendingToken {
    pub token: BoostedToken,
    pub pair: Option<MarketPair>,
}

pub struct AnalysisService<M: MarketDataPort, C: ChainDataPort> {
    market: Arc<M>,
    chain: Arc<C>,
    scorer: SafetyScorer,
}

impl<M: MarketDataPort, C: ChainDataPort> AnalysisService<M, C> {
    pub fn new(market: Arc<M>, chain: Arc<C>, scorer: SafetyScorer) -> Self {
        Self { market, chain, scorer }
    }

    pub fn scorer(&self) -> &SafetyScorer {
        &self.scorer
    }

    /// Highest-liquidity pair on the configured chain, `None` when the token has none
    pub async fn resolve_market_pair(&self, token_address: &str) -> Result<Option<MarketPair>, AnalysisError> {
        let token_address = validate_address(token_address)?;
        self.market.resolve_market_pair(token_address).await
    }

    /// Score a token. Market pair, holders and authorities are fetched
    /// concurrently; any failure fails the whole analysis.
    pub async fn analyze_token_safety(&self, token_address: &str) -> Result<TokenSafetyAnalysis, AnalysisError> {
        let token_address = validate_address(token_address)?;
        tracing::info!("Analyzing {}", token_address);

        let (pair, holders, authorities) = tokio::try_join!(
            self.market.resolve_market_pair(token_address),
            self.chain.holder_breakdown(token_address),
            self.chain.mint_authorities(token_address),
        )?;

        let pair = pair.ok_or_else(|| {
            AnalysisError::NoDataFound(format!("no market pairs for {}", token_address))
        })?;

        let analysis = self.scorer.score(token_address, &pair, &holders, &authorities)?;
        tracing::info!(
            "{} ({}) scored {}/100 - {} risk",
            analysis.symbol.as_deref().unwrap_or("?"),
            token_address,
            analysis.score,
            analysis.risk
        );
        Ok(analysis)
    }

    /// Top holders and concentration for a mint
    pub async fn get_holder_breakdown(&self, mint: &str) -> Result<HolderAnalysis, AnalysisError> {
        let mint = validate_address(mint)?;
        self.chain.holder_breakdown(mint).await
    }

    pub async fn pair_by_address(&self, chain_id: &str, pair_address: &str) -> Result<Option<MarketPair>, AnalysisError> {
        self.market.pair_by_address(chain_id, pair_address).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<MarketPair>, AnalysisError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.market.search_pairs(query).await
    }

    /// Boosted tokens with their best pairs, resolved one at a time
    pub async fn trending(&self, limit: usize) -> Result<Vec<TrendingToken>, AnalysisError> {
        let boosted = self.market.top_boosted_tokens().await?;
        let mut trending = Vec::with_capacity(limit.min(boosted.len()));

        for token in boosted.into_iter().take(limit) {
            let pair = match self.market.resolve_market_pair(&token.token_address).await {
                Ok(pair) => pair,
                Err(e) if e.is_retryable() => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping pair lookup for {}: {}", token.token_address, e);
                    None
                }
            };
            trending.push(TrendingToken { token, pair });
        }

        Ok(trending)
    }

    /// SOL and token balances of a tracked wallet
    pub async fn wallet_portfolio(&self, wallet: &TrackedWallet) -> Result<WalletPortfolio, AnalysisError> {
        let address = validate_address(&wallet.address)?;
        let (sol_balance, tokens) = tokio::try_join!(
            self.chain.sol_balance(address),
            self.chain.token_holdings(address),
        )?;
        Ok(WalletPortfolio::new(
            address.to_string(),
            Some(wallet.name.clone()),
            sol_balance,
            tokens,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Utc;

    use crate::domain::market_pair::fixtures::pair;
    use crate::domain::{
        build_holder_analysis, MintAuthorities, RawHolderAccount, RiskTier, TokenHolding,
        TokenSupply,
    };
    use crate::ports::mocks::{MockChainData, MockMarketData};

    const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn holders(amounts: &[u64], supply: u64) -> HolderAnalysis {
        let accounts = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| RawHolderAccount {
                address: format!("Holder{}", i),
                amount: *amount,
            })
            .collect();
        build_holder_analysis(accounts, TokenSupply::new(supply, 6)).unwrap()
    }

    fn authorities(mint_authority: Option<&str>) -> MintAuthorities {
        MintAuthorities {
            mint_authority: mint_authority.map(str::to_string),
            freeze_authority: None,
            supply: 1_000_000,
            decimals: 6,
        }
    }

    fn service(market: MockMarketData, chain: MockChainData) -> AnalysisService<MockMarketData, MockChainData> {
        AnalysisService::new(Arc::new(market), Arc::new(chain), SafetyScorer::new())
    }

    #[tokio::test]
    async fn test_analyze_scores_low_risk() {
        let mut best = pair("solana", "Pool1", 600_000.0);
        best.volume_24h = 700_000.0;
        best.buys_24h = 700;
        best.sells_24h = 500;

        let service = service(
            MockMarketData::new().with_pair(MINT, best),
            MockChainData::new()
                .with_holders(MINT, holders(&[100_000, 100_000], 1_000_000))
                .with_authorities(MINT, authorities(None)),
        );

        let analysis = service.analyze_token_safety(MINT).await.unwrap();
        assert_eq!(analysis.score, 100);
        assert_eq!(analysis.risk, RiskTier::Low);
    }

    #[tokio::test]
    async fn test_analyze_labels_queried_quote_token() {
        const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
        let mut sol_usdc = pair("solana", "Pool1", 600_000.0);
        sol_usdc.base_token.address = "So11111111111111111111111111111111111111112".to_string();
        sol_usdc.base_token.symbol = "SOL".to_string();
        sol_usdc.quote_token.address = USDC.to_string();
        sol_usdc.quote_token.symbol = "USDC".to_string();

        let service = service(
            MockMarketData::new().with_pair(USDC, sol_usdc),
            MockChainData::new()
                .with_holders(USDC, holders(&[100_000], 1_000_000))
                .with_authorities(USDC, authorities(None)),
        );

        let analysis = service.analyze_token_safety(USDC).await.unwrap();
        assert_eq!(analysis.token_address, USDC);
        assert_eq!(analysis.symbol.as_deref(), Some("USDC"));
    }

    #[tokio::test]
    async fn test_analyze_without_pair_is_no_data() {
        let service = service(
            MockMarketData::new().with_no_pair(MINT),
            MockChainData::new()
                .with_holders(MINT, holders(&[100_000], 1_000_000))
                .with_authorities(MINT, authorities(None)),
        );

        let result = service.analyze_token_safety(MINT).await;
        assert!(matches!(result, Err(AnalysisError::NoDataFound(_))));
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_address_before_io() {
        let market = Arc::new(MockMarketData::new());
        let chain = Arc::new(MockChainData::new());
        let service = AnalysisService::new(Arc::clone(&market), Arc::clone(&chain), SafetyScorer::new());

        let result = service.analyze_token_safety("not-a-mint").await;
        assert!(matches!(result, Err(AnalysisError::InvalidAddress(_))));
        assert!(market.get_calls().await.is_empty());
        assert!(chain.get_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_propagates_chain_failure() {
        let service = service(
            MockMarketData::new().with_pair(MINT, pair("solana", "Pool1", 600_000.0)),
            MockChainData::new()
                .with_holder_error(MINT, AnalysisError::RateLimited("429".into()))
                .with_authorities(MINT, authorities(None)),
        );

        let result = service.analyze_token_safety(MINT).await;
        assert_eq!(result.unwrap_err(), AnalysisError::RateLimited("429".into()));
    }

    #[tokio::test]
    async fn test_holder_breakdown() {
        let service = service(
            MockMarketData::new(),
            MockChainData::new().with_holders(MINT, holders(&[300_000, 200_000], 1_000_000)),
        );

        let breakdown = service.get_holder_breakdown(MINT).await.unwrap();
        assert_relative_eq!(breakdown.top_holders_pct, 50.0);
        assert_relative_eq!(breakdown.largest_holder_pct(), 30.0);
    }

    #[tokio::test]
    async fn test_search_skips_blank_query() {
        let market = Arc::new(MockMarketData::new());
        let service = AnalysisService::new(Arc::clone(&market), Arc::new(MockChainData::new()), SafetyScorer::new());

        assert!(service.search("   ").await.unwrap().is_empty());
        assert!(market.get_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_trending_resolves_pairs() {
        let boosted = |address: &str| BoostedToken {
            chain_id: "solana".to_string(),
            token_address: address.to_string(),
            description: None,
            url: None,
            total_amount: Some(500.0),
        };
        let market = MockMarketData::new()
            .with_boosted(vec![boosted("MintA"), boosted("MintB"), boosted("MintC")])
            .with_pair("MintA", pair("solana", "PoolA", 10_000.0));
        let market = Arc::new(market);
        let service = AnalysisService::new(Arc::clone(&market), Arc::new(MockChainData::new()), SafetyScorer::new());

        let trending = service.trending(2).await.unwrap();
        assert_eq!(trending.len(), 2);
        assert_eq!(trending[0].pair.as_ref().map(|p| p.pair_address.as_str()), Some("PoolA"));
        assert!(trending[1].pair.is_none());
        assert_eq!(
            market.get_calls().await,
            vec!["boosted", "resolve:MintA", "resolve:MintB"]
        );
    }

    #[tokio::test]
    async fn test_wallet_portfolio() {
        let service = service(
            MockMarketData::new(),
            MockChainData::new().with_wallet(
                WALLET,
                1.5,
                vec![
                    TokenHolding { mint: "MintA".into(), amount: 0.0, decimals: 6 },
                    TokenHolding { mint: "MintB".into(), amount: 42.0, decimals: 6 },
                ],
            ),
        );
        let wallet = TrackedWallet {
            address: WALLET.to_string(),
            name: "main".to_string(),
            added_at: Utc::now(),
        };

        let portfolio = service.wallet_portfolio(&wallet).await.unwrap();
        assert_eq!(portfolio.name.as_deref(), Some("main"));
        assert_relative_eq!(portfolio.sol_balance, 1.5);
        assert_eq!(portfolio.tokens.len(), 1);
        assert_eq!(portfolio.tokens[0].mint, "MintB");
    }
}
