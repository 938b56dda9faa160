//! Recording port doubles for tests and offline runs

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    build_holder_analysis, AnalysisError, BoostedToken, HolderAnalysis, MarketPair,
    MintAuthorities, RawHolderAccount, TokenHolding, TokenSupply,
};
use super::{ChainDataPort, MarketDataPort};

/// Mock market data port that records calls and serves configured responses
#[derive(Debug, Default)]
pub struct MockMarketData {
    calls: Mutex<Vec<String>>,
    pairs: HashMap<String, Result<Option<MarketPair>, AnalysisError>>,
    search_results: Vec<MarketPair>,
    boosted: Vec<BoostedToken>,
    delay: Option<Duration>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the best pair for a token
    pub fn with_pair(mut self, token: &str, pair: MarketPair) -> Self {
        self.pairs.insert(token.to_string(), Ok(Some(pair)));
        self
    }

    /// Builder method to make a token resolve to "no pairs"
    pub fn with_no_pair(mut self, token: &str) -> Self {
        self.pairs.insert(token.to_string(), Ok(None));
        self
    }

    /// Builder method to make a token lookup fail
    pub fn with_error(mut self, token: &str, error: AnalysisError) -> Self {
        self.pairs.insert(token.to_string(), Err(error));
        self
    }

    pub fn with_search_results(mut self, pairs: Vec<MarketPair>) -> Self {
        self.search_results = pairs;
        self
    }

    pub fn with_boosted(mut self, tokens: Vec<BoostedToken>) -> Self {
        self.boosted = tokens;
        self
    }

    /// Builder method to delay every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all recorded calls
    pub async fn get_calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn resolve_market_pair(&self, token_address: &str) -> Result<Option<MarketPair>, AnalysisError> {
        self.record(format!("resolve:{}", token_address)).await;
        self.pairs
            .get(token_address)
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn pair_by_address(&self, chain_id: &str, pair_address: &str) -> Result<Option<MarketPair>, AnalysisError> {
        self.record(format!("pair:{}:{}", chain_id, pair_address)).await;
        let found = self.pairs.values().find_map(|result| match result {
            Ok(Some(pair)) if pair.pair_address == pair_address && pair.chain_id == chain_id => {
                Some(pair.clone())
            }
            _ => None,
        });
        Ok(found)
    }

    async fn search_pairs(&self, query: &str) -> Result<Vec<MarketPair>, AnalysisError> {
        self.record(format!("search:{}", query)).await;
        Ok(self.search_results.clone())
    }

    async fn top_boosted_tokens(&self) -> Result<Vec<BoostedToken>, AnalysisError> {
        self.record("boosted".to_string()).await;
        Ok(self.boosted.clone())
    }
}

/// Mock chain data port that records calls and serves configured responses
#[derive(Debug, Default)]
pub struct MockChainData {
    calls: Mutex<Vec<String>>,
    holders: HashMap<String, Result<HolderAnalysis, AnalysisError>>,
    authorities: HashMap<String, MintAuthorities>,
    balances: HashMap<String, f64>,
    holdings: HashMap<String, Vec<TokenHolding>>,
}

impl MockChainData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holders(mut self, mint: &str, analysis: HolderAnalysis) -> Self {
        self.holders.insert(mint.to_string(), Ok(analysis));
        self
    }

    /// Builder method to serve whatever the holder analyzer makes of raw accounts
    pub fn with_holder_accounts(mut self, mint: &str, accounts: Vec<RawHolderAccount>, supply: TokenSupply) -> Self {
        self.holders.insert(mint.to_string(), build_holder_analysis(accounts, supply));
        self
    }

    pub fn with_holder_error(mut self, mint: &str, error: AnalysisError) -> Self {
        self.holders.insert(mint.to_string(), Err(error));
        self
    }

    pub fn with_authorities(mut self, mint: &str, authorities: MintAuthorities) -> Self {
        self.authorities.insert(mint.to_string(), authorities);
        self
    }

    pub fn with_wallet(mut self, owner: &str, sol_balance: f64, tokens: Vec<TokenHolding>) -> Self {
        self.balances.insert(owner.to_string(), sol_balance);
        self.holdings.insert(owner.to_string(), tokens);
        self
    }

    /// Get all recorded calls
    pub async fn get_calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ChainDataPort for MockChainData {
    async fn holder_breakdown(&self, mint: &str) -> Result<HolderAnalysis, AnalysisError> {
        self.calls.lock().await.push(format!("holders:{}", mint));
        self.holders
            .get(mint)
            .cloned()
            .unwrap_or_else(|| Err(AnalysisError::NoDataFound(format!("no holders configured for {}", mint))))
    }

    async fn mint_authorities(&self, mint: &str) -> Result<MintAuthorities, AnalysisError> {
        self.calls.lock().await.push(format!("authorities:{}", mint));
        self.authorities
            .get(mint)
            .cloned()
            .ok_or_else(|| AnalysisError::NoDataFound(format!("mint account {} not found", mint)))
    }

    async fn sol_balance(&self, owner: &str) -> Result<f64, AnalysisError> {
        self.calls.lock().await.push(format!("balance:{}", owner));
        Ok(self.balances.get(owner).copied().unwrap_or(0.0))
    }

    async fn token_holdings(&self, owner: &str) -> Result<Vec<TokenHolding>, AnalysisError> {
        self.calls.lock().await.push(format!("holdings:{}", owner));
        Ok(self.holdings.get(owner).cloned().unwrap_or_default())
    }
}
