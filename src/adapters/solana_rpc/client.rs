//! Solana Chain Client
//!
//! Holder concentration, mint authorities and wallet balances over JSON-RPC.
//! Every call goes through the client's rate-limited fetcher and gets the
//! full retry budget on each configured endpoint before the client gives up.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::adapters::fetch::{
    Backoff, EmptyEndpointList, EndpointRotation, RateLimitConfig, RateLimitedFetcher, RetryPolicy,
};
use crate::domain::{
    build_holder_analysis, lamports_to_sol, normalize_amount, AnalysisError, HolderAnalysis,
    MintAuthorities, RawHolderAccount, TokenHolding, TokenSupply,
};
use crate::ports::ChainDataPort;
use super::transport::{ChainRpcError, HttpRpcTransport, RpcTransport};
use super::types::{
    AccountData, AccountInfoValue, LargestAccount, RpcContext, TokenAccountEntry,
    UiTokenAmount, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Configuration for the chain client
#[derive(Debug, Clone)]
pub struct SolanaRpcConfig {
    /// Ordered endpoints, first is primary
    pub endpoints: Vec<String>,
    /// Attempts per endpoint
    pub max_attempts: u32,
    /// Linear backoff step between attempts
    pub retry_step: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    pub commitment: String,
    /// Throttle shared by every call of one client
    pub rate_limit: RateLimitConfig,
}

/// Default spacing between RPC calls (milliseconds)
pub const DEFAULT_RPC_INTERVAL_MS: u64 = 100;

impl Default for SolanaRpcConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_RPC_URL.to_string()],
            max_attempts: 3,
            retry_step: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            commitment: "confirmed".to_string(),
            rate_limit: RateLimitConfig::spacing_only(DEFAULT_RPC_INTERVAL_MS),
        }
    }
}

/// JSON-RPC client implementing [`ChainDataPort`]
pub struct SolanaChainClient<T: RpcTransport> {
    transport: Arc<T>,
    endpoints: EndpointRotation,
    policy: RetryPolicy,
    fetcher: RateLimitedFetcher,
    commitment: String,
}

impl SolanaChainClient<HttpRpcTransport> {
    /// Client over HTTP using the given configuration
    pub fn from_config(config: &SolanaRpcConfig) -> Result<Self, ChainRpcError> {
        let transport = HttpRpcTransport::new(config.timeout)?;
        Self::new(transport, config)
            .map_err(|e| ChainRpcError::Http(format!("invalid RPC configuration: {}", e)))
    }
}

impl<T: RpcTransport> SolanaChainClient<T> {
    pub fn new(transport: T, config: &SolanaRpcConfig) -> Result<Self, EmptyEndpointList> {
        Ok(Self {
            transport: Arc::new(transport),
            endpoints: EndpointRotation::new(config.endpoints.clone())?,
            policy: RetryPolicy::new(config.max_attempts, Backoff::Linear(config.retry_step)),
            fetcher: RateLimitedFetcher::new(config.rate_limit.clone()),
            commitment: config.commitment.clone(),
        })
    }

    pub fn endpoints(&self) -> &EndpointRotation {
        &self.endpoints
    }

    pub fn fetcher(&self) -> &RateLimitedFetcher {
        &self.fetcher
    }

    /// Top token accounts by balance for a mint
    pub async fn largest_accounts(&self, mint: &str) -> Result<Vec<RawHolderAccount>, ChainRpcError> {
        let params = json!([mint, { "commitment": self.commitment }]);
        let result = self.request("getTokenLargestAccounts", params).await?;
        parse_largest_accounts(result)
    }

    /// Total supply in base units
    pub async fn token_supply(&self, mint: &str) -> Result<TokenSupply, ChainRpcError> {
        let params = json!([mint, { "commitment": self.commitment }]);
        let result = self.request("getTokenSupply", params).await?;
        parse_token_supply(result)
    }

    /// Parsed mint account
    pub async fn mint_account(&self, mint: &str) -> Result<MintAuthorities, ChainRpcError> {
        let params = json!([mint, { "encoding": "jsonParsed", "commitment": self.commitment }]);
        let result = self.request("getAccountInfo", params).await?;
        parse_mint_account(mint, result)
    }

    pub async fn balance_lamports(&self, owner: &str) -> Result<u64, ChainRpcError> {
        let params = json!([owner, { "commitment": self.commitment }]);
        let result = self.request("getBalance", params).await?;
        let context: RpcContext<u64> = decode(result, "getBalance")?;
        Ok(context.value)
    }

    /// Token balances under one token program
    pub async fn token_accounts(&self, owner: &str, program_id: &str) -> Result<Vec<TokenHolding>, ChainRpcError> {
        let params = json!([
            owner,
            { "programId": program_id },
            { "encoding": "jsonParsed", "commitment": self.commitment }
        ]);
        let result = self.request("getTokenAccountsByOwner", params).await?;
        parse_token_accounts(result)
    }

    async fn request(&self, method: &'static str, params: Value) -> Result<Value, ChainRpcError> {
        tracing::debug!("RPC {} via {} endpoint(s)", method, self.endpoints.len());
        let transport = &self.transport;
        let fetcher = &self.fetcher;
        self.endpoints
            .run(
                &self.policy,
                method,
                |endpoint| {
                    let params = params.clone();
                    async move {
                        fetcher
                            .execute(|| transport.call(&endpoint, method, params))
                            .await
                    }
                },
                |_| true,
            )
            .await
    }
}

#[async_trait]
impl<T: RpcTransport> ChainDataPort for SolanaChainClient<T> {
    async fn holder_breakdown(&self, mint: &str) -> Result<HolderAnalysis, AnalysisError> {
        let (accounts, supply) = tokio::try_join!(self.largest_accounts(mint), self.token_supply(mint))?;
        tracing::debug!(
            "Fetched {} holder accounts for {} (supply {} @ {} decimals)",
            accounts.len(),
            mint,
            supply.amount,
            supply.decimals
        );
        build_holder_analysis(accounts, supply)
    }

    async fn mint_authorities(&self, mint: &str) -> Result<MintAuthorities, AnalysisError> {
        Ok(self.mint_account(mint).await?)
    }

    async fn sol_balance(&self, owner: &str) -> Result<f64, AnalysisError> {
        let lamports = self.balance_lamports(owner).await?;
        Ok(lamports_to_sol(lamports))
    }

    async fn token_holdings(&self, owner: &str) -> Result<Vec<TokenHolding>, AnalysisError> {
        let (mut classic, token_2022) = tokio::try_join!(
            self.token_accounts(owner, TOKEN_PROGRAM_ID),
            self.token_accounts(owner, TOKEN_2022_PROGRAM_ID),
        )?;
        classic.extend(token_2022);
        Ok(classic)
    }
}

fn decode<D: DeserializeOwned>(value: Value, method: &str) -> Result<D, ChainRpcError> {
    serde_json::from_value(value)
        .map_err(|e| ChainRpcError::ParseError(format!("{} result: {}", method, e)))
}

fn parse_base_units(amount: &str, field: &str) -> Result<u64, ChainRpcError> {
    amount
        .parse()
        .map_err(|e| ChainRpcError::ParseError(format!("{} '{}': {}", field, amount, e)))
}

/// `getTokenLargestAccounts` result into raw holder accounts
pub fn parse_largest_accounts(result: Value) -> Result<Vec<RawHolderAccount>, ChainRpcError> {
    let context: RpcContext<Vec<LargestAccount>> = decode(result, "getTokenLargestAccounts")?;
    context
        .value
        .into_iter()
        .map(|account| {
            Ok(RawHolderAccount {
                amount: parse_base_units(&account.amount, "amount")?,
                address: account.address,
            })
        })
        .collect()
}

/// `getTokenSupply` result into a supply
pub fn parse_token_supply(result: Value) -> Result<TokenSupply, ChainRpcError> {
    let context: RpcContext<UiTokenAmount> = decode(result, "getTokenSupply")?;
    let amount = parse_base_units(&context.value.amount, "supply")?;
    Ok(TokenSupply::new(amount, context.value.decimals))
}

/// jsonParsed `getAccountInfo` result into mint authorities
pub fn parse_mint_account(mint: &str, result: Value) -> Result<MintAuthorities, ChainRpcError> {
    let context: RpcContext<Option<AccountInfoValue>> = decode(result, "getAccountInfo")?;
    let value = context
        .value
        .ok_or_else(|| ChainRpcError::AccountNotFound(mint.to_string()))?;

    let parsed = match value.data {
        AccountData::Parsed(parsed) => parsed,
        AccountData::Raw(_) => {
            return Err(ChainRpcError::NotMintAccount(format!(
                "{} is not a token mint (owner {})",
                mint, value.owner
            )))
        }
    };

    if parsed.parsed.account_type != "mint" {
        return Err(ChainRpcError::NotMintAccount(format!(
            "{} is a '{}' account, expected 'mint'",
            mint, parsed.parsed.account_type
        )));
    }

    let info = parsed.parsed.info;
    Ok(MintAuthorities {
        mint_authority: info.mint_authority,
        freeze_authority: info.freeze_authority,
        supply: parse_base_units(&info.supply, "supply")?,
        decimals: info.decimals,
    })
}

/// jsonParsed `getTokenAccountsByOwner` result into holdings
pub fn parse_token_accounts(result: Value) -> Result<Vec<TokenHolding>, ChainRpcError> {
    let context: RpcContext<Vec<TokenAccountEntry>> = decode(result, "getTokenAccountsByOwner")?;
    context
        .value
        .into_iter()
        .map(|entry| {
            let info = entry.account.data.parsed.info;
            let amount = match info.token_amount.ui_amount_string.as_deref().map(str::parse::<f64>) {
                Some(Ok(ui)) => ui,
                _ => normalize_amount(
                    parse_base_units(&info.token_amount.amount, "tokenAmount")?,
                    info.token_amount.decimals,
                ),
            };
            Ok(TokenHolding {
                mint: info.mint,
                amount,
                decimals: info.token_amount.decimals,
            })
        })
        .collect()
}
