//! JSON-RPC transport
//!
//! One POST per call. The endpoint is chosen by the caller so the client can
//! rotate between providers.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::adapters::fetch::{message_indicates_rate_limit, RateLimitSignal, RATE_LIMIT_RPC_CODES};
use crate::domain::AnalysisError;
use super::types::RpcResponse;

/// JSON-RPC error code for invalid params (bad pubkey and similar)
pub const INVALID_PARAMS_CODE: i64 = -32602;

/// Errors that can occur talking to a Solana RPC endpoint
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainRpcError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Not a mint account: {0}")]
    NotMintAccount(String),
}

impl RateLimitSignal for ChainRpcError {
    fn is_rate_limited(&self) -> bool {
        match self {
            ChainRpcError::RateLimited(_) => true,
            ChainRpcError::Status { status, .. } => *status == 429,
            ChainRpcError::Rpc { code, message } => {
                RATE_LIMIT_RPC_CODES.contains(code) || message_indicates_rate_limit(message)
            }
            ChainRpcError::Http(message) => message_indicates_rate_limit(message),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ChainRpcError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(StatusCode::TOO_MANY_REQUESTS) => ChainRpcError::RateLimited(e.to_string()),
            _ => ChainRpcError::Http(e.to_string()),
        }
    }
}

impl From<ChainRpcError> for AnalysisError {
    fn from(e: ChainRpcError) -> Self {
        if e.is_rate_limited() {
            return AnalysisError::RateLimited(e.to_string());
        }
        match e {
            ChainRpcError::Rpc { code: INVALID_PARAMS_CODE, message } => {
                AnalysisError::InvalidAddress(message)
            }
            ChainRpcError::NotMintAccount(message) => AnalysisError::InvalidAddress(message),
            ChainRpcError::AccountNotFound(address) => {
                AnalysisError::NoDataFound(format!("account {} not found", address))
            }
            other => AnalysisError::Transport(other.to_string()),
        }
    }
}

/// Sends one JSON-RPC request to one endpoint and returns its `result`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, endpoint: &str, method: &str, params: Value) -> Result<Value, ChainRpcError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpRpcTransport {
    http: Client,
}

impl HttpRpcTransport {
    pub fn new(timeout: Duration) -> Result<Self, ChainRpcError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn call(&self, endpoint: &str, method: &str, params: Value) -> Result<Value, ChainRpcError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self.http.post(endpoint).json(&request_body).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ChainRpcError::RateLimited(format!("{} returned 429", endpoint)));
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ChainRpcError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        parse_rpc_body(&body)
    }
}

/// Unwrap a JSON-RPC response body into its `result`
pub fn parse_rpc_body(body: &str) -> Result<Value, ChainRpcError> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| ChainRpcError::ParseError(format!("invalid JSON-RPC body: {}", e)))?;

    if let Some(error) = response.error {
        if RATE_LIMIT_RPC_CODES.contains(&error.code) {
            return Err(ChainRpcError::RateLimited(error.message));
        }
        return Err(ChainRpcError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    response
        .result
        .ok_or_else(|| ChainRpcError::ParseError("response has neither result nor error".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rpc_body_result() {
        let body = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":42}}"#;
        let result = parse_rpc_body(body).unwrap();
        assert_eq!(result["value"], 42);
    }

    #[test]
    fn test_parse_rpc_body_rate_limit_codes() {
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32429,"message":"slow down"}}"#;
        assert_eq!(
            parse_rpc_body(body),
            Err(ChainRpcError::RateLimited("slow down".into()))
        );

        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":429,"message":"Too many requests"}}"#;
        assert!(parse_rpc_body(body).unwrap_err().is_rate_limited());
    }

    #[test]
    fn test_parse_rpc_body_error() {
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Invalid param: Invalid pubkey"}}"#;
        let err = parse_rpc_body(body).unwrap_err();
        assert!(!err.is_rate_limited());
        assert_eq!(
            AnalysisError::from(err),
            AnalysisError::InvalidAddress("Invalid param: Invalid pubkey".into())
        );
    }

    #[test]
    fn test_parse_rpc_body_garbage() {
        assert!(matches!(
            parse_rpc_body("<html>bad gateway</html>"),
            Err(ChainRpcError::ParseError(_))
        ));
        assert!(matches!(
            parse_rpc_body(r#"{"jsonrpc":"2.0","id":1}"#),
            Err(ChainRpcError::ParseError(_))
        ));
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            AnalysisError::from(ChainRpcError::Status { status: 429, message: String::new() }),
            AnalysisError::RateLimited(_)
        ));
        assert!(matches!(
            AnalysisError::from(ChainRpcError::Status { status: 502, message: "bad gateway".into() }),
            AnalysisError::Transport(_)
        ));
        assert!(matches!(
            AnalysisError::from(ChainRpcError::AccountNotFound("Mint".into())),
            AnalysisError::NoDataFound(_)
        ));
        assert!(matches!(
            AnalysisError::from(ChainRpcError::Http("connection reset".into())),
            AnalysisError::Transport(_)
        ));
    }

    #[test]
    fn test_http_transport_creation() {
        assert!(HttpRpcTransport::new(Duration::from_secs(5)).is_ok());
    }
}
