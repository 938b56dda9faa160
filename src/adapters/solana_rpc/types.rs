//! Solana JSON-RPC Wire Types
//!
//! Response shapes for the handful of RPC methods the chain client uses.
//! Every result is wrapped in an `{ context, value }` envelope.

use serde::Deserialize;

/// SPL Token program id
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Token-2022 program id
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// `{ context, value }` wrapper around most results
#[derive(Debug, Clone, Deserialize)]
pub struct RpcContext<T> {
    pub value: T,
}

/// Token amount as reported by the RPC (`amount` is a base-unit string)
#[derive(Debug, Clone, Deserialize)]
pub struct UiTokenAmount {
    pub amount: String,
    pub decimals: u8,
    #[serde(rename = "uiAmountString", default)]
    pub ui_amount_string: Option<String>,
}

/// Entry of `getTokenLargestAccounts`
#[derive(Debug, Clone, Deserialize)]
pub struct LargestAccount {
    pub address: String,
    pub amount: String,
    pub decimals: u8,
}

/// `getAccountInfo` value for a jsonParsed account
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfoValue {
    pub data: AccountData,
    pub lamports: u64,
    pub owner: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AccountData {
    Parsed(ParsedAccountData),
    Raw(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAccountData {
    pub parsed: ParsedInfo<MintInfo>,
    pub program: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedInfo<I> {
    pub info: I,
    #[serde(rename = "type")]
    pub account_type: String,
}

/// Mint account information from the token program
#[derive(Debug, Clone, Deserialize)]
pub struct MintInfo {
    #[serde(rename = "mintAuthority")]
    pub mint_authority: Option<String>,
    #[serde(rename = "freezeAuthority")]
    pub freeze_authority: Option<String>,
    pub supply: String,
    pub decimals: u8,
}

/// Entry of `getTokenAccountsByOwner` with jsonParsed encoding
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAccountEntry {
    pub pubkey: String,
    pub account: TokenAccountValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenAccountValue {
    pub data: TokenAccountData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenAccountData {
    pub parsed: ParsedInfo<TokenAccountInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenAccountInfo {
    pub mint: String,
    pub owner: String,
    #[serde(rename = "tokenAmount")]
    pub token_amount: UiTokenAmount,
}
