//! Solana address validation

use super::error::AnalysisError;

/// Length in bytes of a decoded Solana public key
pub const PUBKEY_BYTES: usize = 32;

/// Validate a base58 Solana address (wallet, mint or pair).
///
/// Returns the trimmed address on success.
pub fn validate_address(address: &str) -> Result<&str, AnalysisError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::InvalidAddress("address is empty".to_string()));
    }

    let bytes = bs58::decode(trimmed)
        .into_vec()
        .map_err(|e| AnalysisError::InvalidAddress(format!("{}: {}", trimmed, e)))?;

    if bytes.len() != PUBKEY_BYTES {
        return Err(AnalysisError::InvalidAddress(format!(
            "{} decodes to {} bytes, expected {}",
            trimmed,
            bytes.len(),
            PUBKEY_BYTES
        )));
    }

    Ok(trimmed)
}

/// Shorten an address for display, e.g. `So11...1112`
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
