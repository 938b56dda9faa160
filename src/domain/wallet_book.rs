//! Wallet Book
//!
//! Tracked wallet addresses with display names, persisted as a small JSON
//! file. The file is read once on open and rewritten after every change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::address::validate_address;

/// Default wallet book file name
pub const DEFAULT_WALLET_FILE: &str = "wallets.json";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletBookError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Wallet already tracked: {0}")]
    AlreadyTracked(String),

    #[error("Wallet not tracked: {0}")]
    NotTracked(String),

    #[error("Wallet name cannot be empty")]
    EmptyName,

    #[error("Failed to read wallet book: {0}")]
    ReadError(String),

    #[error("Failed to write wallet book: {0}")]
    WriteError(String),

    #[error("Wallet book is corrupted: {0}")]
    CorruptedFile(String),
}

/// Stored entry for one wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletEntry {
    pub name: String,
    pub added_at: DateTime<Utc>,
}

/// A tracked wallet as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedWallet {
    pub address: String,
    pub name: String,
    pub added_at: DateTime<Utc>,
}

/// Persistent address -> name store
#[derive(Debug)]
pub struct WalletBook {
    path: PathBuf,
    wallets: BTreeMap<String, WalletEntry>,
}

impl WalletBook {
    /// Open the book at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WalletBookError> {
        let path = path.into();
        let wallets = Self::read(&path)?;
        tracing::debug!("Wallet book opened: {} ({} wallets)", path.display(), wallets.len());
        Ok(Self { path, wallets })
    }

    /// Default file path inside a data directory
    pub fn default_path(data_dir: &Path) -> PathBuf {
        data_dir.join(DEFAULT_WALLET_FILE)
    }

    fn read(path: &Path) -> Result<BTreeMap<String, WalletEntry>, WalletBookError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| WalletBookError::ReadError(e.to_string()))?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| WalletBookError::CorruptedFile(e.to_string()))
    }

    /// Write `wallets` to disk, then make it the in-memory state.
    /// A failed write leaves the book unchanged.
    fn commit(&mut self, wallets: BTreeMap<String, WalletEntry>) -> Result<(), WalletBookError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| WalletBookError::WriteError(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(&wallets)
            .map_err(|e| WalletBookError::WriteError(e.to_string()))?;

        fs::write(&self.path, content)
            .map_err(|e| WalletBookError::WriteError(e.to_string()))?;

        self.wallets = wallets;
        Ok(())
    }

    /// Start tracking a wallet
    pub fn add(&mut self, address: &str, name: &str) -> Result<TrackedWallet, WalletBookError> {
        let address = validate_address(address)
            .map_err(|e| WalletBookError::InvalidAddress(e.to_string()))?
            .to_string();
        let name = clean_name(name)?;

        if self.wallets.contains_key(&address) {
            return Err(WalletBookError::AlreadyTracked(address));
        }

        let entry = WalletEntry {
            name,
            added_at: Utc::now(),
        };
        let mut wallets = self.wallets.clone();
        wallets.insert(address.clone(), entry.clone());
        self.commit(wallets)?;

        tracing::info!("Tracking wallet {} as '{}'", address, entry.name);
        Ok(TrackedWallet {
            address,
            name: entry.name,
            added_at: entry.added_at,
        })
    }

    /// Change a tracked wallet's display name
    pub fn rename(&mut self, address: &str, name: &str) -> Result<(), WalletBookError> {
        let name = clean_name(name)?;
        let mut wallets = self.wallets.clone();
        let entry = wallets
            .get_mut(address.trim())
            .ok_or_else(|| WalletBookError::NotTracked(address.to_string()))?;
        entry.name = name;
        self.commit(wallets)
    }

    /// Stop tracking a wallet
    pub fn remove(&mut self, address: &str) -> Result<TrackedWallet, WalletBookError> {
        let address = address.trim();
        let mut wallets = self.wallets.clone();
        let entry = wallets
            .remove(address)
            .ok_or_else(|| WalletBookError::NotTracked(address.to_string()))?;
        self.commit(wallets)?;

        tracing::info!("Stopped tracking wallet {}", address);
        Ok(TrackedWallet {
            address: address.to_string(),
            name: entry.name,
            added_at: entry.added_at,
        })
    }

    pub fn get(&self, address: &str) -> Option<TrackedWallet> {
        self.wallets.get(address.trim()).map(|entry| TrackedWallet {
            address: address.trim().to_string(),
            name: entry.name.clone(),
            added_at: entry.added_at,
        })
    }

    /// All tracked wallets, ordered by address
    pub fn list(&self) -> Vec<TrackedWallet> {
        self.wallets
            .iter()
            .map(|(address, entry)| TrackedWallet {
                address: address.clone(),
                name: entry.name.clone(),
                added_at: entry.added_at,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn clean_name(name: &str) -> Result<String, WalletBookError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WalletBookError::EmptyName);
    }
    Ok(name.to_string())
}
