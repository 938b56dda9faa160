//! CLI Command Definitions
//!
//! Argument parsing for the `zinc` binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::domain::WhaleDirection;

/// Zinc - Solana token safety scoring and market dashboard
#[derive(Parser, Debug)]
#[command(
    name = "zinc",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Solana token safety scoring and market dashboard",
    long_about = "Zinc looks up DexScreener market pairs, measures holder concentration \
                  over Solana RPC and combines both into a 0-100 safety score."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to configuration file (defaults to config/zinc.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the best market pair for a token
    Pair(PairCmd),

    /// Score a token's safety (0-100)
    Analyze(AnalyzeCmd),

    /// Show top holders and concentration for a mint
    Holders(HoldersCmd),

    /// Search market pairs by name, symbol or address
    Search(SearchCmd),

    /// Show boosted tokens and their best pairs
    Trending(TrendingCmd),

    /// Show recent whale buy/sell alerts
    Whales(WhalesCmd),

    /// Manage tracked wallets
    #[command(subcommand)]
    Wallet(WalletCmd),

    /// Refresh market pairs for a watchlist until interrupted
    Watch(WatchCmd),
}

/// Best pair lookup
#[derive(Parser, Debug)]
pub struct PairCmd {
    /// Token mint address (or pool address with --pool)
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Treat ADDRESS as a pool address
    #[arg(long)]
    pub pool: bool,
}

/// Safety analysis
#[derive(Parser, Debug)]
pub struct AnalyzeCmd {
    /// Token mint address
    #[arg(value_name = "MINT")]
    pub token: String,
}

/// Holder breakdown
#[derive(Parser, Debug)]
pub struct HoldersCmd {
    /// Token mint address
    #[arg(value_name = "MINT")]
    pub mint: String,

    /// Number of holders to list (at most 10)
    #[arg(short, long, value_name = "N", default_value = "10")]
    pub top: usize,
}

/// Pair search
#[derive(Parser, Debug)]
pub struct SearchCmd {
    /// Search text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum results
    #[arg(short, long, value_name = "N", default_value = "10")]
    pub limit: usize,
}

/// Boosted tokens
#[derive(Parser, Debug)]
pub struct TrendingCmd {
    /// Maximum tokens (defaults to market.trending_limit)
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,
}

/// Whale side filter
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl From<Side> for WhaleDirection {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => WhaleDirection::Buy,
            Side::Sell => WhaleDirection::Sell,
        }
    }
}

/// Whale alerts
#[derive(Parser, Debug)]
pub struct WhalesCmd {
    /// Maximum alerts (defaults to feed.limit)
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Only show one side
    #[arg(long, value_enum)]
    pub side: Option<Side>,
}

/// Wallet book commands
#[derive(Subcommand, Debug)]
pub enum WalletCmd {
    /// Start tracking a wallet
    Add {
        #[arg(value_name = "ADDRESS")]
        address: String,
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Rename a tracked wallet
    Rename {
        #[arg(value_name = "ADDRESS")]
        address: String,
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Stop tracking a wallet
    Remove {
        #[arg(value_name = "ADDRESS")]
        address: String,
    },

    /// List tracked wallets
    List,

    /// Show balances for one tracked wallet, or all of them
    Show {
        #[arg(value_name = "ADDRESS")]
        address: Option<String>,
    },
}

/// Watchlist loop
#[derive(Parser, Debug)]
pub struct WatchCmd {
    /// Token mints (defaults to watch.tokens)
    #[arg(value_name = "MINT")]
    pub tokens: Vec<String>,

    /// Refresh interval in seconds (defaults to watch.interval_secs)
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    #[test]
    fn test_cli_app_parse_analyze() {
        let args = vec!["zinc", "analyze", MINT];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Analyze(cmd) => assert_eq!(cmd.token, MINT),
            _ => panic!("Expected Analyze command"),
        }
        assert!(!app.json);
        assert!(app.config.is_none());
    }

    #[test]
    fn test_cli_app_global_flags_after_subcommand() {
        let args = vec!["zinc", "pair", MINT, "--json", "--config", "custom.toml", "-v"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(app.json);
        assert!(app.verbose);
        assert_eq!(app.config, Some(PathBuf::from("custom.toml")));
        match app.command {
            Command::Pair(cmd) => assert!(!cmd.pool),
            _ => panic!("Expected Pair command"),
        }
    }

    #[test]
    fn test_cli_app_parse_holders_default_top() {
        let args = vec!["zinc", "holders", MINT];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Holders(cmd) => assert_eq!(cmd.top, 10),
            _ => panic!("Expected Holders command"),
        }
    }

    #[test]
    fn test_cli_app_parse_search() {
        let args = vec!["zinc", "search", "bonk", "--limit", "3"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Search(cmd) => {
                assert_eq!(cmd.query, "bonk");
                assert_eq!(cmd.limit, 3);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_app_parse_whales_side() {
        let args = vec!["zinc", "whales", "--side", "sell"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Whales(cmd) => {
                assert_eq!(cmd.side, Some(Side::Sell));
                assert_eq!(cmd.limit, None);
                assert_eq!(WhaleDirection::from(Side::Sell), WhaleDirection::Sell);
            }
            _ => panic!("Expected Whales command"),
        }
    }

    #[test]
    fn test_cli_app_parse_wallet_add() {
        let args = vec!["zinc", "wallet", "add", MINT, "treasury"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Wallet(WalletCmd::Add { address, name }) => {
                assert_eq!(address, MINT);
                assert_eq!(name, "treasury");
            }
            _ => panic!("Expected Wallet Add command"),
        }
    }

    #[test]
    fn test_cli_app_parse_wallet_show_all() {
        let args = vec!["zinc", "wallet", "show"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(matches!(app.command, Command::Wallet(WalletCmd::Show { address: None })));
    }

    #[test]
    fn test_cli_app_parse_watch() {
        let args = vec!["zinc", "watch", MINT, MINT, "--interval", "5"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Watch(cmd) => {
                assert_eq!(cmd.tokens.len(), 2);
                assert_eq!(cmd.interval, Some(5));
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_cli_app_requires_command() {
        assert!(CliApp::try_parse_from(vec!["zinc"]).is_err());
        assert!(CliApp::try_parse_from(vec!["zinc", "whales", "--side", "both"]).is_err());
    }
}
