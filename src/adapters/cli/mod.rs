//! CLI Adapter
//!
//! Command-line interface for Zinc.
//! Uses clap derive macros for argument parsing; `output` renders results as text.

mod commands;
pub mod output;

pub use commands::{
    CliApp, Command, PairCmd, AnalyzeCmd, HoldersCmd, SearchCmd, TrendingCmd, WhalesCmd,
    WalletCmd, WatchCmd, Side,
};
