//! Zinc - Solana token dashboard
//!
//! Looks up market pairs, holder concentration and safety scores from the
//! command line.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use zinc::adapters::cli::output;
use zinc::adapters::cli::{
    AnalyzeCmd, CliApp, Command, HoldersCmd, PairCmd, SearchCmd, TrendingCmd, WalletCmd, WatchCmd,
    WhalesCmd,
};
use zinc::adapters::dexscreener::DexScreenerClient;
use zinc::adapters::fetch::RateLimitedFetcher;
use zinc::adapters::social_feed::FeedClient;
use zinc::adapters::solana_rpc::{HttpRpcTransport, SolanaChainClient};
use zinc::application::{AnalysisService, WatchlistMonitor};
use zinc::config::Config;
use zinc::domain::{AnalysisError, SafetyScorer, WalletBook, WhaleDirection};

type Service = AnalysisService<DexScreenerClient, SolanaChainClient<HttpRpcTransport>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (SOLANA_RPC_URL and friends)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config = Config::resolve(app.config.as_deref()).context("Failed to load configuration")?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    let json = app.json;
    match app.command {
        Command::Pair(cmd) => pair_command(&config, cmd, json).await,
        Command::Analyze(cmd) => analyze_command(&config, cmd, json).await,
        Command::Holders(cmd) => holders_command(&config, cmd, json).await,
        Command::Search(cmd) => search_command(&config, cmd, json).await,
        Command::Trending(cmd) => trending_command(&config, cmd, json).await,
        Command::Whales(cmd) => whales_command(&config, cmd, json).await,
        Command::Wallet(cmd) => wallet_command(&config, cmd, json).await,
        Command::Watch(cmd) => watch_command(&config, cmd, json).await,
    }
}

/// Initialize logging. RUST_LOG wins, then the CLI flags, then the config level.
fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let fallback = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        config_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn build_service(config: &Config) -> Result<Arc<Service>> {
    let fetcher = RateLimitedFetcher::new(config.rate_limit.clone());
    let market = DexScreenerClient::new(config.market.client_config(), fetcher)
        .context("Failed to create DexScreener client")?;
    let chain = SolanaChainClient::from_config(&config.rpc.client_config())
        .context("Failed to create Solana RPC client")?;

    Ok(Arc::new(AnalysisService::new(
        Arc::new(market),
        Arc::new(chain),
        SafetyScorer::with_policy(config.scoring.clone()),
    )))
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

/// Attach a hint for errors that may clear up on their own
fn with_hint(err: AnalysisError, what: &str) -> anyhow::Error {
    let hint = if err.is_retryable() {
        "\nThe upstream service may be busy; try again in a moment."
    } else {
        ""
    };
    anyhow::anyhow!("{} failed: {}{}", what, err, hint)
}

async fn pair_command(config: &Config, cmd: PairCmd, json: bool) -> Result<()> {
    let service = build_service(config)?;
    let pair = if cmd.pool {
        service.pair_by_address(&config.market.chain_id, &cmd.address).await
    } else {
        service.resolve_market_pair(&cmd.address).await
    }
    .map_err(|e| with_hint(e, "Pair lookup"))?;

    match pair {
        Some(pair) => emit(json, &pair, output::render_pair),
        None => bail!("No {} pairs found for {}", config.market.chain_id, cmd.address),
    }
}

async fn analyze_command(config: &Config, cmd: AnalyzeCmd, json: bool) -> Result<()> {
    let service = build_service(config)?;

    let analysis = service
        .analyze_token_safety(&cmd.token)
        .await
        .map_err(|e| with_hint(e, "Safety analysis"))?;

    emit(json, &analysis, output::render_analysis)
}

async fn holders_command(config: &Config, cmd: HoldersCmd, json: bool) -> Result<()> {
    let service = build_service(config)?;
    let analysis = service
        .get_holder_breakdown(&cmd.mint)
        .await
        .map_err(|e| with_hint(e, "Holder breakdown"))?;

    emit(json, &analysis, |a| output::render_holders(a, cmd.top))
}

async fn search_command(config: &Config, cmd: SearchCmd, json: bool) -> Result<()> {
    let service = build_service(config)?;
    let mut pairs = service
        .search(&cmd.query)
        .await
        .map_err(|e| with_hint(e, "Search"))?;
    pairs.truncate(cmd.limit);

    emit(json, &pairs, |p| output::render_pair_list(p))
}

async fn trending_command(config: &Config, cmd: TrendingCmd, json: bool) -> Result<()> {
    let service = build_service(config)?;
    let limit = cmd.limit.unwrap_or(config.market.trending_limit);
    let tokens = service
        .trending(limit)
        .await
        .map_err(|e| with_hint(e, "Trending lookup"))?;

    emit(json, &tokens, |t| output::render_trending(t))
}

async fn whales_command(config: &Config, cmd: WhalesCmd, json: bool) -> Result<()> {
    let Some(mut feed_config) = config.feed.client_config() else {
        bail!("No whale feed configured; set [feed] url in the config file");
    };
    if let Some(limit) = cmd.limit {
        feed_config.limit = limit;
    }

    let client = FeedClient::new(feed_config, RateLimitedFetcher::new(config.rate_limit.clone()))
        .context("Failed to create feed client")?;
    let mut alerts = client
        .whale_alerts()
        .await
        .map_err(|e| with_hint(e.into(), "Whale feed"))?;

    if let Some(side) = cmd.side {
        let direction = WhaleDirection::from(side);
        alerts.retain(|a| a.direction == direction);
    }

    emit(json, &alerts, |a| output::render_whales(a))
}

async fn wallet_command(config: &Config, cmd: WalletCmd, json: bool) -> Result<()> {
    let path = config.wallets.resolved_path();
    let mut book = WalletBook::open(&path)
        .with_context(|| format!("Failed to open wallet book {}", path.display()))?;

    match cmd {
        WalletCmd::Add { address, name } => {
            let wallet = book.add(&address, &name)?;
            println!("Tracking {} as {}", wallet.address, wallet.name);
        }
        WalletCmd::Rename { address, name } => {
            book.rename(&address, &name)?;
            println!("Renamed {} to {}", address, name);
        }
        WalletCmd::Remove { address } => {
            let wallet = book.remove(&address)?;
            println!("Stopped tracking {} ({})", wallet.name, wallet.address);
        }
        WalletCmd::List => {
            emit(json, &book.list(), |w| output::render_wallets(w))?;
        }
        WalletCmd::Show { address } => {
            let wallets = match address {
                Some(address) => match book.get(&address) {
                    Some(wallet) => vec![wallet],
                    None => bail!("Wallet not tracked: {}", address),
                },
                None => book.list(),
            };

            let service = build_service(config)?;
            for wallet in &wallets {
                let portfolio = service
                    .wallet_portfolio(wallet)
                    .await
                    .map_err(|e| with_hint(e, "Wallet lookup"))?;
                emit(json, &portfolio, output::render_portfolio)?;
            }
        }
    }
    Ok(())
}

async fn watch_command(config: &Config, cmd: WatchCmd, json: bool) -> Result<()> {
    let tokens = if cmd.tokens.is_empty() {
        config.watch.tokens.clone()
    } else {
        cmd.tokens
    };
    if tokens.is_empty() {
        bail!("Nothing to watch; pass token addresses or set [watch] tokens");
    }
    let interval = Duration::from_secs(cmd.interval.unwrap_or(config.watch.interval_secs).max(1));

    let fetcher = RateLimitedFetcher::new(config.rate_limit.clone());
    let market = Arc::new(
        DexScreenerClient::new(config.market.client_config(), fetcher)
            .context("Failed to create DexScreener client")?,
    );
    let monitor = Arc::new(WatchlistMonitor::new(market, tokens, interval)?);

    // Setup Ctrl+C handler
    let handle = monitor.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop();
    });

    let (tx, mut rx) = mpsc::channel(32);
    let runner = monitor.clone();
    let run = tokio::spawn(async move { runner.run(tx).await });

    while let Some(snapshot) = rx.recv().await {
        if json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            println!("{}", output::render_snapshot(&snapshot));
        }
    }

    run.await.context("Watch loop panicked")?;
    tracing::info!("Watch stopped");
    Ok(())
}
