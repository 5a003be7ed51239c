//! Boost Tracker - DexScreener boost monitor
//!
//! Polls the boost feed, tracks newly boosted Solana tokens and writes
//! numbered JSON snapshots of their price history.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use boost_tracker::adapters::cli::{CheckConfigCmd, CliApp, Command, ReportCmd, RunCmd};
use boost_tracker::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use boost_tracker::adapters::jupiter::{JupiterPriceClient, JupiterPriceConfig};
use boost_tracker::adapters::solana::{parse_commitment, HolderConcentrationClient, SolanaClient};
use boost_tracker::application::{format_report, rank_by_peak, BoostMonitor, BoostTracker};
use boost_tracker::config::{load_or_default, Config};
use boost_tracker::domain::{latest_snapshot, load_snapshot, ExclusionSet, SnapshotWriter, TokenLedger};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (RPC endpoint usually lives there)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    let config_path = match &app.command {
        Command::Run(cmd) => cmd.config.clone(),
        Command::Report(cmd) => cmd.config.clone(),
        Command::CheckConfig(cmd) => cmd.config.clone(),
    };
    let config = load_or_default(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    init_logging(app.verbose, app.debug, &config.logging.level)?;
    if !config_path.exists() {
        tracing::warn!("Config file {} not found, using defaults", config_path.display());
    }

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Report(cmd) => report_command(cmd, config),
        Command::CheckConfig(cmd) => check_config_command(cmd, config),
    }
}

fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(config_level).context("Invalid log level in config")?
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

async fn run_command(cmd: RunCmd, mut config: Config) -> Result<()> {
    tracing::info!("Starting boost tracker...");

    cmd.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let rpc_url = match &cmd.rpc_url {
        Some(url) => url.clone(),
        None => config.require_rpc_url()?,
    };
    let commitment = parse_commitment(&config.solana.commitment)?;

    // Build components
    let dexscreener = Arc::new(
        DexScreenerClient::with_config(DexScreenerConfig {
            base_url: config.feed.api_url.clone(),
            chain_id: config.feed.chain_id.clone(),
            timeout: Duration::from_secs(config.feed.timeout_secs),
        })
        .context("Failed to create DexScreener client")?,
    );
    let oracle = JupiterPriceClient::with_config(JupiterPriceConfig {
        api_url: config.oracle.api_url.clone(),
        batch_size: config.oracle.batch_size,
        batch_delay: Duration::from_millis(config.oracle.batch_delay_ms),
        timeout: Duration::from_secs(config.oracle.timeout_secs),
    })
    .context("Failed to create Jupiter price client")?;
    let holders = HolderConcentrationClient::new(SolanaClient::new(rpc_url, commitment));

    let tracker = BoostTracker::new(
        dexscreener.clone(),
        Arc::new(holders),
        Arc::new(oracle),
        TokenLedger::new(config.tracker.max_tokens),
        ExclusionSet::new(config.valuation.market_cap_ceiling),
    )
    .with_mode(config.tracker.refresh_mode);

    let writer = SnapshotWriter::create_run(&config.output.data_dir_path())
        .context("Failed to create snapshot directory")?;

    let mut monitor = BoostMonitor::new(dexscreener, tracker, writer)
        .with_poll_interval(Duration::from_secs(config.tracker.poll_interval_secs))
        .with_refresh_period(config.tracker.refresh_every_cycles);

    // Setup Ctrl+C handler
    let handle = monitor.handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop().await;
    });

    monitor.run().await?;

    let status = monitor.status().await;
    tracing::info!(
        "Boost tracker stopped: {} tokens tracked, {} excluded, {} snapshots in {}",
        status.tracked,
        status.excluded,
        status.snapshots_written,
        status.run_dir.display()
    );
    Ok(())
}

fn report_command(cmd: ReportCmd, config: Config) -> Result<()> {
    let path = match cmd.snapshot {
        Some(path) => path,
        None => latest_snapshot(&config.output.data_dir_path()).context("No snapshot to report on")?,
    };

    let records = load_snapshot(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let ranked = rank_by_peak(&records, cmd.top);

    println!("Snapshot: {} ({} tokens)", path.display(), records.len());
    print!("{}", format_report(&ranked));
    Ok(())
}

fn check_config_command(cmd: CheckConfigCmd, config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    println!("Configuration: {}", cmd.config.display());
    println!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);

    match config.require_rpc_url() {
        Ok(url) => println!("Effective RPC endpoint: {}", url),
        Err(e) => println!("Warning: {}", e),
    }
    Ok(())
}
