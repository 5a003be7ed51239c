//! CLI Command Definitions
//!
//! Arguments for the boost-tracker binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, RefreshMode};

/// Boost Tracker - DexScreener boost monitor for Solana tokens
#[derive(Parser, Debug)]
#[command(
    name = "boost-tracker",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "DexScreener boost monitor for Solana tokens",
    long_about = "Boost Tracker polls the DexScreener boost feed, records market cap, price \
                  and holder concentration of newly boosted Solana tokens, and writes \
                  numbered JSON snapshots of their price history."
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
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the monitor
    Run(RunCmd),

    /// Rank tokens of a snapshot by peak gain
    Report(ReportCmd),

    /// Validate and print the effective configuration
    CheckConfig(CheckConfigCmd),
}

/// Start the poll loop
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/tracker.toml")]
    pub config: PathBuf,

    /// Override RPC URL
    #[arg(long, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Refresh mode: price or market-cap
    #[arg(long, value_name = "MODE")]
    pub mode: Option<RefreshMode>,

    /// Override snapshot directory
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

impl RunCmd {
    /// Apply command-line overrides on top of the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.rpc_url {
            config.solana.rpc_url = url.clone();
        }
        if let Some(mode) = self.mode {
            config.tracker.refresh_mode = mode;
        }
        if let Some(dir) = &self.data_dir {
            config.output.data_dir = dir.to_string_lossy().to_string();
        }
    }
}

/// Print a ranking from a snapshot file
#[derive(Parser, Debug)]
pub struct ReportCmd {
    /// Path to configuration file (for the data directory)
    #[arg(short, long, value_name = "FILE", default_value = "config/tracker.toml")]
    pub config: PathBuf,

    /// Snapshot file; defaults to the latest one under the data directory
    #[arg(short, long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Number of tokens to show
    #[arg(short, long, default_value = "20")]
    pub top: usize,
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct CheckConfigCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/tracker.toml")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_defaults() {
        let app = CliApp::try_parse_from(["boost-tracker", "run"]).unwrap();
        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("config/tracker.toml"));
                assert!(cmd.rpc_url.is_none());
                assert!(cmd.mode.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(!app.verbose);
    }

    #[test]
    fn test_parse_run_overrides() {
        let app = CliApp::try_parse_from([
            "boost-tracker",
            "--debug",
            "run",
            "--rpc-url",
            "https://rpc.example.com",
            "--mode",
            "market-cap",
            "--data-dir",
            "/tmp/boosts",
        ])
        .unwrap();
        assert!(app.debug);

        let Command::Run(cmd) = app.command else {
            panic!("expected run");
        };
        let mut config = Config::default();
        cmd.apply_overrides(&mut config);

        assert_eq!(config.solana.rpc_url, "https://rpc.example.com");
        assert_eq!(config.tracker.refresh_mode, RefreshMode::MarketCap);
        assert_eq!(config.output.data_dir, "/tmp/boosts");
    }

    #[test]
    fn test_parse_bad_mode() {
        assert!(CliApp::try_parse_from(["boost-tracker", "run", "--mode", "volume"]).is_err());
    }

    #[test]
    fn test_parse_report() {
        let app = CliApp::try_parse_from(["boost-tracker", "report", "--top", "5"]).unwrap();
        match app.command {
            Command::Report(cmd) => {
                assert_eq!(cmd.top, 5);
                assert!(cmd.snapshot.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
