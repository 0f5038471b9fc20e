//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Metrics Relay - polls expvar endpoints and ships typed records to destinations
#[derive(Parser, Debug)]
#[command(
    name = "metrics-relay",
    author,
    version,
    about = "Expvar metrics relay",
    long_about = "Polls expvar-style JSON endpoints on per-endpoint intervals, flattens the \n\
                  payloads into typed key/value records, and fans them out to the \n\
                  destinations wired up by the configured route table."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "METRICS_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "METRICS_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "relay.toml",
        env = "METRICS_RELAY_CONFIG"
    )]
    pub config: PathBuf,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Seconds to wait for engines to drain after a shutdown signal
    #[arg(long, default_value = "10", env = "METRICS_RELAY_SHUTDOWN_GRACE")]
    pub shutdown_grace: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "METRICS_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the compiled reader -> recorder adjacency
    #[arg(long)]
    pub routes: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
