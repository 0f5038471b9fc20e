//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use crate::bootstrap::{Relay, RelayConfig};
use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        readers = blueprint.readers.len(),
        recorders = blueprint.recorders.len(),
        routes = blueprint.routes.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let relay_config = RelayConfig {
        blueprint,
        shutdown_grace: Duration::from_secs(args.shutdown_grace),
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    info!("Starting relay...");
    Relay::new(relay_config).run().await
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RelayBlueprint) {
    println!("\n=== Configuration Summary ===\n");

    println!("Readers ({}):", blueprint.readers.len());
    for reader in &blueprint.readers {
        println!(
            "  - {} ({}) every {}s",
            reader.name, reader.url, reader.interval_secs
        );
    }

    println!("\nRecorders ({}):", blueprint.recorders.len());
    for recorder in &blueprint.recorders {
        println!(
            "  - {} ({:?}) -> index '{}'",
            recorder.name, recorder.kind, recorder.index
        );
    }

    println!("\nRoutes ({}):", blueprint.routes.len());
    for (name, route) in &blueprint.routes {
        println!(
            "  - {}: {:?} -> {:?}",
            name, route.readers, route.recorders
        );
    }

    println!();
}
