//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    readers: Vec<ReaderInfo>,
    recorders: Vec<RecorderInfo>,
    routes: Vec<RouteInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    adjacency: Vec<EdgeInfo>,
}

#[derive(Serialize)]
struct ReaderInfo {
    name: String,
    url: String,
    interval_secs: f64,
    timeout_secs: f64,
    backoff_threshold: u32,
}

#[derive(Serialize)]
struct RecorderInfo {
    name: String,
    kind: String,
    index: String,
    type_name: String,
    queue_capacity: usize,
}

#[derive(Serialize)]
struct RouteInfo {
    name: String,
    readers: Vec<String>,
    recorders: Vec<String>,
}

#[derive(Serialize)]
struct EdgeInfo {
    reader: String,
    recorders: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args)?;
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args)?;
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) -> Result<ConfigInfo> {
    let readers = blueprint
        .readers
        .iter()
        .map(|r| ReaderInfo {
            name: r.name.clone(),
            url: r.url.clone(),
            interval_secs: r.interval_secs,
            timeout_secs: r.timeout_secs,
            backoff_threshold: r.backoff_threshold,
        })
        .collect();

    let recorders = blueprint
        .recorders
        .iter()
        .map(|r| RecorderInfo {
            name: r.name.clone(),
            kind: format!("{:?}", r.kind),
            index: r.index.clone(),
            type_name: r.type_name.clone(),
            queue_capacity: r.queue_capacity,
        })
        .collect();

    let routes = blueprint
        .routes
        .iter()
        .map(|(name, route)| RouteInfo {
            name: name.clone(),
            readers: route.readers.clone(),
            recorders: route.recorders.clone(),
        })
        .collect();

    let adjacency = if args.routes {
        routing::compile(&blueprint.routes)
            .context("Route table compilation failed")?
            .into_iter()
            .map(|(reader, recorders)| EdgeInfo {
                reader,
                recorders: recorders.into_iter().collect(),
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(ConfigInfo {
        readers,
        recorders,
        routes,
        adjacency,
    })
}

fn print_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) -> Result<()> {
    println!("=== Metrics Relay Configuration ===\n");

    println!("Readers ({})", blueprint.readers.len());
    for (i, reader) in blueprint.readers.iter().enumerate() {
        let prefix = if i == blueprint.readers.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        println!(
            "  {} {} ({}) every {}s, timeout {}s, {} strikes",
            prefix,
            reader.name,
            reader.url,
            reader.interval_secs,
            reader.timeout_secs,
            reader.backoff_threshold
        );
    }

    println!("\nRecorders ({})", blueprint.recorders.len());
    for (i, recorder) in blueprint.recorders.iter().enumerate() {
        let prefix = if i == blueprint.recorders.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        println!(
            "  {} {} ({:?}) -> index '{}', queue {}",
            prefix, recorder.name, recorder.kind, recorder.index, recorder.queue_capacity
        );
    }

    println!("\nRoutes ({})", blueprint.routes.len());
    let route_count = blueprint.routes.len();
    for (i, (name, route)) in blueprint.routes.iter().enumerate() {
        let prefix = if i == route_count - 1 { "└─" } else { "├─" };
        println!(
            "  {} {}: {:?} -> {:?}",
            prefix, name, route.readers, route.recorders
        );
    }

    if args.routes {
        let adjacency =
            routing::compile(&blueprint.routes).context("Route table compilation failed")?;
        println!("\nCompiled adjacency ({} engines)", adjacency.len());
        let edge_count = adjacency.len();
        for (i, (reader, recorders)) in adjacency.iter().enumerate() {
            let prefix = if i == edge_count - 1 { "└─" } else { "├─" };
            let names: Vec<&str> = recorders.iter().map(String::as_str).collect();
            println!("  {} {} -> {}", prefix, reader, names.join(", "));
        }
    }

    println!();
    Ok(())
}
