//! Relay bootstrap - builds endpoint catalogs and supervises the fleet.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use contracts::{Reader, Recorder, RecorderKind, RelayBlueprint};
use endpoints::{ExpvarReader, FileRecorder, FlattenMapper, LogRecorder};
use service::Service;

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// The relay blueprint
    pub blueprint: RelayBlueprint,

    /// How long to wait for engines to drain after a shutdown signal
    pub shutdown_grace: Duration,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Top-level orchestrator: catalogs, service, shutdown
pub struct Relay {
    config: RelayConfig,
}

impl Relay {
    /// Create a new relay with the given configuration
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Run the relay until its engines finish or a shutdown signal arrives
    pub async fn run(self) -> Result<()> {
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let adjacency =
            routing::compile(&blueprint.routes).context("Route table compilation failed")?;

        let readers = build_readers(blueprint)?;
        let recorders = build_recorders(blueprint)?;

        info!(
            readers = readers.len(),
            recorders = recorders.len(),
            engines = adjacency.len(),
            "Catalogs built"
        );

        let cancel = CancellationToken::new();
        let service = Service::new(
            adjacency,
            readers,
            recorders,
            Box::new(FlattenMapper::new()),
            cancel.clone(),
        );

        let handle = service
            .start()
            .await
            .context("Failed to start the relay fleet")?;

        info!(engines = handle.engine_count(), "Relay started");

        let fleet = handle.wait();
        tokio::pin!(fleet);

        tokio::select! {
            _ = &mut fleet => {
                info!("All engines terminated on their own");
            }
            _ = shutdown_signal() => {
                warn!("Received shutdown signal, draining engines...");
                cancel.cancel();

                let grace = self.config.shutdown_grace;
                if tokio::time::timeout(grace, &mut fleet).await.is_err() {
                    warn!(
                        grace_secs = grace.as_secs(),
                        "Engines did not drain within the grace period"
                    );
                }
            }
        }

        info!("Metrics Relay finished");
        Ok(())
    }
}

/// Instantiate one HTTP reader per declared source endpoint
fn build_readers(blueprint: &RelayBlueprint) -> Result<HashMap<String, Arc<dyn Reader>>> {
    let mut readers: HashMap<String, Arc<dyn Reader>> = HashMap::new();
    for config in &blueprint.readers {
        let reader = ExpvarReader::new(config)
            .with_context(|| format!("Failed to build reader '{}'", config.name))?;
        readers.insert(config.name.clone(), Arc::new(reader));
    }
    Ok(readers)
}

/// Instantiate one recorder per declared destination endpoint
fn build_recorders(blueprint: &RelayBlueprint) -> Result<HashMap<String, Arc<dyn Recorder>>> {
    let mut recorders: HashMap<String, Arc<dyn Recorder>> = HashMap::new();
    for config in &blueprint.recorders {
        let recorder: Arc<dyn Recorder> = match config.kind {
            RecorderKind::Log => Arc::new(LogRecorder::new(config)),
            RecorderKind::File => Arc::new(
                FileRecorder::new(config)
                    .with_context(|| format!("Failed to build recorder '{}'", config.name))?,
            ),
        };
        recorders.insert(config.name.clone(), recorder);
    }
    Ok(recorders)
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
