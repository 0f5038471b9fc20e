//! Engine - schedules reads for one reader and fans results out to recorders

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use contracts::{ContractError, CorrelationToken, Mapper, ReadResult, Reader, Recorder};

use crate::error::EngineError;
use crate::handle::{EngineEvent, FanoutJob, RecorderHandle};
use crate::metrics::MetricsSnapshot;

/// Fixed safety margin added on top of every endpoint's configured timeout
pub const DEADLINE_MARGIN: Duration = Duration::from_secs(1);

/// Capacity of the internal completed-read results queue
const RESULT_QUEUE_CAPACITY: usize = 16;

/// Capacity of the internal worker-to-loop event queue
const EVENT_QUEUE_CAPACITY: usize = 16;

/// Outcome of one issued read, matched back to the loop by token
struct ReadOutcome {
    token: CorrelationToken,
    result: Result<ReadResult, ContractError>,
}

/// Builder for creating an Engine
///
/// Fails when a dependency is missing; issues pre-flight pings before
/// accepting any endpoint. Partial recorder ping failure degrades the live
/// set instead of failing construction.
#[derive(Default)]
pub struct EngineBuilder {
    reader: Option<Arc<dyn Reader>>,
    recorders: Vec<Arc<dyn Recorder>>,
    mapper: Option<Box<dyn Mapper>>,
    cancel: Option<CancellationToken>,
}

impl EngineBuilder {
    /// Create a new EngineBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reader
    pub fn reader(mut self, reader: Arc<dyn Reader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Add one recorder
    pub fn recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorders.push(recorder);
        self
    }

    /// Add several recorders
    pub fn recorders(mut self, recorders: impl IntoIterator<Item = Arc<dyn Recorder>>) -> Self {
        self.recorders.extend(recorders);
        self
    }

    /// Set the mapper
    pub fn mapper(mut self, mapper: Box<dyn Mapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Set the cancellation token
    pub fn cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the engine
    ///
    /// # Errors
    /// - Missing dependency ([`EngineError::NoReader`] and friends)
    /// - Reader ping failure, or every recorder ping failing
    ///   ([`EngineError::Ping`] naming the failed endpoints)
    pub async fn build(self) -> Result<Engine, EngineError> {
        let reader = self.reader.ok_or(EngineError::NoReader)?;
        if self.recorders.is_empty() {
            return Err(EngineError::NoRecorder);
        }
        let mapper = self.mapper.ok_or(EngineError::NoMapper)?;
        let cancel = self.cancel.ok_or(EngineError::NoCancel)?;

        if let Err(e) = reader.ping().await {
            warn!(reader = %reader.name(), error = %e, "reader ping failed");
            return Err(EngineError::Ping {
                endpoints: vec![reader.name().to_string()],
            });
        }

        let mut live = Vec::with_capacity(self.recorders.len());
        let mut failed = Vec::new();
        for recorder in self.recorders {
            match recorder.ping().await {
                Ok(()) => live.push(recorder),
                Err(e) => {
                    warn!(recorder = %recorder.name(), error = %e, "recorder ping failed, dropping from live set");
                    failed.push(recorder.name().to_string());
                }
            }
        }
        if live.is_empty() {
            return Err(EngineError::Ping { endpoints: failed });
        }

        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY.max(live.len()));
        let recorders = live
            .into_iter()
            .map(|r| RecorderHandle::spawn(r, events_tx.clone()))
            .collect();

        Ok(Engine {
            name: reader.name().to_string(),
            reader,
            mapper,
            recorders,
            cancel,
            events_rx: Some(events_rx),
            warned_empty: false,
        })
    }
}

/// The per-reader orchestrator
///
/// Owns its reader, its live recorder worker handles and the cancellation
/// token. Membership is mutated only by the engine's own loop; workers report
/// retirement over the internal event channel.
pub struct Engine {
    name: String,
    reader: Arc<dyn Reader>,
    mapper: Box<dyn Mapper>,
    recorders: Vec<RecorderHandle>,
    cancel: CancellationToken,
    events_rx: Option<mpsc::Receiver<EngineEvent>>,
    warned_empty: bool,
}

impl Engine {
    /// Engine name (the reader it serves)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of currently-live recorders
    pub fn recorder_count(&self) -> usize {
        self.recorders.len()
    }

    /// Get metrics for all live recorders
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.recorders
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the engine to completion
    ///
    /// Returns on cancellation or reader retirement, after draining in-flight
    /// reads and shutting every recorder worker down. Operational errors
    /// never escape: they are logged with the correlation token attached.
    pub async fn run(mut self) {
        info!(
            engine = %self.name,
            recorders = self.recorders.len(),
            interval_ms = self.reader.interval().as_millis() as u64,
            "engine started"
        );
        observability::record_engine_started();

        let (result_tx, mut result_rx) = mpsc::channel::<ReadOutcome>(RESULT_QUEUE_CAPACITY);
        let mut events_rx = self.events_rx.take().expect("run called once");
        let cancel = self.cancel.clone();
        let mut reads: JoinSet<()> = JoinSet::new();

        let mut ticker = tokio::time::interval(self.reader.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(engine = %self.name, "cancellation received, draining");
                    break;
                }
                _ = ticker.tick() => {
                    self.issue_read(&mut reads, result_tx.clone());
                }
                Some(outcome) = result_rx.recv() => {
                    if self.handle_outcome(outcome).is_break() {
                        break;
                    }
                }
                Some(event) = events_rx.recv() => {
                    self.handle_event(event).await;
                }
                // Reap finished read tasks so the set doesn't grow unbounded
                Some(_) = reads.join_next(), if !reads.is_empty() => {}
            }
        }

        drop(result_tx);
        self.drain(reads, result_rx, events_rx).await;
    }

    /// Spawn an asynchronous read bound to a fresh token and deadline
    fn issue_read(&self, reads: &mut JoinSet<()>, result_tx: mpsc::Sender<ReadOutcome>) {
        let reader = Arc::clone(&self.reader);
        let deadline = reader.timeout() + DEADLINE_MARGIN;
        let token = CorrelationToken::mint(deadline);
        observability::record_read_issued(&self.name);

        reads.spawn(async move {
            match tokio::time::timeout(deadline, reader.read(token)).await {
                Ok(result) => {
                    let _ = result_tx.send(ReadOutcome { token, result }).await;
                }
                Err(_) => {
                    // Abandoned past its deadline; a warning, never fatal.
                    warn!(
                        reader = %reader.name(),
                        token = %token,
                        "read exceeded its deadline and was abandoned"
                    );
                }
            }
        });
    }

    /// Process one completed read
    ///
    /// Breaks the loop only on reader retirement; every other error is logged
    /// and the loop continues.
    fn handle_outcome(&mut self, outcome: ReadOutcome) -> ControlFlow<()> {
        match outcome.result {
            Ok(result) => {
                self.fan_out(result);
                ControlFlow::Continue(())
            }
            Err(e) if e.is_backoff_exceeded() => {
                error!(
                    engine = %self.name,
                    token = %outcome.token,
                    error = %e,
                    "reader exceeded backoff threshold, stopping engine"
                );
                ControlFlow::Break(())
            }
            Err(e) => {
                observability::record_read_error(&self.name);
                warn!(
                    engine = %self.name,
                    token = %outcome.token,
                    error = %e,
                    "read failed"
                );
                ControlFlow::Continue(())
            }
        }
    }

    /// Fan one read result out to every live recorder
    ///
    /// The payload is transformed once; each recorder worker receives its own
    /// deep copy of the typed values via a non-blocking enqueue.
    fn fan_out(&mut self, result: ReadResult) {
        let values = match self.mapper.values(&self.name, &result.payload) {
            Ok(values) => values,
            Err(e) => {
                observability::record_job_errored(&self.name);
                warn!(
                    engine = %self.name,
                    token = %result.token,
                    error = %e,
                    "payload transform failed, result discarded"
                );
                return;
            }
        };

        if self.recorders.is_empty() {
            if !self.warned_empty {
                warn!(
                    engine = %self.name,
                    "no live recorders remain, read results are discarded"
                );
                self.warned_empty = true;
            }
            return;
        }

        let issued_at = result.issued_at;
        for handle in &self.recorders {
            handle.try_send(FanoutJob {
                token: result.token,
                values: values.clone(),
                issued_at,
            });
        }
    }

    /// Process one worker notification
    async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::RecorderRetired { recorder } => {
                let Some(idx) = self.recorders.iter().position(|h| h.name() == recorder)
                else {
                    return;
                };
                let handle = self.recorders.swap_remove(idx);
                error!(
                    engine = %self.name,
                    recorder = %recorder,
                    remaining = self.recorders.len(),
                    "recorder retired from live set"
                );
                handle.shutdown().await;

                if self.recorders.is_empty() && !self.warned_empty {
                    warn!(
                        engine = %self.name,
                        "no live recorders remain, read results are discarded"
                    );
                    self.warned_empty = true;
                }
            }
        }
    }

    /// Drain in-flight reads and shut every worker down
    async fn drain(
        mut self,
        mut reads: JoinSet<()>,
        mut result_rx: mpsc::Receiver<ReadOutcome>,
        mut events_rx: mpsc::Receiver<EngineEvent>,
    ) {
        debug!(engine = %self.name, in_flight = reads.len(), "draining in-flight reads");

        // Already-spawned reads run to their own deadlines.
        while reads.join_next().await.is_some() {}

        // Pending retirements first, so completed results are not fanned out
        // to workers that already quit.
        while let Ok(event) = events_rx.try_recv() {
            self.handle_event(event).await;
        }

        // All senders are gone, so this flushes buffered results and ends.
        while let Some(outcome) = result_rx.recv().await {
            if let Ok(result) = outcome.result {
                self.fan_out(result);
            }
        }

        for handle in self.recorders.drain(..) {
            handle.shutdown().await;
        }

        observability::record_engine_stopped();
        info!(engine = %self.name, "engine terminated");
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("recorders", &self.recorders.len())
            .finish_non_exhaustive()
    }
}
