//! RecorderHandle - manages a recorder with isolated queue and worker task

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use contracts::{CorrelationToken, RecordJob, Recorder, TypedValue};

use crate::engine::DEADLINE_MARGIN;
use crate::metrics::RecorderMetrics;

/// Internal notification from a worker back to its engine loop
///
/// Membership is owned by the engine loop alone; workers message it instead
/// of mutating shared state.
#[derive(Debug)]
pub(crate) enum EngineEvent {
    /// A recorder exceeded its backoff threshold and must be removed
    RecorderRetired { recorder: String },
}

/// One transformed read result addressed to one recorder's queue
///
/// The engine loop runs the mapper once per read; each worker gets its own
/// copy of the resulting values, so workers never share mutable backing
/// storage.
#[derive(Debug, Clone)]
pub struct FanoutJob {
    pub token: CorrelationToken,
    pub values: Vec<TypedValue>,
    pub issued_at: SystemTime,
}

/// Handle to a running recorder worker
pub struct RecorderHandle {
    /// Recorder name
    name: String,
    /// Channel to send jobs to the worker
    tx: mpsc::Sender<FanoutJob>,
    /// Shared metrics
    metrics: Arc<RecorderMetrics>,
    /// Worker task handle
    worker: JoinHandle<()>,
}

impl RecorderHandle {
    /// Spawn the worker task for one recorder
    pub(crate) fn spawn(
        recorder: Arc<dyn Recorder>,
        events: mpsc::Sender<EngineEvent>,
    ) -> Self {
        let name = recorder.name().to_string();
        let (tx, rx) = mpsc::channel(recorder.queue_capacity());
        let metrics = Arc::new(RecorderMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker = tokio::spawn(recorder_worker(recorder, rx, worker_metrics, events));

        Self {
            name,
            tx,
            metrics,
            worker,
        }
    }

    /// Get recorder name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<RecorderMetrics> {
        &self.metrics
    }

    /// Send a job to the recorder (non-blocking)
    ///
    /// Returns true if enqueued, false if the queue was full (job dropped and
    /// counted) or the worker is gone. Never blocks the scheduling loop.
    pub fn try_send(&self, job: FanoutJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => {
                self.metrics.set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(j)) => {
                self.metrics.job_dropped();
                observability::record_job_dropped(&self.name);
                warn!(
                    recorder = %self.name,
                    token = %j.token,
                    "queue full, job dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(recorder = %self.name, "recorder worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the recorder worker gracefully
    ///
    /// Drops the sender so the worker drains its queue, then joins it.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            error!(recorder = %self.name, error = ?e, "worker task panicked");
        }
        debug!(recorder = %self.name, "recorder handle shutdown complete");
    }
}

/// Worker task that consumes fan-out jobs and ships them to one recorder
async fn recorder_worker(
    recorder: Arc<dyn Recorder>,
    mut rx: mpsc::Receiver<FanoutJob>,
    metrics: Arc<RecorderMetrics>,
    events: mpsc::Sender<EngineEvent>,
) {
    let name = recorder.name().to_string();
    let deadline = recorder.timeout() + DEADLINE_MARGIN;
    debug!(recorder = %name, "recorder worker started");

    while let Some(job) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        // Destination fields are copied from the recorder's current
        // configuration here and never mutated after dispatch.
        let record = RecordJob {
            token: job.token,
            values: job.values,
            index: recorder.index_name().to_string(),
            type_name: recorder.type_name().to_string(),
            timestamp: job.issued_at,
        };
        let token = record.token;

        match tokio::time::timeout(deadline, recorder.record(record)).await {
            Ok(Ok(())) => {
                metrics.job_recorded();
                observability::record_job_recorded(&name);
            }
            Ok(Err(e)) if e.is_backoff_exceeded() => {
                metrics.job_failed();
                error!(
                    recorder = %name,
                    token = %token,
                    error = %e,
                    "recorder exceeded backoff threshold, retiring"
                );
                let _ = events
                    .send(EngineEvent::RecorderRetired {
                        recorder: name.clone(),
                    })
                    .await;
                break;
            }
            Ok(Err(e)) => {
                metrics.job_failed();
                observability::record_record_error(&name);
                error!(
                    recorder = %name,
                    token = %token,
                    error = %e,
                    "record failed"
                );
            }
            Err(_) => {
                metrics.job_abandoned();
                observability::record_job_abandoned(&name);
                warn!(
                    recorder = %name,
                    token = %token,
                    "record exceeded its deadline and was abandoned"
                );
            }
        }
    }

    debug!(recorder = %name, "recorder worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::{ContractError, MetricValue, TypedValue};
    use std::time::Duration;

    /// Recorder whose record call never returns within any sane deadline
    struct StuckRecorder;

    #[async_trait]
    impl Recorder for StuckRecorder {
        async fn ping(&self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn record(&self, _job: RecordJob) -> Result<(), ContractError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        fn name(&self) -> &str {
            "stuck"
        }

        fn index_name(&self) -> &str {
            "idx"
        }

        fn type_name(&self) -> &str {
            "doc"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(10)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_overrun_counts_as_abandoned_not_failed() {
        let (events_tx, mut events_rx) = mpsc::channel(4);
        let handle = RecorderHandle::spawn(Arc::new(StuckRecorder), events_tx);

        assert!(handle.try_send(FanoutJob {
            token: CorrelationToken::mint(Duration::from_secs(1)),
            values: vec![TypedValue::new("a", MetricValue::Int(1))],
            issued_at: SystemTime::now(),
        }));

        // Paused clock: sleeping past the derived deadline fires the timeout.
        tokio::time::sleep(Duration::from_secs(2)).await;

        let snap = handle.metrics().snapshot();
        assert_eq!(snap.abandoned, 1);
        assert_eq!(snap.failed, 0);
        // An overrun is a warning, never a retirement.
        assert!(events_rx.try_recv().is_err());

        handle.shutdown().await;
    }
}
