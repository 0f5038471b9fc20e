//! LogRecorder - logs job summaries via tracing

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use contracts::{ContractError, RecordJob, Recorder, RecorderConfig};

/// Recorder that logs job summaries for debugging
pub struct LogRecorder {
    name: String,
    index: String,
    type_name: String,
    timeout: Duration,
    queue_capacity: usize,
}

impl LogRecorder {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            name: config.name.clone(),
            index: config.index.clone(),
            type_name: config.type_name.clone(),
            timeout: config.timeout(),
            queue_capacity: config.queue_capacity,
        }
    }
}

#[async_trait]
impl Recorder for LogRecorder {
    async fn ping(&self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn record(&self, job: RecordJob) -> Result<(), ContractError> {
        info!(
            recorder = %self.name,
            token = %job.token,
            index = %job.index,
            values = job.values.len(),
            "job received"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn index_name(&self) -> &str {
        &self.index
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CorrelationToken, MetricValue, TypedValue};
    use std::time::SystemTime;

    fn config() -> RecorderConfig {
        RecorderConfig {
            name: "debug_log".to_string(),
            kind: contracts::RecorderKind::Log,
            index: "metrics".to_string(),
            type_name: "metrics".to_string(),
            timeout_secs: 1.0,
            backoff_threshold: 5,
            queue_capacity: 8,
            params: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_record_succeeds() {
        let recorder = LogRecorder::new(&config());
        let job = RecordJob {
            token: CorrelationToken::mint(Duration::from_secs(1)),
            values: vec![TypedValue::new("app.x", MetricValue::Int(1))],
            index: "metrics".to_string(),
            type_name: "metrics".to_string(),
            timestamp: SystemTime::now(),
        };
        assert!(recorder.record(job).await.is_ok());
    }

    #[test]
    fn test_config_carried_through() {
        let recorder = LogRecorder::new(&config());
        assert_eq!(recorder.name(), "debug_log");
        assert_eq!(recorder.index_name(), "metrics");
        assert_eq!(recorder.queue_capacity(), 8);
    }
}
