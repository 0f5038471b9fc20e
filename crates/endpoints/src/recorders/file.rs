//! FileRecorder - appends NDJSON documents per index under a base directory

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use contracts::{ContractError, MetricValue, RecordJob, Recorder, RecorderConfig};

use crate::backoff::BackoffGate;

/// Recorder that appends one JSON document per line to `<base>/<index>.ndjson`
///
/// Shared across engines, so appends are serialized through a mutex to keep
/// lines whole. Repeated append failures count strikes against the backoff
/// gate until the recorder retires.
pub struct FileRecorder {
    name: String,
    index: String,
    type_name: String,
    timeout: Duration,
    queue_capacity: usize,
    base_path: PathBuf,
    backoff: BackoffGate,
    write_lock: Mutex<()>,
}

impl FileRecorder {
    /// Create the recorder, ensuring the base directory exists
    pub fn new(config: &RecorderConfig) -> std::io::Result<Self> {
        let base_path = base_path_from_params(&config.params);
        std::fs::create_dir_all(&base_path)?;

        Ok(Self {
            name: config.name.clone(),
            index: config.index.clone(),
            type_name: config.type_name.clone(),
            timeout: config.timeout(),
            queue_capacity: config.queue_capacity,
            base_path,
            backoff: BackoffGate::new(config.name.clone(), config.backoff_threshold),
            write_lock: Mutex::new(()),
        })
    }

    fn document(&self, job: &RecordJob) -> serde_json::Value {
        let millis = job
            .timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut doc = serde_json::Map::new();
        doc.insert("@timestamp".to_string(), millis.into());
        doc.insert("token".to_string(), job.token.id().to_string().into());
        doc.insert("type".to_string(), job.type_name.clone().into());
        for tv in &job.values {
            let value = match &tv.value {
                MetricValue::Int(i) => serde_json::Value::from(*i),
                MetricValue::Float(f) => serde_json::Value::from(*f),
                MetricValue::Bool(b) => serde_json::Value::from(*b),
                MetricValue::Text(s) => serde_json::Value::from(s.clone()),
            };
            doc.insert(tv.key.clone(), value);
        }
        serde_json::Value::Object(doc)
    }

    async fn append(&self, job: &RecordJob) -> std::io::Result<()> {
        let path = self.base_path.join(format!("{}.ndjson", job.index));
        let mut line = serde_json::to_vec(&self.document(job))?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
        file.write_all(&line).await?;
        Ok(())
    }
}

#[async_trait]
impl Recorder for FileRecorder {
    async fn ping(&self) -> Result<(), ContractError> {
        fs::metadata(&self.base_path)
            .await
            .map_err(|e| ContractError::ping(&self.name, e.to_string()))?;
        Ok(())
    }

    async fn record(&self, job: RecordJob) -> Result<(), ContractError> {
        self.backoff.check()?;

        if let Err(e) = self.append(&job).await {
            self.backoff.strike();
            return Err(ContractError::record(&self.name, e.to_string()));
        }

        self.backoff.reset();
        debug!(recorder = %self.name, token = %job.token, index = %job.index, "document appended");
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

fn base_path_from_params(params: &HashMap<String, String>) -> PathBuf {
    params
        .get("base_path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./output"))
}
