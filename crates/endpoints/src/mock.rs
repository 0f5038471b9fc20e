//! Scriptable reader/recorder doubles for tests without live endpoints

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;

use contracts::{ContractError, CorrelationToken, ReadResult, Reader, RecordJob, Recorder};

/// Reader double serving a fixed payload
///
/// Scriptable failure modes: ping refusal and retirement after a set number
/// of reads.
pub struct MockReader {
    name: String,
    interval: Duration,
    timeout: Duration,
    payload: Bytes,
    fail_ping: bool,
    retire_after: Option<u32>,
    reads: AtomicU32,
}

impl MockReader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(100),
            payload: Bytes::from_static(br#"{"counter": 1}"#),
            fail_ping: false,
            retire_after: None,
            reads: AtomicU32::new(0),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fail_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }

    /// Return `BackoffExceeded` once this many reads have been served
    pub fn with_retire_after(mut self, reads: u32) -> Self {
        self.retire_after = Some(reads);
        self
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Reader for MockReader {
    async fn ping(&self) -> Result<(), ContractError> {
        if self.fail_ping {
            return Err(ContractError::ping(&self.name, "scripted ping failure"));
        }
        Ok(())
    }

    async fn read(&self, token: CorrelationToken) -> Result<ReadResult, ContractError> {
        let served = self.reads.fetch_add(1, Ordering::Relaxed);
        if let Some(limit) = self.retire_after {
            if served >= limit {
                return Err(ContractError::backoff_exceeded(&self.name, served));
            }
        }

        Ok(ReadResult {
            token,
            reader: self.name.clone(),
            payload: self.payload.clone(),
            issued_at: SystemTime::now(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Recorder double capturing every delivered job
pub struct MockRecorder {
    name: String,
    index: String,
    type_name: String,
    timeout: Duration,
    queue_capacity: usize,
    fail_ping: bool,
    delay: Option<Duration>,
    retire_after: Option<u32>,
    records: AtomicU32,
    jobs: Mutex<Vec<RecordJob>>,
}

impl MockRecorder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: "metrics".to_string(),
            type_name: "metrics".to_string(),
            timeout: Duration::from_millis(100),
            queue_capacity: 64,
            fail_ping: false,
            delay: None,
            retire_after: None,
            records: AtomicU32::new(0),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_fail_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }

    /// Sleep this long inside every `record` call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Return `BackoffExceeded` once this many jobs have been accepted
    pub fn with_retire_after(mut self, records: u32) -> Self {
        self.retire_after = Some(records);
        self
    }

    /// Everything delivered so far
    pub fn jobs(&self) -> Vec<RecordJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Recorder for MockRecorder {
    async fn ping(&self) -> Result<(), ContractError> {
        if self.fail_ping {
            return Err(ContractError::ping(&self.name, "scripted ping failure"));
        }
        Ok(())
    }

    async fn record(&self, job: RecordJob) -> Result<(), ContractError> {
        let accepted = self.records.fetch_add(1, Ordering::Relaxed);
        if let Some(limit) = self.retire_after {
            if accepted >= limit {
                return Err(ContractError::backoff_exceeded(&self.name, accepted));
            }
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.jobs.lock().unwrap().push(job);
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
