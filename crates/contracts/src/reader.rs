//! Reader trait - source endpoint abstraction
//!
//! Defines a unified interface for polled metric sources, decoupling the
//! engine from concrete transports (HTTP expvar, mocks, replays).

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{ContractError, CorrelationToken};

/// The result of one successful read against a source endpoint
///
/// Immutable once produced. The fan-out stage hands each recorder worker its
/// own copy; `Bytes` shares the backing storage immutably, so no consumer can
/// observe another's work.
#[derive(Debug, Clone)]
pub struct ReadResult {
    /// The token minted for this read
    pub token: CorrelationToken,
    /// Name of the reader that produced the payload
    pub reader: String,
    /// Raw payload bytes as returned by the endpoint
    pub payload: Bytes,
    /// When the read was issued
    pub issued_at: SystemTime,
}

/// Source endpoint trait
///
/// Implementations own their backoff bookkeeping: after repeated
/// connection-class failures exceed the configured threshold, `read` must
/// return [`ContractError::BackoffExceeded`] instead of attempting I/O.
#[async_trait]
pub trait Reader: Send + Sync {
    /// Pre-flight availability probe
    async fn ping(&self) -> Result<(), ContractError>;

    /// Perform one read, tagged with the given token
    async fn read(&self, token: CorrelationToken) -> Result<ReadResult, ContractError>;

    /// Reader name (used for logging/metrics and routing)
    fn name(&self) -> &str;

    /// Polling interval
    fn interval(&self) -> Duration;

    /// Per-read timeout (the engine adds a fixed safety margin on top)
    fn timeout(&self) -> Duration;
}
