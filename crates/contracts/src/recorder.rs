//! Recorder trait - destination endpoint abstraction

use std::time::Duration;

use async_trait::async_trait;

use crate::{ContractError, RecordJob};

/// Destination endpoint trait
///
/// One recorder instance may be shared across several engines (a destination
/// can appear in many routes), so implementations use interior mutability and
/// take `&self`. Backoff bookkeeping mirrors [`crate::Reader`]: past the
/// configured strike threshold, `record` must return
/// [`ContractError::BackoffExceeded`] instead of attempting I/O.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Pre-flight availability probe
    async fn ping(&self) -> Result<(), ContractError>;

    /// Ship one job to the destination
    async fn record(&self, job: RecordJob) -> Result<(), ContractError>;

    /// Recorder name (used for logging/metrics and routing)
    fn name(&self) -> &str;

    /// Destination index (document-store table) name
    fn index_name(&self) -> &str;

    /// Destination document type name
    fn type_name(&self) -> &str;

    /// Per-record timeout (the engine adds a fixed safety margin on top)
    fn timeout(&self) -> Duration;

    /// Capacity of this recorder's private fan-out queue
    fn queue_capacity(&self) -> usize {
        64
    }
}
