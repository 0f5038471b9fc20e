//! # Engine
//!
//! Per-reader orchestration module.
//!
//! Responsibilities:
//! - Drive one `Reader` on its configured interval
//! - Fan every successful result out to all live recorders concurrently
//! - Isolate slow recorders behind private bounded queues
//! - Retire endpoints that exceed their backoff threshold
//! - Terminate cleanly on cancellation

pub mod engine;
pub mod error;
pub mod handle;
pub mod metrics;

pub use contracts::{Mapper, Reader, RecordJob, Recorder};
pub use engine::{Engine, EngineBuilder, DEADLINE_MARGIN};
pub use error::EngineError;
pub use handle::{FanoutJob, RecorderHandle};
pub use metrics::{MetricsSnapshot, RecorderMetrics};
