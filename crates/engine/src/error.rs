//! Engine error types

use thiserror::Error;

/// Engine construction errors
///
/// Operational errors never surface here: once running, the engine logs and
/// continues. Construction is the only fallible boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Builder was given no reader
    #[error("engine requires a reader")]
    NoReader,

    /// Builder was given no recorders
    #[error("engine requires at least one recorder")]
    NoRecorder,

    /// Builder was given no mapper
    #[error("engine requires a mapper")]
    NoMapper,

    /// Builder was given no cancellation token
    #[error("engine requires a cancellation token")]
    NoCancel,

    /// Pre-flight availability probes failed
    ///
    /// Carries every endpoint that failed its probe. Raised when the reader
    /// probe fails, or when every recorder probe fails; partial recorder
    /// failure degrades the live set instead.
    #[error("pre-flight ping failed for: {}", .endpoints.join(", "))]
    Ping { endpoints: Vec<String> },
}
