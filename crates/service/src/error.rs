//! Service error types

use engine::EngineError;
use thiserror::Error;

/// Service bootstrap errors
///
/// Only surfaced when not a single engine could be constructed; individual
/// edge failures are logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The adjacency was empty
    #[error("no engines could be constructed")]
    NoEngines,

    /// An edge referenced a reader absent from the catalog
    #[error("reader '{0}' not in reader catalog")]
    UnknownReader(String),

    /// Recorder resolution left an edge with zero recorders
    #[error("no recorders could be resolved for reader '{0}'")]
    NoRecorders(String),

    /// Engine construction failed
    #[error(transparent)]
    Engine(#[from] EngineError),
}
