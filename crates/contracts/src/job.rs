//! RecordJob - the unit of work delivered to one recorder

use std::time::SystemTime;

use crate::{CorrelationToken, TypedValue};

/// One typed payload addressed to one destination
///
/// Built per-recorder at fan-out time; destination fields are copied from the
/// engine's current configuration and never mutated after dispatch.
#[derive(Debug, Clone)]
pub struct RecordJob {
    /// Token of the read this job descends from
    pub token: CorrelationToken,
    /// Flattened, typed key/value records
    pub values: Vec<TypedValue>,
    /// Destination index (document-store table) name
    pub index: String,
    /// Destination document type name
    pub type_name: String,
    /// Timestamp of the originating read
    pub timestamp: SystemTime,
}
