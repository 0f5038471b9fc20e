//! # Routing
//!
//! Route table compilation module.
//!
//! Responsibilities:
//! - Compile the declarative many-to-many route table into a deduplicated
//!   reader -> recorder-set adjacency
//! - Reject structurally invalid routes (empty sections, comma-joined scalars)
//! - Cross-check every referenced name against the declared catalogs

mod compiler;
mod error;

pub use compiler::{compile, cross_check, ReaderRecorderAdjacency};
pub use error::RoutingError;
