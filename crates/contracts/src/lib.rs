//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Pipeline Model
//! - A `Reader` is polled on its configured interval and yields raw payload bytes
//! - A `Mapper` flattens one payload into typed key/value records
//! - A `Recorder` ships one `RecordJob` per destination
//! - A `CorrelationToken` travels with every read end-to-end for tracing

mod blueprint;
mod error;
mod job;
mod mapper;
mod reader;
mod recorder;
mod token;

pub use blueprint::*;
pub use error::*;
pub use job::RecordJob;
pub use mapper::{Mapper, MetricValue, TypedValue};
pub use reader::{ReadResult, Reader};
pub use recorder::Recorder;
pub use token::CorrelationToken;
