//! # Endpoints
//!
//! Concrete collaborators behind the contract traits.
//!
//! Responsibilities:
//! - `ExpvarReader`: HTTP polling of expvar-style JSON endpoints
//! - `LogRecorder` / `FileRecorder`: debug and NDJSON-archive destinations
//! - `FlattenMapper`: nested JSON to dot-joined typed values
//! - `BackoffGate`: strike counting behind the HTTP reader and file recorder
//! - `MockReader` / `MockRecorder`: scriptable doubles for tests

mod backoff;
mod mapper;
pub mod mock;
mod readers;
mod recorders;

pub use backoff::BackoffGate;
pub use mapper::FlattenMapper;
pub use mock::{MockReader, MockRecorder};
pub use readers::ExpvarReader;
pub use recorders::{FileRecorder, LogRecorder};
