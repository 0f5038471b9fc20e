//! # Service
//!
//! Fleet bootstrap module.
//!
//! Responsibilities:
//! - Resolve every adjacency edge against the reader/recorder catalogs
//! - Construct one engine per reader through a pluggable factory
//! - Run the engines concurrently and expose a single completion signal

mod error;
mod factory;
mod service;

pub use error::ServiceError;
pub use factory::{BuiltEngine, DefaultEngineFactory, EngineFactory, EngineRunner};
pub use service::{Service, ServiceHandle};
