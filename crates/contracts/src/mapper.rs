//! Mapper trait - payload flattening abstraction
//!
//! Turns raw endpoint payload bytes into typed, flattened key/value records.
//! Concrete mappers live outside the core; the engine only consumes this trait.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// A single flattened metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// One flattened key/value record produced by a mapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    pub key: String,
    pub value: MetricValue,
}

impl TypedValue {
    pub fn new(key: impl Into<String>, value: MetricValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Payload transformation trait
///
/// A mapper instance belongs to exactly one engine; share a prototype across
/// engines by cloning it through `boxed_clone` before concurrent use.
pub trait Mapper: Send + Sync {
    /// Flatten raw payload bytes into typed values, prefixing every key
    ///
    /// # Errors
    /// Returns a transform error when the payload is malformed.
    fn values(&self, prefix: &str, payload: &[u8]) -> Result<Vec<TypedValue>, ContractError>;

    /// Clone into a fresh boxed instance
    fn boxed_clone(&self) -> Box<dyn Mapper>;
}

impl Clone for Box<dyn Mapper> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}
