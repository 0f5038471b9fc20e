//! Layered error definitions
//!
//! Categorized by source: config / endpoint I/O / transform / backoff

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Endpoint Errors =====
    /// Pre-flight availability probe failed
    #[error("ping failed for '{endpoint}': {message}")]
    Ping { endpoint: String, message: String },

    /// Read call against a source endpoint failed
    #[error("reader '{reader}' read error: {message}")]
    Read { reader: String, message: String },

    /// Record call against a destination endpoint failed
    #[error("recorder '{recorder}' record error: {message}")]
    Record { recorder: String, message: String },

    /// Endpoint retired after repeated connection failures
    ///
    /// Not a transient error: the engine permanently removes the endpoint.
    #[error("endpoint '{endpoint}' exceeded backoff threshold after {strikes} strikes")]
    BackoffExceeded { endpoint: String, strikes: u32 },

    // ===== Transform Errors =====
    /// Payload could not be turned into typed values
    #[error("payload transform error for reader '{reader}': {message}")]
    Transform { reader: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create ping error
    pub fn ping(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ping {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create read error
    pub fn read(reader: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            reader: reader.into(),
            message: message.into(),
        }
    }

    /// Create record error
    pub fn record(recorder: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Record {
            recorder: recorder.into(),
            message: message.into(),
        }
    }

    /// Create transform error
    pub fn transform(reader: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            reader: reader.into(),
            message: message.into(),
        }
    }

    /// Create backoff retirement signal
    pub fn backoff_exceeded(endpoint: impl Into<String>, strikes: u32) -> Self {
        Self::BackoffExceeded {
            endpoint: endpoint.into(),
            strikes,
        }
    }

    /// Whether this error is the permanent retirement signal
    pub fn is_backoff_exceeded(&self) -> bool {
        matches!(self, Self::BackoffExceeded { .. })
    }
}
