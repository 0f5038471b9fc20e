//! RelayBlueprint - Config Loader output
//!
//! Describes the complete relay configuration: source endpoints, destination
//! endpoints, and the many-to-many route table connecting them.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Complete relay configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayBlueprint {
    /// Source endpoint definitions
    pub readers: Vec<ReaderConfig>,

    /// Destination endpoint definitions
    pub recorders: Vec<RecorderConfig>,

    /// Named routes connecting reader names to recorder names
    pub routes: BTreeMap<String, RouteConfig>,
}

/// Source endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Unique identifier, referenced by routes
    pub name: String,

    /// Endpoint URL (e.g., "http://localhost:8080/debug/vars")
    pub url: String,

    /// Polling interval in seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,

    /// Per-read timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Consecutive connection failures tolerated before retirement
    #[serde(default = "default_backoff_threshold")]
    pub backoff_threshold: u32,
}

impl ReaderConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }
}

/// Destination endpoint kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderKind {
    /// Log job summaries via tracing
    #[default]
    Log,
    /// Append NDJSON documents under a base directory
    File,
}

/// Destination endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Unique identifier, referenced by routes
    pub name: String,

    /// Destination kind
    #[serde(default)]
    pub kind: RecorderKind,

    /// Destination index (document-store table) name
    pub index: String,

    /// Destination document type name
    #[serde(default = "default_type_name")]
    pub type_name: String,

    /// Per-record timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Consecutive connection failures tolerated before retirement
    #[serde(default = "default_backoff_threshold")]
    pub backoff_threshold: u32,

    /// Capacity of this recorder's private fan-out queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Kind-specific parameters (e.g., "base_path" for file recorders)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl RecorderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }
}

/// One named route: a reader-name set wired to a recorder-name set
///
/// Both sections accept a scalar where a one-element list is meant; a
/// comma-joined scalar is rejected by validation, never split implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(deserialize_with = "string_or_list")]
    pub readers: Vec<String>,

    #[serde(deserialize_with = "string_or_list")]
    pub recorders: Vec<String>,
}

fn default_interval_secs() -> f64 {
    1.0
}

fn default_timeout_secs() -> f64 {
    5.0
}

fn default_backoff_threshold() -> u32 {
    5
}

fn default_queue_capacity() -> usize {
    64
}

fn default_type_name() -> String {
    "metrics".to_string()
}

/// Accept either a bare string or a list of strings
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => vec![s],
        StringOrList::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_scalar_becomes_list() {
        let route: RouteConfig = toml::from_str(
            r#"
readers = "red1"
recorders = ["rec1", "rec2"]
"#,
        )
        .unwrap();
        assert_eq!(route.readers, vec!["red1"]);
        assert_eq!(route.recorders, vec!["rec1", "rec2"]);
    }

    #[test]
    fn test_comma_joined_scalar_is_not_split() {
        // Splitting is the routing compiler's job to reject, not serde's to guess.
        let route: RouteConfig = toml::from_str(
            r#"
readers = "red1,red2"
recorders = ["rec1"]
"#,
        )
        .unwrap();
        assert_eq!(route.readers, vec!["red1,red2"]);
    }

    #[test]
    fn test_reader_defaults() {
        let reader: ReaderConfig = serde_json::from_str(
            r#"{"name": "app", "url": "http://localhost:1234/debug/vars"}"#,
        )
        .unwrap();
        assert_eq!(reader.interval(), Duration::from_secs(1));
        assert_eq!(reader.timeout(), Duration::from_secs(5));
        assert_eq!(reader.backoff_threshold, 5);
    }

    #[test]
    fn test_recorder_defaults() {
        let recorder: RecorderConfig =
            serde_json::from_str(r#"{"name": "es", "index": "metrics"}"#).unwrap();
        assert_eq!(recorder.kind, RecorderKind::Log);
        assert_eq!(recorder.type_name, "metrics");
        assert_eq!(recorder.queue_capacity, 64);
    }
}
