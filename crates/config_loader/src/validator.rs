//! Configuration validation
//!
//! Rules:
//! - reader/recorder names unique and non-empty
//! - urls and indices non-empty
//! - intervals, timeouts and queue capacities positive
//! - route table compiles and only references declared names
//!
//! Structural route checks run before cross-reference checks; within the
//! cross-reference pass, readers are checked before recorders. The first
//! error encountered wins.

use std::collections::HashSet;

use contracts::{ContractError, RelayBlueprint};

/// Validate a parsed blueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    validate_readers(blueprint)?;
    validate_recorders(blueprint)?;
    validate_routes(blueprint)?;
    Ok(())
}

fn validate_readers(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for reader in &blueprint.readers {
        if reader.name.is_empty() {
            return Err(ContractError::config_validation(
                "readers[].name",
                "reader name cannot be empty",
            ));
        }
        if !seen.insert(&reader.name) {
            return Err(ContractError::config_validation(
                format!("readers[name={}]", reader.name),
                "duplicate reader name",
            ));
        }
        if reader.url.is_empty() {
            return Err(ContractError::config_validation(
                format!("readers[{}].url", reader.name),
                "url cannot be empty",
            ));
        }
        if reader.interval_secs <= 0.0 {
            return Err(ContractError::config_validation(
                format!("readers[{}].interval_secs", reader.name),
                format!("interval_secs must be > 0, got {}", reader.interval_secs),
            ));
        }
        if reader.timeout_secs <= 0.0 {
            return Err(ContractError::config_validation(
                format!("readers[{}].timeout_secs", reader.name),
                format!("timeout_secs must be > 0, got {}", reader.timeout_secs),
            ));
        }
    }
    Ok(())
}

fn validate_recorders(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for recorder in &blueprint.recorders {
        if recorder.name.is_empty() {
            return Err(ContractError::config_validation(
                "recorders[].name",
                "recorder name cannot be empty",
            ));
        }
        if !seen.insert(&recorder.name) {
            return Err(ContractError::config_validation(
                format!("recorders[name={}]", recorder.name),
                "duplicate recorder name",
            ));
        }
        if recorder.index.is_empty() {
            return Err(ContractError::config_validation(
                format!("recorders[{}].index", recorder.name),
                "index cannot be empty",
            ));
        }
        if recorder.timeout_secs <= 0.0 {
            return Err(ContractError::config_validation(
                format!("recorders[{}].timeout_secs", recorder.name),
                format!("timeout_secs must be > 0, got {}", recorder.timeout_secs),
            ));
        }
        if recorder.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("recorders[{}].queue_capacity", recorder.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

fn validate_routes(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let adjacency = routing::compile(&blueprint.routes)
        .map_err(|e| ContractError::config_validation("routes", e.to_string()))?;

    routing::cross_check(
        &adjacency,
        blueprint.readers.iter().map(|r| r.name.as_str()),
        blueprint.recorders.iter().map(|r| r.name.as_str()),
    )
    .map_err(|e| ContractError::config_validation("routes", e.to_string()))
}
