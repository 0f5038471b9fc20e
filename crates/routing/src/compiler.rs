//! Route table compiler
//!
//! Compiled once at startup; engine construction iterates the result.
//! Validation precedence: structural checks run per route before any pair is
//! emitted, cross-reference checks run afterwards in a separate pass
//! (readers first, then recorders; first failure wins).

use std::collections::{BTreeMap, BTreeSet};

use contracts::RouteConfig;
use tracing::debug;

use crate::RoutingError;

/// Compiled, deduplicated reader -> recorder-set adjacency
///
/// BTree keys make iteration order deterministic, so compiling the same route
/// table twice yields identical structures.
pub type ReaderRecorderAdjacency = BTreeMap<String, BTreeSet<String>>;

/// Compile a route table into an adjacency
///
/// For every route, every (reader, recorder) pair of its cartesian product is
/// added; a recorder mentioned for the same reader by several routes is fed
/// only once.
///
/// # Errors
/// Structural errors only: an empty section or a comma-joined scalar.
pub fn compile(
    routes: &BTreeMap<String, RouteConfig>,
) -> Result<ReaderRecorderAdjacency, RoutingError> {
    let mut adjacency = ReaderRecorderAdjacency::new();

    for (route_name, route) in routes {
        validate_route(route_name, route)?;

        for reader in &route.readers {
            let recorders = adjacency.entry(reader.clone()).or_default();
            for recorder in &route.recorders {
                recorders.insert(recorder.clone());
            }
        }
    }

    debug!(
        routes = routes.len(),
        readers = adjacency.len(),
        "route table compiled"
    );

    Ok(adjacency)
}

/// Cross-check every name in the adjacency against the declared catalogs
///
/// Runs after compilation as a separate pass. The first missing name found is
/// reported; readers are checked before recorders.
///
/// # Errors
/// [`RoutingError::NotSpecified`] naming the first unresolved reference.
pub fn cross_check<'a>(
    adjacency: &ReaderRecorderAdjacency,
    readers: impl IntoIterator<Item = &'a str>,
    recorders: impl IntoIterator<Item = &'a str>,
) -> Result<(), RoutingError> {
    let reader_catalog: BTreeSet<&str> = readers.into_iter().collect();
    let recorder_catalog: BTreeSet<&str> = recorders.into_iter().collect();

    for reader in adjacency.keys() {
        if !reader_catalog.contains(reader.as_str()) {
            return Err(RoutingError::not_specified(reader, "readers"));
        }
    }

    for recorders in adjacency.values() {
        for recorder in recorders {
            if !recorder_catalog.contains(recorder.as_str()) {
                return Err(RoutingError::not_specified(recorder, "recorders"));
            }
        }
    }

    Ok(())
}

fn validate_route(route_name: &str, route: &RouteConfig) -> Result<(), RoutingError> {
    validate_section(route_name, "readers", &route.readers)?;
    validate_section(route_name, "recorders", &route.recorders)?;
    Ok(())
}

fn validate_section(route_name: &str, section: &str, names: &[String]) -> Result<(), RoutingError> {
    if names.is_empty() {
        return Err(RoutingError::empty_section(route_name, section));
    }
    for name in names {
        if name.contains(',') {
            return Err(RoutingError::CommaJoined {
                route: route_name.to_string(),
                section: section.to_string(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}
