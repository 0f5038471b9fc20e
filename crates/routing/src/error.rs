//! Routing error types

use thiserror::Error;

/// Route table compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// A route declared an empty readers or recorders section
    #[error("route '{route}': {section} section is empty")]
    EmptySection { route: String, section: String },

    /// A scalar entry that looks like a comma-joined list
    #[error("route '{route}': '{name}' in {section} is a comma-joined scalar; declare a list instead")]
    CommaJoined {
        route: String,
        section: String,
        name: String,
    },

    /// A route references a name absent from the declared catalogs
    #[error("'{name}' not in {section}")]
    NotSpecified { name: String, section: String },
}

impl RoutingError {
    /// Create an empty-section error
    pub fn empty_section(route: impl Into<String>, section: impl Into<String>) -> Self {
        Self::EmptySection {
            route: route.into(),
            section: section.into(),
        }
    }

    /// Create a not-specified cross-reference error
    pub fn not_specified(name: impl Into<String>, section: impl Into<String>) -> Self {
        Self::NotSpecified {
            name: name.into(),
            section: section.into(),
        }
    }
}
