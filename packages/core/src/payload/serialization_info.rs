//! Serialization hints
//!
//! Callers writing without full model context can attach serialization
//! info to a resource or set. The type resolver consults these hints
//! before falling back to the enclosing scope or the model; hint
//! resolution failures are ignored for compatibility with older callers.

use serde::{Deserialize, Serialize};

use crate::edm::NavigationSourceKind;

/// Caller-supplied hints about the origin of a payload item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerializationInfo {
    /// Navigation source path, e.g. `Customers` or `Customers(1)/Orders`
    pub navigation_source_name: Option<String>,
    pub navigation_source_entity_type_name: Option<String>,
    /// Expected concrete type of the item
    pub expected_type_name: Option<String>,
    pub navigation_source_kind: Option<NavigationSourceKind>,
}

impl SerializationInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_navigation_source(name: &str) -> Self {
        Self {
            navigation_source_name: Some(name.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_entity_type(mut self, name: &str) -> Self {
        self.navigation_source_entity_type_name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_expected_type(mut self, name: &str) -> Self {
        self.expected_type_name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NavigationSourceKind) -> Self {
        self.navigation_source_kind = Some(kind);
        self
    }
}
