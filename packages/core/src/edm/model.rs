//! EDM model and navigation sources
//!
//! Read-only schema container the writer queries while validating a
//! payload: type lookup, property lookup through base types, navigation
//! target resolution, assignability, and key property enumeration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{EdmProperty, EdmStructuredType, EdmTypeRef, PropertyKind};

/// Kind of a navigation source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationSourceKind {
    EntitySet,
    Singleton,
    ContainedEntitySet,
}

/// Binding from a navigation property path to a target navigation source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationBinding {
    /// Navigation property path relative to the source's entity type
    pub path: String,
    /// Target navigation source name
    pub target: String,
}

/// An entity set, singleton, or contained entity set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationSource {
    pub name: String,
    /// Qualified entity type name of the source's elements
    pub entity_type: String,
    pub kind: NavigationSourceKind,
    pub navigation_bindings: Vec<NavigationBinding>,
    pub derived_type_constraints: Vec<String>,
}

impl NavigationSource {
    #[must_use]
    pub fn entity_set(name: &str, entity_type: &str) -> Self {
        Self {
            name: name.to_owned(),
            entity_type: entity_type.to_owned(),
            kind: NavigationSourceKind::EntitySet,
            navigation_bindings: Vec::new(),
            derived_type_constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn singleton(name: &str, entity_type: &str) -> Self {
        Self {
            kind: NavigationSourceKind::Singleton,
            ..Self::entity_set(name, entity_type)
        }
    }

    #[must_use]
    pub fn with_binding(mut self, path: &str, target: &str) -> Self {
        self.navigation_bindings.push(NavigationBinding {
            path: path.to_owned(),
            target: target.to_owned(),
        });
        self
    }

    #[must_use]
    pub fn with_derived_constraints<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derived_type_constraints = names.into_iter().map(Into::into).collect();
        self
    }
}

/// The schema the writer validates against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdmModel {
    container: String,
    types: HashMap<String, EdmStructuredType>,
    sources: HashMap<String, NavigationSource>,
}

impl EdmModel {
    #[must_use]
    pub fn new(container: &str) -> Self {
        Self {
            container: container.to_owned(),
            types: HashMap::new(),
            sources: HashMap::new(),
        }
    }

    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    #[must_use]
    pub fn with_type(mut self, declaration: EdmStructuredType) -> Self {
        self.types.insert(declaration.name.clone(), declaration);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: NavigationSource) -> Self {
        self.sources.insert(source.name.clone(), source);
        self
    }

    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&EdmStructuredType> {
        self.types.get(name)
    }

    #[must_use]
    pub fn navigation_source(&self, name: &str) -> Option<&NavigationSource> {
        self.sources.get(name)
    }

    /// Entity type of a navigation source's elements.
    #[must_use]
    pub fn element_type_of(&self, source_name: &str) -> Option<&EdmStructuredType> {
        let source = self.sources.get(source_name)?;
        self.types.get(&source.entity_type)
    }

    /// Property lookup walking the base-type chain.
    #[must_use]
    pub fn find_property<'a>(&'a self, type_name: &str, property: &str) -> Option<&'a EdmProperty> {
        let mut current = self.types.get(type_name);
        while let Some(declaration) = current {
            if let Some(found) = declaration.declared_property(property) {
                return Some(found);
            }
            current = declaration.base_type.as_deref().and_then(|b| self.types.get(b));
        }
        None
    }

    /// Element type name of `Collection(X)`; `None` for non-collection names.
    #[must_use]
    pub fn collection_element_type(&self, type_name: &str) -> Option<String> {
        match EdmTypeRef::parse(type_name) {
            EdmTypeRef::Collection(inner) => Some(inner.qualified_name()),
            _ => None,
        }
    }

    /// Key property names of an entity type, walking the base-type chain.
    #[must_use]
    pub fn key_properties(&self, entity_type: &str) -> Vec<String> {
        let mut current = self.types.get(entity_type);
        while let Some(declaration) = current {
            if !declaration.key.is_empty() {
                return declaration.key.clone();
            }
            current = declaration.base_type.as_deref().and_then(|b| self.types.get(b));
        }
        Vec::new()
    }

    /// True when `candidate` is `base` or derives from it.
    ///
    /// Untyped accepts anything; unknown candidates are not assignable.
    #[must_use]
    pub fn is_assignable(&self, candidate: &str, base: &str) -> bool {
        if base == super::types::UNTYPED || candidate == base {
            return true;
        }
        let mut current = self.types.get(candidate);
        while let Some(declaration) = current {
            match declaration.base_type.as_deref() {
                Some(parent) if parent == base => return true,
                Some(parent) => current = self.types.get(parent),
                None => return false,
            }
        }
        false
    }

    /// Resolve the target navigation source of a navigation property.
    ///
    /// The binding path is matched exactly first, then by the navigation
    /// property name alone (the common single-segment binding).
    #[must_use]
    pub fn resolve_navigation_target(
        &self,
        source: &NavigationSource,
        navigation: &str,
        binding_path: &str,
    ) -> Option<&NavigationSource> {
        let binding = source
            .navigation_bindings
            .iter()
            .find(|b| b.path == binding_path)
            .or_else(|| {
                source
                    .navigation_bindings
                    .iter()
                    .find(|b| b.path == navigation)
            })?;
        self.sources.get(&binding.target)
    }

    /// True when the named property is complex-typed (directly or as a
    /// collection of complex values).
    #[must_use]
    pub fn is_complex_property(&self, type_name: &str, property: &str) -> bool {
        let Some(found) = self.find_property(type_name, property) else {
            return false;
        };
        if found.kind != PropertyKind::Structural {
            return false;
        }
        found
            .property_type
            .structured_name()
            .and_then(|n| self.types.get(n))
            .is_some_and(|t| !t.is_entity)
    }
}
