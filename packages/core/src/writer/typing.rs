//! Schema-directed resolution
//!
//! On each scope push the driver binds the new scope to a type, a
//! navigation source, and a path position. Resolution order: explicit
//! type name on the item (fatal when unknown to the model), serialization
//! hints (silently ignored when they do not resolve), then the enclosing
//! scope.

use serde_json::Value;
use tracing::debug;

use crate::edm::{EdmModel, EdmTypeRef, NavigationSourceKind, PropertyKind};
use crate::error::{constructors, WriteResult};
use crate::payload::{NestedResourceInfo, ResourceProperty, SerializationInfo};
use crate::uri::{self, ODataPath, PathSegment};

use super::scope::{Scope, TypeContext};
use super::state::WriterState;

/// The pieces of a resource (or deleted resource) resolution looks at
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolutionInput<'a> {
    pub type_name: Option<&'a str>,
    pub serialization_info: Option<&'a SerializationInfo>,
    pub properties: &'a [ResourceProperty],
}

/// Outcome of resolving a resource against its enclosing scope
#[derive(Debug)]
pub(crate) struct ResolvedResource {
    pub navigation_source: Option<String>,
    /// Concrete structured type name
    pub resource_type: Option<String>,
    /// Declared type at the enclosing scope
    pub resource_type_from_metadata: Option<String>,
    pub type_context: TypeContext,
    pub path: ODataPath,
}

/// Resolve type, navigation source, and path for a resource push.
pub(crate) fn resolve_resource(
    model: &EdmModel,
    parent: &Scope,
    input: ResolutionInput<'_>,
) -> WriteResult<ResolvedResource> {
    let metadata_type = parent
        .item_type
        .as_ref()
        .and_then(|t| t.structured_name())
        .map(str::to_owned);

    let hint_type = hint_expected_type(model, input.serialization_info);

    let concrete = match input.type_name {
        Some(explicit) => {
            if model.find_type(explicit).is_none() {
                return Err(constructors::type_name_not_found(explicit));
            }
            Some(explicit.to_owned())
        }
        None => hint_type.or_else(|| metadata_type.clone()),
    };

    if let (Some(actual), Some(declared)) = (&concrete, &metadata_type) {
        if !model.is_assignable(actual, declared) {
            return Err(constructors::incompatible_resource_types(actual, declared));
        }
        if actual != declared {
            if let Some(allowed) = &parent.derived_type_constraints {
                if !allowed.iter().any(|name| name == actual) {
                    let position = parent
                        .navigation_source
                        .as_deref()
                        .unwrap_or(declared.as_str());
                    return Err(constructors::derived_type_constraint_violated(
                        actual, position,
                    ));
                }
            }
        }
    }

    let hint_source = hint_navigation_source(model, input.serialization_info);
    let navigation_source = hint_source
        .clone()
        .or_else(|| parent.navigation_source.clone());

    let mut path = parent.uri.path.clone();
    if let Some(name) = &hint_source {
        // A hint naming its own navigation source re-roots the path.
        path.reset_to(root_segment(model, name));
    }
    append_key_segment(model, &mut path, parent, concrete.as_deref(), input.properties);
    if let (Some(actual), Some(declared)) = (&concrete, &metadata_type) {
        if actual != declared {
            path.push(PathSegment::TypeCast(actual.clone()));
        }
    }

    let type_context = TypeContext {
        navigation_source: navigation_source.clone(),
        navigation_source_entity_type: navigation_source
            .as_deref()
            .and_then(|name| model.navigation_source(name))
            .map(|s| s.entity_type.clone()),
        expected_resource_type: metadata_type.clone().or_else(|| concrete.clone()),
    };

    Ok(ResolvedResource {
        navigation_source,
        resource_type: concrete,
        resource_type_from_metadata: metadata_type,
        type_context,
        path,
    })
}

fn root_segment(model: &EdmModel, source_name: &str) -> PathSegment {
    match model.navigation_source(source_name).map(|s| s.kind) {
        Some(NavigationSourceKind::Singleton) => PathSegment::Singleton(source_name.to_owned()),
        _ => PathSegment::EntitySet(source_name.to_owned()),
    }
}

/// Append `(key)` when the enclosing level addresses the resource out of a
/// collection (a set scope, a collection link, or the payload root), the
/// resolved type is an entity type with keys, and the resource carries
/// every key value.
fn append_key_segment(
    model: &EdmModel,
    path: &mut ODataPath,
    parent: &Scope,
    concrete: Option<&str>,
    properties: &[ResourceProperty],
) {
    if path.is_empty() {
        return;
    }
    let keyed_position = parent.state == WriterState::Start
        || parent.item_type.as_ref().is_some_and(EdmTypeRef::is_collection);
    if !keyed_position {
        return;
    }
    let Some(type_name) = concrete else { return };
    if !model.find_type(type_name).is_some_and(|t| t.is_entity) {
        return;
    }
    let keys = model.key_properties(type_name);
    if keys.is_empty() {
        return;
    }
    let mut parts: Vec<(String, Value)> = Vec::with_capacity(keys.len());
    for key in &keys {
        let value = properties
            .iter()
            .find(|p| p.name == *key)
            .map(|p| &p.value);
        match value {
            Some(value) if *value != Value::Null => parts.push((key.clone(), value.clone())),
            _ => return,
        }
    }
    path.push(PathSegment::Key(parts));
}

fn hint_expected_type(model: &EdmModel, info: Option<&SerializationInfo>) -> Option<String> {
    let name = info?.expected_type_name.as_deref()?;
    let parsed = EdmTypeRef::parse(name);
    let single = parsed.single_level();
    match single.structured_name() {
        Some(structured) if model.find_type(structured).is_some() => {
            Some(structured.to_owned())
        }
        _ => {
            debug!(type_name = name, "ignoring unresolvable expected type hint");
            None
        }
    }
}

fn hint_navigation_source(model: &EdmModel, info: Option<&SerializationInfo>) -> Option<String> {
    let raw = info?.navigation_source_name.as_deref()?;
    match uri::parse_navigation_source(raw) {
        Ok(name) => {
            if model.navigation_source(&name).is_some() {
                Some(name)
            } else {
                debug!(source = raw, "ignoring unknown navigation source hint");
                None
            }
        }
        Err(parse_error) => {
            // Compatibility: malformed hint paths are dropped, not fatal.
            debug!(source = raw, error = %parse_error, "ignoring unparsable navigation source hint");
            None
        }
    }
}

/// What a nested link resolved to on promotion
#[derive(Debug)]
pub(crate) struct ResolvedLink {
    pub item_type: Option<EdmTypeRef>,
    pub navigation_source: Option<String>,
    pub derived_type_constraints: Option<Vec<String>>,
    pub is_collection: bool,
    /// Complex-typed links skip owner-level duplicate checking
    pub is_complex: bool,
    pub path: ODataPath,
}

/// Resolve a nested link's declared property against the owning resource.
pub(crate) fn resolve_nested_link(
    model: &EdmModel,
    owner: &Scope,
    link: &NestedResourceInfo,
) -> WriteResult<ResolvedLink> {
    let owner_type = owner.resource_type.as_deref();
    let declared = owner_type.and_then(|t| model.find_property(t, &link.name));

    let mut path = owner.uri.path.clone();

    let Some(property) = declared else {
        // Dynamic or unknown property: carried untyped.
        path.push(PathSegment::Property(link.name.clone()));
        return Ok(ResolvedLink {
            item_type: Some(if link.is_collection == Some(true) {
                EdmTypeRef::Collection(Box::new(EdmTypeRef::Untyped))
            } else {
                EdmTypeRef::Untyped
            }),
            navigation_source: None,
            derived_type_constraints: None,
            is_collection: link.is_collection == Some(true),
            is_complex: false,
            path,
        });
    };

    let is_collection = link.is_collection.unwrap_or_else(|| property.is_collection());

    match property.kind {
        PropertyKind::Navigation => {
            if property.contains_target && path.is_empty() {
                return Err(constructors::containment_without_path(&link.name));
            }
            let target = owner
                .navigation_source
                .as_deref()
                .and_then(|name| model.navigation_source(name))
                .and_then(|source| {
                    model.resolve_navigation_target(source, &link.name, &link.name)
                });
            path.push(PathSegment::Navigation(link.name.clone()));

            let mut constraints = property.derived_type_constraints.clone();
            if let Some(target_source) = target {
                if constraints.is_empty() {
                    constraints = target_source.derived_type_constraints.clone();
                } else if !target_source.derived_type_constraints.is_empty() {
                    constraints.retain(|name| {
                        target_source.derived_type_constraints.contains(name)
                    });
                }
            }

            Ok(ResolvedLink {
                item_type: Some(property.property_type.clone()),
                navigation_source: target.map(|s| s.name.clone()),
                derived_type_constraints: if constraints.is_empty() {
                    None
                } else {
                    Some(constraints)
                },
                is_collection,
                is_complex: false,
                path,
            })
        }
        PropertyKind::Structural => {
            path.push(PathSegment::Property(link.name.clone()));
            let is_complex = owner_type
                .is_some_and(|t| model.is_complex_property(t, &link.name));
            Ok(ResolvedLink {
                item_type: Some(property.property_type.clone()),
                navigation_source: owner.navigation_source.clone(),
                derived_type_constraints: if property.derived_type_constraints.is_empty() {
                    None
                } else {
                    Some(property.derived_type_constraints.clone())
                },
                is_collection,
                is_complex,
                path,
            })
        }
    }
}
