//! Writer scopes
//!
//! One `Scope` per nesting level, carrying the state, the payload item the
//! scope was opened for, resolved schema bindings, the mirrored path, and
//! per-kind bookkeeping in `ScopeData`.

use std::any::Any;

use crate::edm::EdmTypeRef;
use crate::payload::{PayloadItem, SerializationInfo};
use crate::uri::ODataUri;
use crate::validation::{DuplicatePropertyNameChecker, ResourceSetValidator};

use super::state::WriterState;

/// Back-end-owned state attached to a scope via the scope-factory hooks
pub type ScopeExtension = Box<dyn Any + Send>;

/// Cached type context a resource scope exposes to the back-end
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    pub navigation_source: Option<String>,
    pub navigation_source_entity_type: Option<String>,
    pub expected_resource_type: Option<String>,
}

/// Per-kind scope bookkeeping
#[derive(Debug, Default)]
pub enum ScopeData {
    #[default]
    None,
    Resource(ResourceScopeData),
    ResourceSet(ResourceSetScopeData),
    NestedInfo(NestedInfoScopeData),
    Property(PropertyScopeData),
}

/// Extra state on Resource and DeletedResource scopes
///
/// The duplicate checker doubles as the annotation tracker: every member
/// name written on the resource, property or link, registers here once.
#[derive(Debug)]
pub struct ResourceScopeData {
    pub serialization_info: Option<SerializationInfo>,
    /// Declared type at the enclosing scope; may differ from the concrete type
    pub resource_type_from_metadata: Option<String>,
    pub duplicates: DuplicatePropertyNameChecker,
    pub type_context: Option<TypeContext>,
}

impl ResourceScopeData {
    #[must_use]
    pub fn new(
        serialization_info: Option<SerializationInfo>,
        resource_type_from_metadata: Option<String>,
    ) -> Self {
        Self {
            serialization_info,
            resource_type_from_metadata,
            duplicates: DuplicatePropertyNameChecker::new(),
            type_context: None,
        }
    }
}

/// Extra state on ResourceSet and DeltaResourceSet scopes
#[derive(Debug)]
pub struct ResourceSetScopeData {
    pub resource_count: u64,
    pub validator: ResourceSetValidator,
}

impl ResourceSetScopeData {
    #[must_use]
    pub fn new(declared_element_type: Option<String>) -> Self {
        Self {
            resource_count: 0,
            validator: ResourceSetValidator::new(declared_element_type),
        }
    }
}

/// Extra state on nested resource info scopes
#[derive(Debug)]
pub struct NestedInfoScopeData {
    /// Index of the owning resource scope in the stack; used when the
    /// scope is cloned into its with-content form
    pub parent_index: usize,
    /// Children written since promotion; bounds non-collection links
    pub content_count: u32,
}

/// Extra state on property scopes
#[derive(Debug, Default)]
pub struct PropertyScopeData {
    pub value_written: bool,
}

/// One entry on the writer's nesting stack
#[derive(Debug)]
pub struct Scope {
    pub state: WriterState,
    pub item: Option<PayloadItem>,
    /// Bound navigation source name, when known
    pub navigation_source: Option<String>,
    /// Declared type of items at this level
    pub item_type: Option<EdmTypeRef>,
    /// Concrete structured type, when resolved
    pub resource_type: Option<String>,
    pub uri: ODataUri,
    /// Validated but not emitted (projected away)
    pub skip_writing: bool,
    pub enable_delta: bool,
    /// Permitted sub-type names at this position; `None` is unconstrained
    pub derived_type_constraints: Option<Vec<String>>,
    pub data: ScopeData,
    pub extension: Option<ScopeExtension>,
}

impl Scope {
    #[must_use]
    pub fn new(state: WriterState, uri: ODataUri) -> Self {
        Self {
            state,
            item: None,
            navigation_source: None,
            item_type: None,
            resource_type: None,
            uri,
            skip_writing: false,
            enable_delta: false,
            derived_type_constraints: None,
            data: ScopeData::None,
            extension: None,
        }
    }

    /// True when the declared item type at this level is untyped.
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        self.item_type.as_ref().is_some_and(EdmTypeRef::is_untyped)
    }

    pub fn resource_data_mut(&mut self) -> Option<&mut ResourceScopeData> {
        match &mut self.data {
            ScopeData::Resource(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn set_data(&self) -> Option<&ResourceSetScopeData> {
        match &self.data {
            ScopeData::ResourceSet(data) => Some(data),
            _ => None,
        }
    }

    pub fn set_data_mut(&mut self) -> Option<&mut ResourceSetScopeData> {
        match &mut self.data {
            ScopeData::ResourceSet(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn nested_data(&self) -> Option<&NestedInfoScopeData> {
        match &self.data {
            ScopeData::NestedInfo(data) => Some(data),
            _ => None,
        }
    }

    pub fn nested_data_mut(&mut self) -> Option<&mut NestedInfoScopeData> {
        match &mut self.data {
            ScopeData::NestedInfo(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn property_data(&self) -> Option<&PropertyScopeData> {
        match &self.data {
            ScopeData::Property(data) => Some(data),
            _ => None,
        }
    }

    pub fn property_data_mut(&mut self) -> Option<&mut PropertyScopeData> {
        match &mut self.data {
            ScopeData::Property(data) => Some(data),
            _ => None,
        }
    }

    /// The nested link item, for scopes opened by one.
    #[must_use]
    pub fn nested_link(&self) -> Option<&crate::payload::NestedResourceInfo> {
        match &self.item {
            Some(PayloadItem::NestedResourceInfo(link)) => Some(link),
            _ => None,
        }
    }
}
