//! Writer driver
//!
//! `ODataWriter` is the public entry point. Every operation follows the
//! same shape: affinity and disposal checks, lazy payload start, pending
//! nested-link promotion, transition validation, scope push, then the
//! back-end hook. Validation and scope manipulation are synchronous; only
//! hooks differ between the sync and async families.
//!
//! All failures funnel through `fail_on_error`, which moves the writer to
//! the error state before the error reaches the caller.

mod async_api;
mod sync_api;

use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use crate::edm::{EdmModel, EdmTypeRef, NavigationSourceKind};
use crate::error::{constructors, WriteError, WriteResult};
use crate::payload::{
    DeletedResource, DeltaLink, DeltaResourceSet, NestedResourceInfo, PayloadItem, PropertyInfo,
    Resource, ResourceProperty, ResourceSet,
};
use crate::uri::{ODataPath, ODataUri, PathSegment, SelectedProperties};
use crate::validation::validate_delta_identity;

use super::hooks::{AsyncFormatBackend, FormatBackend, WriteContext};
use super::listener::WriterObserver;
use super::scope::{
    NestedInfoScopeData, ResourceScopeData, ResourceSetScopeData, PropertyScopeData, Scope,
    ScopeData,
};
use super::settings::WriterSettings;
use super::stack::ScopeStack;
use super::state::WriterState;
use super::transitions::{validate_transition, TransitionContext, WriterIntent};
use super::typing::{self, ResolutionInput};

/// What the writer produces at the top level
#[derive(Debug, Clone)]
pub struct WriterDescriptor {
    pub intent: WriterIntent,
    /// Root navigation source, when writing from one
    pub navigation_source: Option<String>,
    /// Expected type of the top-level item(s); overrides the source's
    /// element type
    pub expected_type: Option<String>,
    /// Client-requested projection
    pub selected: SelectedProperties,
}

impl WriterDescriptor {
    #[must_use]
    pub fn resource_set(navigation_source: Option<&str>) -> Self {
        Self {
            intent: WriterIntent::ResourceSet,
            navigation_source: navigation_source.map(str::to_owned),
            expected_type: None,
            selected: SelectedProperties::entire(),
        }
    }

    #[must_use]
    pub fn resource(navigation_source: Option<&str>) -> Self {
        Self {
            intent: WriterIntent::Resource,
            ..Self::resource_set(navigation_source)
        }
    }

    #[must_use]
    pub fn delta_resource_set(navigation_source: Option<&str>) -> Self {
        Self {
            intent: WriterIntent::DeltaResourceSet,
            ..Self::resource_set(navigation_source)
        }
    }

    #[must_use]
    pub fn with_expected_type(mut self, name: &str) -> Self {
        self.expected_type = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_selected(mut self, selected: SelectedProperties) -> Self {
        self.selected = selected;
        self
    }
}

pub(crate) enum BackendHandle {
    Sync(Box<dyn FormatBackend>),
    Async(Box<dyn AsyncFormatBackend>),
}

/// Push-based, schema-validating payload writer
///
/// A writer instance is exclusive to one caller; it is not thread-safe.
pub struct ODataWriter {
    model: Arc<EdmModel>,
    settings: WriterSettings,
    intent: WriterIntent,
    backend: BackendHandle,
    stack: ScopeStack,
    observer: Option<Box<dyn WriterObserver>>,
    payload_started: bool,
    disposed: bool,
    /// Resource/deleted-resource scopes currently on the stack
    resource_depth: usize,
}

impl ODataWriter {
    /// Create a writer bound to a synchronous back-end.
    #[must_use]
    pub fn new(
        model: Arc<EdmModel>,
        settings: WriterSettings,
        descriptor: WriterDescriptor,
        backend: Box<dyn FormatBackend>,
    ) -> Self {
        Self::with_backend(model, settings, descriptor, BackendHandle::Sync(backend))
    }

    /// Create a writer bound to an asynchronous back-end.
    #[must_use]
    pub fn new_async(
        model: Arc<EdmModel>,
        settings: WriterSettings,
        descriptor: WriterDescriptor,
        backend: Box<dyn AsyncFormatBackend>,
    ) -> Self {
        Self::with_backend(model, settings, descriptor, BackendHandle::Async(backend))
    }

    fn with_backend(
        model: Arc<EdmModel>,
        settings: WriterSettings,
        descriptor: WriterDescriptor,
        backend: BackendHandle,
    ) -> Self {
        let root = Self::root_scope(&model, &descriptor);
        Self {
            model,
            settings,
            intent: descriptor.intent,
            backend,
            stack: ScopeStack::new(root),
            observer: None,
            payload_started: false,
            disposed: false,
            resource_depth: 0,
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn WriterObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Mark the writer unusable; every later call fails.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// State of the current (innermost) scope.
    #[must_use]
    pub fn current_state(&self) -> WriterState {
        self.stack.current().state
    }

    /// Path mirroring the current scope chain.
    #[must_use]
    pub fn current_path(&self) -> &ODataPath {
        &self.stack.current().uri.path
    }

    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Resources written so far into the nearest enclosing set scope.
    ///
    /// Reaches up to two levels: the set itself, a resource inside it, or
    /// a property inside such a resource.
    #[must_use]
    pub fn resources_in_current_set(&self) -> Option<u64> {
        self.stack
            .current()
            .set_data()
            .or_else(|| self.stack.parent().and_then(Scope::set_data))
            .or_else(|| self.stack.grandparent().and_then(Scope::set_data))
            .map(|data| data.resource_count)
    }

    fn root_scope(model: &EdmModel, descriptor: &WriterDescriptor) -> Scope {
        let path = descriptor
            .navigation_source
            .as_deref()
            .map(|name| match model.navigation_source(name).map(|s| s.kind) {
                Some(NavigationSourceKind::Singleton) => {
                    ODataPath::from_root(PathSegment::Singleton(name.to_owned()))
                }
                _ => ODataPath::from_root(PathSegment::EntitySet(name.to_owned())),
            })
            .unwrap_or_default();

        let element = descriptor.expected_type.clone().or_else(|| {
            descriptor
                .navigation_source
                .as_deref()
                .and_then(|name| model.navigation_source(name))
                .map(|s| s.entity_type.clone())
        });
        let item_type = element.map(|name| {
            let parsed = EdmTypeRef::parse(&name);
            match descriptor.intent {
                WriterIntent::Resource => parsed,
                // Set writers expect a collection of the element type.
                _ if parsed.is_collection() => parsed,
                _ => EdmTypeRef::Collection(Box::new(parsed)),
            }
        });

        let mut root = Scope::new(
            WriterState::Start,
            ODataUri::new(path, descriptor.selected.clone()),
        );
        root.navigation_source = descriptor.navigation_source.clone();
        root.item_type = item_type;
        root.derived_type_constraints = descriptor
            .navigation_source
            .as_deref()
            .and_then(|name| model.navigation_source(name))
            .filter(|s| !s.derived_type_constraints.is_empty())
            .map(|s| s.derived_type_constraints.clone());
        root
    }

    // ---- error funnel -------------------------------------------------

    /// Move to the error state (first failure only) and pass the error on.
    pub(crate) fn fail_on_error<T>(&mut self, result: WriteResult<T>) -> WriteResult<T> {
        if let Err(err) = &result {
            self.enter_error_state(err);
        }
        result
    }

    fn enter_error_state(&mut self, err: &WriteError) {
        // A second error transition is a no-op so teardown paths can run.
        if self.stack.current().state == WriterState::Error {
            return;
        }
        error!(error = %err, "payload writer entered the error state");
        self.stack
            .push(Scope::new(WriterState::Error, ODataUri::default()));
        if let Some(observer) = &mut self.observer {
            observer.on_exception(err);
        }
    }

    // ---- preconditions ------------------------------------------------

    pub(crate) fn expect_sync(&self) -> WriteResult<()> {
        match self.backend {
            BackendHandle::Sync(_) => Ok(()),
            BackendHandle::Async(_) => Err(constructors::sync_call_on_async_writer()),
        }
    }

    pub(crate) fn expect_async(&self) -> WriteResult<()> {
        match self.backend {
            BackendHandle::Async(_) => Ok(()),
            BackendHandle::Sync(_) => Err(constructors::async_call_on_sync_writer()),
        }
    }

    pub(crate) fn check_not_disposed(&self) -> WriteResult<()> {
        if self.disposed {
            Err(constructors::writer_disposed())
        } else {
            Ok(())
        }
    }

    pub(crate) fn needs_payload_start(&self) -> bool {
        !self.payload_started && self.stack.current().state == WriterState::Start
    }

    pub(crate) fn mark_payload_started(&mut self) {
        self.payload_started = true;
    }

    // ---- transition plumbing -----------------------------------------

    fn transition_context(&self) -> TransitionContext<'_> {
        TransitionContext {
            from: self.stack.current(),
            intent: self.intent,
            version: self.settings.version,
            is_request: self.settings.is_request,
            stack_depth: self.stack.depth(),
        }
    }

    pub(crate) fn validate_move(&self, to: WriterState) -> WriteResult<()> {
        validate_transition(&self.transition_context(), to)
    }

    /// Enforce the single-child rule on the enclosing expanded link and
    /// count the new child.
    fn register_nested_content(&mut self) -> WriteResult<()> {
        if self.stack.current().state != WriterState::NestedResourceInfoWithContent {
            return Ok(());
        }
        let scope = self.stack.current_mut();
        let (name, is_collection) = match scope.nested_link() {
            Some(link) => (link.name.clone(), link.is_collection == Some(true)),
            None => return Err(constructors::internal("expanded link scope without link")),
        };
        let Some(data) = scope.nested_data_mut() else {
            return Err(constructors::internal("expanded link scope without data"));
        };
        if !is_collection && data.content_count >= 1 {
            return Err(
                constructors::multiple_items_in_non_collection_nested_resource_info(&name),
            );
        }
        data.content_count += 1;
        Ok(())
    }

    // ---- nested-link promotion ---------------------------------------

    /// Refine and re-tag a pending nested link when content arrives.
    ///
    /// Returns `true` when promotion happened; the caller must then invoke
    /// the with-content hook (sync or async).
    pub(crate) fn prepare_promotion(&mut self) -> WriteResult<bool> {
        if self.stack.current().state != WriterState::NestedResourceInfo {
            return Ok(false);
        }
        self.validate_move(WriterState::NestedResourceInfoWithContent)?;

        let parent_index = match self.stack.current().nested_data() {
            Some(data) => data.parent_index,
            None => return Err(constructors::internal("nested info scope without data")),
        };
        let link = match self.stack.current().nested_link() {
            Some(link) => link.clone(),
            None => return Err(constructors::internal("nested info scope without link")),
        };
        let owner = match self.stack.get(parent_index) {
            Some(scope) => scope,
            None => return Err(constructors::internal("nested info parent out of range")),
        };
        let resolved = typing::resolve_nested_link(&self.model, owner, &link)?;

        if !resolved.is_complex {
            if let Some(owner_data) = self
                .stack
                .get_mut(parent_index)
                .and_then(Scope::resource_data_mut)
            {
                owner_data.duplicates.validate(&link.name)?;
            }
        }

        let is_collection = resolved.is_collection;
        let scope = self.stack.current_mut();
        scope.state = WriterState::NestedResourceInfoWithContent;
        scope.item_type = resolved.item_type;
        scope.navigation_source = resolved.navigation_source;
        scope.derived_type_constraints = resolved.derived_type_constraints;
        scope.uri.path = resolved.path;
        if let Some(PayloadItem::NestedResourceInfo(item)) = &mut scope.item {
            item.is_collection = Some(is_collection);
        }
        Ok(true)
    }

    // ---- scope entry (validate + push, no hooks) ---------------------

    pub(crate) fn enter_resource_set(&mut self, set: ResourceSet) -> WriteResult<()> {
        self.validate_move(WriterState::ResourceSet)?;
        self.validate_set_metadata(
            set.count,
            set.next_page_link.is_some(),
            set.delta_link.is_some(),
        )?;
        self.register_nested_content()?;

        let parent = self.stack.current();
        let mut item_type = parent.item_type.clone();
        if item_type.as_ref().map_or(true, EdmTypeRef::is_untyped) {
            if let Some(declared) = &set.type_name {
                item_type = Some(EdmTypeRef::parse(declared));
            }
        }
        let declared_element = item_type
            .as_ref()
            .and_then(|t| t.element())
            .and_then(|t| t.structured_name())
            .map(str::to_owned);

        let mut scope = Scope::new(WriterState::ResourceSet, parent.uri.clone());
        scope.navigation_source = parent.navigation_source.clone();
        scope.item_type = item_type;
        scope.skip_writing = parent.skip_writing;
        scope.enable_delta = parent.enable_delta;
        scope.derived_type_constraints = parent.derived_type_constraints.clone();
        scope.data = ScopeData::ResourceSet(ResourceSetScopeData::new(declared_element));
        scope.extension = self.create_set_extension(&set);
        scope.item = Some(PayloadItem::ResourceSet(set));
        self.stack.push(scope);
        Ok(())
    }

    pub(crate) fn enter_delta_resource_set(&mut self, set: DeltaResourceSet) -> WriteResult<()> {
        self.validate_move(WriterState::DeltaResourceSet)?;
        self.validate_set_metadata(
            set.count,
            set.next_page_link.is_some(),
            set.delta_link.is_some(),
        )?;
        self.register_nested_content()?;

        let parent = self.stack.current();
        let item_type = parent.item_type.clone();
        let declared_element = item_type
            .as_ref()
            .and_then(|t| t.element())
            .and_then(|t| t.structured_name())
            .map(str::to_owned);

        let mut scope = Scope::new(WriterState::DeltaResourceSet, parent.uri.clone());
        scope.navigation_source = parent.navigation_source.clone();
        scope.item_type = item_type;
        scope.skip_writing = parent.skip_writing;
        scope.enable_delta = true;
        scope.derived_type_constraints = parent.derived_type_constraints.clone();
        scope.data = ScopeData::ResourceSet(ResourceSetScopeData::new(declared_element));
        scope.extension = self.create_delta_set_extension(&set);
        scope.item = Some(PayloadItem::DeltaResourceSet(set));
        self.stack.push(scope);
        Ok(())
    }

    fn validate_set_metadata(
        &self,
        count: Option<i64>,
        has_next_link: bool,
        has_delta_link: bool,
    ) -> WriteResult<()> {
        if self.settings.is_request {
            if count.is_some() {
                return Err(constructors::count_in_request());
            }
            if has_next_link {
                return Err(constructors::next_link_in_request());
            }
            if has_delta_link {
                return Err(constructors::delta_link_in_request());
            }
        } else if has_delta_link && self.stack.current().state != WriterState::Start {
            return Err(constructors::delta_link_on_expanded_set());
        }
        Ok(())
    }

    pub(crate) fn enter_resource(&mut self, mut resource: Resource) -> WriteResult<()> {
        self.prepare_item_for_write(&mut resource)?;
        self.validate_move(WriterState::Resource)?;
        if self.resource_depth + 1 > self.settings.max_nesting_depth {
            return Err(constructors::max_nesting_depth_exceeded(
                self.settings.max_nesting_depth,
            ));
        }
        self.register_nested_content()?;

        if resource.is_null {
            return self.push_null_resource(resource);
        }

        let parent = self.stack.current();
        let resolved = typing::resolve_resource(
            &self.model,
            parent,
            ResolutionInput {
                type_name: resource.type_name.as_deref(),
                serialization_info: resource.serialization_info.as_ref(),
                properties: &resource.properties,
            },
        )?;
        self.validate_set_element(resolved.resource_type.as_deref())?;
        self.validate_delta_entry(
            resolved.resource_type.as_deref(),
            resource.id.as_ref(),
            &resource.properties,
        )?;

        let parent = self.stack.current();
        let mut scope = Scope::new(
            WriterState::Resource,
            ODataUri::new(resolved.path, parent.uri.selected.clone()),
        );
        scope.navigation_source = resolved.navigation_source;
        scope.item_type = resolved
            .resource_type
            .as_deref()
            .map(|name| EdmTypeRef::Structured(name.to_owned()));
        scope.resource_type = resolved.resource_type;
        scope.skip_writing = parent.skip_writing;
        scope.enable_delta = parent.enable_delta;
        let mut data = ResourceScopeData::new(
            resource.serialization_info.clone(),
            resolved.resource_type_from_metadata,
        );
        data.type_context = Some(resolved.type_context);
        scope.data = ScopeData::Resource(data);
        scope.extension = self.create_resource_extension(&resource);
        scope.item = Some(PayloadItem::Resource(resource));
        self.stack.push(scope);
        self.resource_depth += 1;
        self.bump_parent_set_count();
        Ok(())
    }

    fn push_null_resource(&mut self, resource: Resource) -> WriteResult<()> {
        let parent = self.stack.current();
        // Null is only meaningful as the single value of a non-collection
        // link.
        if parent.state == WriterState::NestedResourceInfoWithContent
            && parent.nested_link().and_then(|l| l.is_collection) == Some(true)
        {
            return Err(constructors::invalid_state_transition(
                parent.state,
                WriterState::Resource,
            ));
        }
        let mut scope = Scope::new(WriterState::Resource, parent.uri.clone());
        scope.skip_writing = parent.skip_writing;
        scope.enable_delta = parent.enable_delta;
        scope.data = ScopeData::Resource(ResourceScopeData::new(None, None));
        scope.extension = self.create_resource_extension(&resource);
        scope.item = Some(PayloadItem::Resource(resource));
        self.stack.push(scope);
        self.resource_depth += 1;
        Ok(())
    }

    pub(crate) fn enter_deleted_resource(&mut self, mut resource: DeletedResource) -> WriteResult<()> {
        self.prepare_deleted_for_write(&mut resource)?;
        self.validate_move(WriterState::DeletedResource)?;
        if self.resource_depth + 1 > self.settings.max_nesting_depth {
            return Err(constructors::max_nesting_depth_exceeded(
                self.settings.max_nesting_depth,
            ));
        }
        self.register_nested_content()?;

        let parent = self.stack.current();
        let resolved = typing::resolve_resource(
            &self.model,
            parent,
            ResolutionInput {
                type_name: resource.type_name.as_deref(),
                serialization_info: resource.serialization_info.as_ref(),
                properties: &resource.properties,
            },
        )?;
        self.validate_set_element(resolved.resource_type.as_deref())?;
        self.validate_delta_entry(
            resolved.resource_type.as_deref(),
            resource.id.as_ref(),
            &resource.properties,
        )?;

        let parent = self.stack.current();
        let mut scope = Scope::new(
            WriterState::DeletedResource,
            ODataUri::new(resolved.path, parent.uri.selected.clone()),
        );
        scope.navigation_source = resolved.navigation_source;
        scope.item_type = resolved
            .resource_type
            .as_deref()
            .map(|name| EdmTypeRef::Structured(name.to_owned()));
        scope.resource_type = resolved.resource_type;
        scope.skip_writing = parent.skip_writing;
        scope.enable_delta = parent.enable_delta;
        let mut data = ResourceScopeData::new(
            resource.serialization_info.clone(),
            resolved.resource_type_from_metadata,
        );
        data.type_context = Some(resolved.type_context);
        scope.data = ScopeData::Resource(data);
        scope.extension = self.create_deleted_extension(&resource);
        scope.item = Some(PayloadItem::DeletedResource(resource));
        self.stack.push(scope);
        self.resource_depth += 1;
        self.bump_parent_set_count();
        Ok(())
    }

    /// Resources directly under a top-level delta set must be addressable.
    fn validate_delta_entry(
        &self,
        entity_type: Option<&str>,
        id: Option<&url::Url>,
        properties: &[ResourceProperty],
    ) -> WriteResult<()> {
        let parent = self.stack.current();
        let applies = parent.enable_delta
            && parent.state == WriterState::DeltaResourceSet
            && self.stack.is_top_level();
        if !applies {
            return Ok(());
        }
        validate_delta_identity(&self.model, entity_type, id, properties)
    }

    fn validate_set_element(&mut self, concrete: Option<&str>) -> WriteResult<()> {
        let Some(concrete) = concrete else {
            return Ok(());
        };
        let model = Arc::clone(&self.model);
        let scope = self.stack.current_mut();
        if let Some(data) = scope.set_data_mut() {
            data.validator.validate_resource_type(&model, concrete)?;
        }
        Ok(())
    }

    fn bump_parent_set_count(&mut self) {
        if let Some(parent) = self.stack.parent_mut() {
            if let Some(data) = parent.set_data_mut() {
                data.resource_count += 1;
            }
        }
    }

    pub(crate) fn enter_nested_resource_info(
        &mut self,
        link: NestedResourceInfo,
    ) -> WriteResult<()> {
        self.validate_move(WriterState::NestedResourceInfo)?;

        let parent_index = self.stack.current_index();
        let parent = self.stack.current();
        let (selected, is_selected) = parent.uri.selected.descend(&link.name);

        let mut scope = Scope::new(
            WriterState::NestedResourceInfo,
            ODataUri::new(parent.uri.path.clone(), selected),
        );
        scope.navigation_source = parent.navigation_source.clone();
        scope.skip_writing = parent.skip_writing || !is_selected;
        scope.enable_delta = parent.enable_delta;
        scope.data = ScopeData::NestedInfo(NestedInfoScopeData {
            parent_index,
            content_count: 0,
        });
        scope.extension = self.create_nested_extension(&link);
        scope.item = Some(PayloadItem::NestedResourceInfo(link));
        self.stack.push(scope);
        Ok(())
    }

    pub(crate) fn enter_property(&mut self, property: PropertyInfo) -> WriteResult<()> {
        self.validate_move(WriterState::Property)?;

        // Register against the owning resource before pushing.
        if let Some(data) = self.stack.current_mut().resource_data_mut() {
            data.duplicates.validate(&property.name)?;
        }

        let parent = self.stack.current();
        let (selected, is_selected) = parent.uri.selected.descend(&property.name);
        let mut scope = Scope::new(
            WriterState::Property,
            ODataUri::new(parent.uri.path.clone(), selected),
        );
        scope.navigation_source = parent.navigation_source.clone();
        scope.skip_writing = parent.skip_writing || !is_selected;
        scope.enable_delta = parent.enable_delta;
        scope.data = ScopeData::Property(PropertyScopeData::default());
        scope.extension = self.create_property_extension(&property);
        scope.item = Some(PayloadItem::Property(property));
        self.stack.push(scope);
        Ok(())
    }

    /// Validate a primitive write and push its transient scope.
    pub(crate) fn enter_primitive(&mut self, value: Value) -> WriteResult<()> {
        self.validate_move(WriterState::Primitive)?;
        self.register_nested_content()?;
        if let Some(data) = self.stack.current_mut().property_data_mut() {
            data.value_written = true;
        }
        let parent = self.stack.current();
        let mut scope = Scope::new(WriterState::Primitive, parent.uri.clone());
        scope.skip_writing = parent.skip_writing;
        scope.item = Some(PayloadItem::Primitive(value));
        self.stack.push(scope);
        Ok(())
    }

    pub(crate) fn enter_delta_link(&mut self, link: DeltaLink, deleted: bool) -> WriteResult<()> {
        let state = if deleted {
            WriterState::DeltaDeletedLink
        } else {
            WriterState::DeltaLink
        };
        self.validate_move(state)?;
        let parent = self.stack.current();
        let mut scope = Scope::new(state, parent.uri.clone());
        scope.skip_writing = parent.skip_writing;
        scope.enable_delta = true;
        scope.extension = self.create_delta_link_extension(&link);
        scope.item = Some(if deleted {
            PayloadItem::DeltaDeletedLink(link)
        } else {
            PayloadItem::DeltaLink(link)
        });
        self.stack.push(scope);
        Ok(())
    }

    /// Validate an entity reference link write against the current scope.
    pub(crate) fn validate_entity_reference(&self) -> WriteResult<()> {
        let state = self.stack.current().state;
        if state != WriterState::NestedResourceInfo
            && state != WriterState::NestedResourceInfoWithContent
        {
            return Err(constructors::entity_reference_link_without_nested_link());
        }
        if !self.settings.is_request {
            return Err(constructors::entity_reference_link_in_response());
        }
        Ok(())
    }

    pub(crate) fn register_entity_reference(&mut self) -> WriteResult<()> {
        self.register_nested_content()
    }

    // ---- leaving scopes ----------------------------------------------

    /// Decide what `end` must do in the current state.
    pub(crate) fn classify_end(&self) -> WriteResult<EndAction> {
        let scope = self.stack.current();
        match scope.state {
            WriterState::ResourceSet => Ok(EndAction::ResourceSet),
            WriterState::DeltaResourceSet => Ok(EndAction::DeltaResourceSet),
            WriterState::Resource => Ok(EndAction::Resource),
            WriterState::DeletedResource => Ok(EndAction::DeletedResource),
            WriterState::Property => Ok(EndAction::Property),
            WriterState::NestedResourceInfoWithContent => Ok(EndAction::NestedWithContent),
            WriterState::NestedResourceInfo => {
                if self.settings.is_request {
                    let name = scope.nested_link().map(|l| l.name.as_str()).unwrap_or("");
                    Err(constructors::deferred_link_in_request(name))
                } else {
                    Ok(EndAction::DeferredNested)
                }
            }
            WriterState::Stream | WriterState::TextValue => {
                Err(constructors::stream_not_disposed())
            }
            WriterState::Error => Err(constructors::invalid_transition_from_error()),
            WriterState::Start | WriterState::Completed => {
                Err(constructors::write_end_in_invalid_state(scope.state))
            }
            WriterState::Primitive | WriterState::DeltaLink | WriterState::DeltaDeletedLink => {
                Err(constructors::write_end_in_invalid_state(scope.state))
            }
        }
    }

    /// Pop the finished scope; `true` when the payload just drained.
    pub(crate) fn leave_scope(&mut self) -> bool {
        if let Some(popped) = self.stack.pop() {
            if matches!(
                popped.state,
                WriterState::Resource | WriterState::DeletedResource
            ) {
                self.resource_depth = self.resource_depth.saturating_sub(1);
            }
        }
        self.stack.depth() == 1
    }

    /// Swap the drained root for the completed scope.
    pub(crate) fn replace_root_completed(&mut self) {
        self.stack
            .replace_root(Scope::new(WriterState::Completed, ODataUri::default()));
    }

    pub(crate) fn notify_completed(&mut self) {
        if let Some(observer) = &mut self.observer {
            observer.on_completed();
        }
    }

    /// Validate and push the scope for a binary or text sub-writer.
    pub(crate) fn enter_stream_scope(&mut self, state: WriterState) -> WriteResult<()> {
        self.validate_move(state)?;
        if let Some(data) = self.stack.current_mut().property_data_mut() {
            data.value_written = true;
        }
        let parent = self.stack.current();
        let mut scope = Scope::new(state, parent.uri.clone());
        scope.skip_writing = parent.skip_writing;
        self.stack.push(scope);
        Ok(())
    }

    pub(crate) fn pop_transient_scope(&mut self) {
        self.stack.pop();
    }

    // ---- scope factory dispatch --------------------------------------

    fn create_resource_extension(
        &mut self,
        resource: &Resource,
    ) -> Option<super::scope::ScopeExtension> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.create_resource_scope(resource),
            BackendHandle::Async(b) => b.create_resource_scope(resource),
        }
    }

    fn create_deleted_extension(
        &mut self,
        resource: &DeletedResource,
    ) -> Option<super::scope::ScopeExtension> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.create_deleted_resource_scope(resource),
            BackendHandle::Async(b) => b.create_deleted_resource_scope(resource),
        }
    }

    fn create_set_extension(&mut self, set: &ResourceSet) -> Option<super::scope::ScopeExtension> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.create_resource_set_scope(set),
            BackendHandle::Async(b) => b.create_resource_set_scope(set),
        }
    }

    fn create_delta_set_extension(
        &mut self,
        set: &DeltaResourceSet,
    ) -> Option<super::scope::ScopeExtension> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.create_delta_resource_set_scope(set),
            BackendHandle::Async(b) => b.create_delta_resource_set_scope(set),
        }
    }

    fn create_property_extension(
        &mut self,
        property: &PropertyInfo,
    ) -> Option<super::scope::ScopeExtension> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.create_property_info_scope(property),
            BackendHandle::Async(b) => b.create_property_info_scope(property),
        }
    }

    fn create_delta_link_extension(
        &mut self,
        link: &DeltaLink,
    ) -> Option<super::scope::ScopeExtension> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.create_delta_link_scope(link),
            BackendHandle::Async(b) => b.create_delta_link_scope(link),
        }
    }

    fn create_nested_extension(
        &mut self,
        link: &NestedResourceInfo,
    ) -> Option<super::scope::ScopeExtension> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.create_nested_resource_info_scope(link),
            BackendHandle::Async(b) => b.create_nested_resource_info_scope(link),
        }
    }

    fn prepare_item_for_write(&mut self, resource: &mut Resource) -> WriteResult<()> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.prepare_resource_for_write_start(resource),
            BackendHandle::Async(b) => b.prepare_resource_for_write_start(resource),
        }
    }

    fn prepare_deleted_for_write(&mut self, resource: &mut DeletedResource) -> WriteResult<()> {
        match &mut self.backend {
            BackendHandle::Sync(b) => b.prepare_deleted_resource_for_write_start(resource),
            BackendHandle::Async(b) => b.prepare_deleted_resource_for_write_start(resource),
        }
    }

    // ---- hook argument assembly --------------------------------------

    /// Whether the current scope's hooks should be skipped (projected away).
    pub(crate) fn current_skips_writing(&self) -> bool {
        self.stack.current().skip_writing
    }
}

/// What `end` has to do once validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndAction {
    ResourceSet,
    DeltaResourceSet,
    Resource,
    DeletedResource,
    Property,
    NestedWithContent,
    DeferredNested,
}

/// Split a scope into a hook context plus the item reference.
pub(crate) fn split_scope<'a>(
    scope: &'a mut Scope,
    is_top_level: bool,
) -> (WriteContext<'a>, Option<&'a PayloadItem>) {
    let Scope {
        state,
        item,
        navigation_source,
        resource_type,
        uri,
        data,
        extension,
        ..
    } = scope;
    let (metadata_type, type_context) = match data {
        ScopeData::Resource(d) => (
            d.resource_type_from_metadata.as_deref(),
            d.type_context.as_ref(),
        ),
        _ => (None, None),
    };
    let ctx = WriteContext {
        state: *state,
        is_top_level,
        navigation_source: navigation_source.as_deref(),
        resource_type: resource_type.as_deref(),
        resource_type_from_metadata: metadata_type,
        type_context,
        path: &uri.path,
        extension,
    };
    (ctx, item.as_ref())
}

