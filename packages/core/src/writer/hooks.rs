//! Format back-end hook surface
//!
//! The engine produces no bytes. Every write call, once validated, lands in
//! one of these hooks; a format back-end (such as the JSON one) renders the
//! item. Hooks come in a synchronous and an asynchronous trait; a writer is
//! bound to exactly one of the two at construction.
//!
//! The scope-factory hooks let a back-end attach its own state to the
//! engine's scopes; the engine hands it back through `WriteContext` on
//! every later hook for the same scope.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::WriteResult;
use crate::payload::{
    DeletedResource, DeltaLink, DeltaResourceSet, EntityReferenceLink, NestedResourceInfo,
    PropertyInfo, Resource, ResourceSet,
};
use crate::uri::ODataPath;

use super::scope::{ScopeExtension, TypeContext};
use super::state::WriterState;

/// What the engine exposes to a hook about the current scope
pub struct WriteContext<'a> {
    pub state: WriterState,
    pub is_top_level: bool,
    pub navigation_source: Option<&'a str>,
    /// Concrete resolved type of the current item
    pub resource_type: Option<&'a str>,
    /// Declared type at the enclosing scope
    pub resource_type_from_metadata: Option<&'a str>,
    pub type_context: Option<&'a TypeContext>,
    pub path: &'a ODataPath,
    /// Back-end state attached by the scope-factory hooks
    pub extension: &'a mut Option<ScopeExtension>,
}

impl std::fmt::Debug for WriteContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteContext")
            .field("state", &self.state)
            .field("is_top_level", &self.is_top_level)
            .field("navigation_source", &self.navigation_source)
            .field("resource_type", &self.resource_type)
            .finish_non_exhaustive()
    }
}

/// Synchronous format back-end
pub trait FormatBackend: Send {
    fn start_payload(&mut self) -> WriteResult<()>;
    fn end_payload(&mut self) -> WriteResult<()>;

    fn start_resource(&mut self, ctx: WriteContext<'_>, resource: &Resource) -> WriteResult<()>;
    fn end_resource(&mut self, ctx: WriteContext<'_>, resource: &Resource) -> WriteResult<()>;

    fn start_resource_set(&mut self, ctx: WriteContext<'_>, set: &ResourceSet) -> WriteResult<()>;
    fn end_resource_set(&mut self, ctx: WriteContext<'_>, set: &ResourceSet) -> WriteResult<()>;

    fn start_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()>;
    fn end_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()>;

    fn start_deleted_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()>;
    fn end_deleted_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()>;

    fn start_property(&mut self, ctx: WriteContext<'_>, property: &PropertyInfo)
        -> WriteResult<()>;
    fn end_property(&mut self, ctx: WriteContext<'_>, property: &PropertyInfo) -> WriteResult<()>;

    fn start_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()>;
    fn end_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()>;

    /// A nested link ended without content (responses only).
    fn write_deferred_nested_resource_info(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()>;

    fn write_entity_reference_in_navigation_link_content(
        &mut self,
        ctx: WriteContext<'_>,
        parent_link: &NestedResourceInfo,
        reference: &EntityReferenceLink,
    ) -> WriteResult<()>;

    fn write_primitive_value(&mut self, ctx: WriteContext<'_>, value: &Value) -> WriteResult<()>;

    /// One hook serves added and deleted link entries; `deleted` is the tag.
    fn write_delta_link(
        &mut self,
        ctx: WriteContext<'_>,
        link: &DeltaLink,
        deleted: bool,
    ) -> WriteResult<()>;

    fn start_binary_stream(&mut self, ctx: WriteContext<'_>) -> WriteResult<()>;
    fn binary_chunk(&mut self, chunk: &[u8]) -> WriteResult<()>;
    fn end_binary_stream(&mut self, ctx: WriteContext<'_>) -> WriteResult<()>;

    fn start_text_writer(&mut self, ctx: WriteContext<'_>) -> WriteResult<()>;
    fn text_chunk(&mut self, chunk: &str) -> WriteResult<()>;
    fn end_text_writer(&mut self, ctx: WriteContext<'_>) -> WriteResult<()>;

    fn flush(&mut self) -> WriteResult<()>;

    // Scope-factory hooks; a back-end may attach per-scope state.

    fn create_resource_scope(&mut self, _resource: &Resource) -> Option<ScopeExtension> {
        None
    }
    fn create_deleted_resource_scope(
        &mut self,
        _resource: &DeletedResource,
    ) -> Option<ScopeExtension> {
        None
    }
    fn create_resource_set_scope(&mut self, _set: &ResourceSet) -> Option<ScopeExtension> {
        None
    }
    fn create_delta_resource_set_scope(
        &mut self,
        _set: &DeltaResourceSet,
    ) -> Option<ScopeExtension> {
        None
    }
    fn create_property_info_scope(&mut self, _property: &PropertyInfo) -> Option<ScopeExtension> {
        None
    }
    fn create_delta_link_scope(&mut self, _link: &DeltaLink) -> Option<ScopeExtension> {
        None
    }
    fn create_nested_resource_info_scope(
        &mut self,
        _link: &NestedResourceInfo,
    ) -> Option<ScopeExtension> {
        None
    }

    /// Last chance to rewrite a resource before its scope is pushed.
    fn prepare_resource_for_write_start(&mut self, _resource: &mut Resource) -> WriteResult<()> {
        Ok(())
    }
    fn prepare_deleted_resource_for_write_start(
        &mut self,
        _resource: &mut DeletedResource,
    ) -> WriteResult<()> {
        Ok(())
    }
}

/// Asynchronous format back-end
///
/// Mirrors [`FormatBackend`] hook for hook; any hook may suspend. The
/// engine completes all validation and scope manipulation before awaiting.
#[async_trait]
pub trait AsyncFormatBackend: Send {
    async fn start_payload(&mut self) -> WriteResult<()>;
    async fn end_payload(&mut self) -> WriteResult<()>;

    async fn start_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &Resource,
    ) -> WriteResult<()>;
    async fn end_resource(&mut self, ctx: WriteContext<'_>, resource: &Resource)
        -> WriteResult<()>;

    async fn start_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &ResourceSet,
    ) -> WriteResult<()>;
    async fn end_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &ResourceSet,
    ) -> WriteResult<()>;

    async fn start_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()>;
    async fn end_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()>;

    async fn start_deleted_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()>;
    async fn end_deleted_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()>;

    async fn start_property(
        &mut self,
        ctx: WriteContext<'_>,
        property: &PropertyInfo,
    ) -> WriteResult<()>;
    async fn end_property(
        &mut self,
        ctx: WriteContext<'_>,
        property: &PropertyInfo,
    ) -> WriteResult<()>;

    async fn start_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()>;
    async fn end_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()>;

    async fn write_deferred_nested_resource_info(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()>;

    async fn write_entity_reference_in_navigation_link_content(
        &mut self,
        ctx: WriteContext<'_>,
        parent_link: &NestedResourceInfo,
        reference: &EntityReferenceLink,
    ) -> WriteResult<()>;

    async fn write_primitive_value(
        &mut self,
        ctx: WriteContext<'_>,
        value: &Value,
    ) -> WriteResult<()>;

    async fn write_delta_link(
        &mut self,
        ctx: WriteContext<'_>,
        link: &DeltaLink,
        deleted: bool,
    ) -> WriteResult<()>;

    async fn start_binary_stream(&mut self, ctx: WriteContext<'_>) -> WriteResult<()>;
    async fn binary_chunk(&mut self, chunk: &[u8]) -> WriteResult<()>;
    async fn end_binary_stream(&mut self, ctx: WriteContext<'_>) -> WriteResult<()>;

    async fn start_text_writer(&mut self, ctx: WriteContext<'_>) -> WriteResult<()>;
    async fn text_chunk(&mut self, chunk: &str) -> WriteResult<()>;
    async fn end_text_writer(&mut self, ctx: WriteContext<'_>) -> WriteResult<()>;

    async fn flush(&mut self) -> WriteResult<()>;

    fn create_resource_scope(&mut self, _resource: &Resource) -> Option<ScopeExtension> {
        None
    }
    fn create_deleted_resource_scope(
        &mut self,
        _resource: &DeletedResource,
    ) -> Option<ScopeExtension> {
        None
    }
    fn create_resource_set_scope(&mut self, _set: &ResourceSet) -> Option<ScopeExtension> {
        None
    }
    fn create_delta_resource_set_scope(
        &mut self,
        _set: &DeltaResourceSet,
    ) -> Option<ScopeExtension> {
        None
    }
    fn create_property_info_scope(&mut self, _property: &PropertyInfo) -> Option<ScopeExtension> {
        None
    }
    fn create_delta_link_scope(&mut self, _link: &DeltaLink) -> Option<ScopeExtension> {
        None
    }
    fn create_nested_resource_info_scope(
        &mut self,
        _link: &NestedResourceInfo,
    ) -> Option<ScopeExtension> {
        None
    }

    fn prepare_resource_for_write_start(&mut self, _resource: &mut Resource) -> WriteResult<()> {
        Ok(())
    }
    fn prepare_deleted_resource_for_write_start(
        &mut self,
        _resource: &mut DeletedResource,
    ) -> WriteResult<()> {
        Ok(())
    }
}
