//! JSON format back-ends
//!
//! `JsonFormatBackend` (sync, `io::Write` sink) and
//! `AsyncJsonFormatBackend` (async, `tokio::io::AsyncWrite` sink) both
//! delegate rendering to the shared payload serializer; only `flush`
//! touches the sink.

mod serializer;

use std::io;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use odwire_core::error::{constructors, WriteResult};
use odwire_core::payload::{
    DeletedResource, DeltaLink, DeltaResourceSet, EntityReferenceLink, NestedResourceInfo,
    PropertyInfo, Resource, ResourceSet,
};
use odwire_core::writer::{
    AsyncFormatBackend, FormatBackend, ScopeExtension, WriteContext,
};

use crate::metadata::ContextUrlBuilder;
use serializer::{JsonNestedExt, JsonPayloadSerializer, JsonResourceExt};

/// Configuration for the JSON back-ends
#[derive(Debug, Clone)]
pub struct JsonWriterOptions {
    /// Service root used for `@odata.context`; relative fragments without it
    pub service_root: Option<Url>,
    /// Emit `@odata.context` annotations on top-level payloads
    pub include_context: bool,
}

impl Default for JsonWriterOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonWriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            service_root: None,
            include_context: true,
        }
    }

    #[must_use]
    pub fn with_service_root(mut self, root: Url) -> Self {
        self.service_root = Some(root);
        self
    }

    #[must_use]
    pub fn without_context(mut self) -> Self {
        self.include_context = false;
        self
    }
}

fn serializer_for(options: &JsonWriterOptions) -> JsonPayloadSerializer {
    JsonPayloadSerializer::new(
        ContextUrlBuilder::new(options.service_root.clone()),
        options.include_context,
    )
}

/// Synchronous OData JSON back-end
pub struct JsonFormatBackend {
    core: JsonPayloadSerializer,
    sink: Box<dyn io::Write + Send>,
}

impl JsonFormatBackend {
    #[must_use]
    pub fn new(sink: Box<dyn io::Write + Send>, options: JsonWriterOptions) -> Self {
        Self {
            core: serializer_for(&options),
            sink,
        }
    }
}

impl FormatBackend for JsonFormatBackend {
    fn start_payload(&mut self) -> WriteResult<()> {
        Ok(())
    }

    fn end_payload(&mut self) -> WriteResult<()> {
        Ok(())
    }

    fn start_resource(&mut self, ctx: WriteContext<'_>, resource: &Resource) -> WriteResult<()> {
        self.core.start_resource(ctx, resource)
    }

    fn end_resource(&mut self, ctx: WriteContext<'_>, resource: &Resource) -> WriteResult<()> {
        self.core.end_resource(ctx, resource)
    }

    fn start_resource_set(&mut self, ctx: WriteContext<'_>, set: &ResourceSet) -> WriteResult<()> {
        self.core.start_resource_set(ctx, set)
    }

    fn end_resource_set(&mut self, ctx: WriteContext<'_>, set: &ResourceSet) -> WriteResult<()> {
        self.core.end_resource_set(ctx, set)
    }

    fn start_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.core.start_delta_resource_set(ctx, set)
    }

    fn end_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.core.end_delta_resource_set(ctx, set)
    }

    fn start_deleted_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()> {
        self.core.start_deleted_resource(ctx, resource)
    }

    fn end_deleted_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()> {
        self.core.end_deleted_resource(ctx, resource)
    }

    fn start_property(
        &mut self,
        ctx: WriteContext<'_>,
        property: &PropertyInfo,
    ) -> WriteResult<()> {
        self.core.start_property(ctx, property)
    }

    fn end_property(&mut self, ctx: WriteContext<'_>, property: &PropertyInfo) -> WriteResult<()> {
        self.core.end_property(ctx, property)
    }

    fn start_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.core.start_nested_resource_info_with_content(ctx, link)
    }

    fn end_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.core.end_nested_resource_info_with_content(ctx, link)
    }

    fn write_deferred_nested_resource_info(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.core.write_deferred_nested_resource_info(ctx, link)
    }

    fn write_entity_reference_in_navigation_link_content(
        &mut self,
        ctx: WriteContext<'_>,
        parent_link: &NestedResourceInfo,
        reference: &EntityReferenceLink,
    ) -> WriteResult<()> {
        self.core.write_entity_reference(ctx, parent_link, reference)
    }

    fn write_primitive_value(&mut self, ctx: WriteContext<'_>, value: &Value) -> WriteResult<()> {
        self.core.write_primitive_value(ctx, value)
    }

    fn write_delta_link(
        &mut self,
        ctx: WriteContext<'_>,
        link: &DeltaLink,
        deleted: bool,
    ) -> WriteResult<()> {
        self.core.write_delta_link(ctx, link, deleted)
    }

    fn start_binary_stream(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.core.start_binary_stream()
    }

    fn binary_chunk(&mut self, chunk: &[u8]) -> WriteResult<()> {
        self.core.binary_chunk(chunk)
    }

    fn end_binary_stream(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.core.end_binary_stream()
    }

    fn start_text_writer(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.core.start_text_writer()
    }

    fn text_chunk(&mut self, chunk: &str) -> WriteResult<()> {
        self.core.text_chunk(chunk)
    }

    fn end_text_writer(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.core.end_text_writer()
    }

    fn flush(&mut self) -> WriteResult<()> {
        let output = self.core.take_output();
        tracing::debug!(bytes = output.len(), "flushing JSON payload buffer");
        self.sink
            .write_all(&output)
            .and_then(|()| self.sink.flush())
            .map_err(constructors::backend)
    }

    fn create_resource_scope(&mut self, _resource: &Resource) -> Option<ScopeExtension> {
        Some(Box::new(JsonResourceExt::default()))
    }

    fn create_nested_resource_info_scope(
        &mut self,
        _link: &NestedResourceInfo,
    ) -> Option<ScopeExtension> {
        Some(Box::new(JsonNestedExt::default()))
    }
}

/// Asynchronous OData JSON back-end
pub struct AsyncJsonFormatBackend {
    core: JsonPayloadSerializer,
    sink: Box<dyn AsyncWrite + Unpin + Send>,
}

impl AsyncJsonFormatBackend {
    #[must_use]
    pub fn new(sink: Box<dyn AsyncWrite + Unpin + Send>, options: JsonWriterOptions) -> Self {
        Self {
            core: serializer_for(&options),
            sink,
        }
    }
}

#[async_trait]
impl AsyncFormatBackend for AsyncJsonFormatBackend {
    async fn start_payload(&mut self) -> WriteResult<()> {
        Ok(())
    }

    async fn end_payload(&mut self) -> WriteResult<()> {
        Ok(())
    }

    async fn start_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &Resource,
    ) -> WriteResult<()> {
        self.core.start_resource(ctx, resource)
    }

    async fn end_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &Resource,
    ) -> WriteResult<()> {
        self.core.end_resource(ctx, resource)
    }

    async fn start_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &ResourceSet,
    ) -> WriteResult<()> {
        self.core.start_resource_set(ctx, set)
    }

    async fn end_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &ResourceSet,
    ) -> WriteResult<()> {
        self.core.end_resource_set(ctx, set)
    }

    async fn start_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.core.start_delta_resource_set(ctx, set)
    }

    async fn end_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.core.end_delta_resource_set(ctx, set)
    }

    async fn start_deleted_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()> {
        self.core.start_deleted_resource(ctx, resource)
    }

    async fn end_deleted_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()> {
        self.core.end_deleted_resource(ctx, resource)
    }

    async fn start_property(
        &mut self,
        ctx: WriteContext<'_>,
        property: &PropertyInfo,
    ) -> WriteResult<()> {
        self.core.start_property(ctx, property)
    }

    async fn end_property(
        &mut self,
        ctx: WriteContext<'_>,
        property: &PropertyInfo,
    ) -> WriteResult<()> {
        self.core.end_property(ctx, property)
    }

    async fn start_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.core.start_nested_resource_info_with_content(ctx, link)
    }

    async fn end_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.core.end_nested_resource_info_with_content(ctx, link)
    }

    async fn write_deferred_nested_resource_info(
        &mut self,
        ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.core.write_deferred_nested_resource_info(ctx, link)
    }

    async fn write_entity_reference_in_navigation_link_content(
        &mut self,
        ctx: WriteContext<'_>,
        parent_link: &NestedResourceInfo,
        reference: &EntityReferenceLink,
    ) -> WriteResult<()> {
        self.core.write_entity_reference(ctx, parent_link, reference)
    }

    async fn write_primitive_value(
        &mut self,
        ctx: WriteContext<'_>,
        value: &Value,
    ) -> WriteResult<()> {
        self.core.write_primitive_value(ctx, value)
    }

    async fn write_delta_link(
        &mut self,
        ctx: WriteContext<'_>,
        link: &DeltaLink,
        deleted: bool,
    ) -> WriteResult<()> {
        self.core.write_delta_link(ctx, link, deleted)
    }

    async fn start_binary_stream(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.core.start_binary_stream()
    }

    async fn binary_chunk(&mut self, chunk: &[u8]) -> WriteResult<()> {
        self.core.binary_chunk(chunk)
    }

    async fn end_binary_stream(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.core.end_binary_stream()
    }

    async fn start_text_writer(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.core.start_text_writer()
    }

    async fn text_chunk(&mut self, chunk: &str) -> WriteResult<()> {
        self.core.text_chunk(chunk)
    }

    async fn end_text_writer(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.core.end_text_writer()
    }

    async fn flush(&mut self) -> WriteResult<()> {
        let output = self.core.take_output();
        tracing::debug!(bytes = output.len(), "flushing JSON payload buffer");
        self.sink
            .write_all(&output)
            .await
            .map_err(constructors::backend)?;
        self.sink.flush().await.map_err(constructors::backend)
    }

    fn create_resource_scope(&mut self, _resource: &Resource) -> Option<ScopeExtension> {
        Some(Box::new(JsonResourceExt::default()))
    }

    fn create_nested_resource_info_scope(
        &mut self,
        _link: &NestedResourceInfo,
    ) -> Option<ScopeExtension> {
        Some(Box::new(JsonNestedExt::default()))
    }
}
