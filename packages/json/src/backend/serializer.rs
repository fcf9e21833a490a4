//! OData JSON payload serialization
//!
//! The hook-by-hook rendering logic shared by the sync and async
//! back-ends. Output accumulates in the text writer until the owning
//! back-end flushes it to its sink.
//!
//! Per-scope JSON bookkeeping (null resources, reference-link arrays)
//! rides on the engine's scopes through the scope-factory extensions.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde_json::Value;

use odwire_core::error::{constructors, WriteResult};
use odwire_core::payload::{
    DeletedEntryReason, DeletedResource, DeltaLink, DeltaResourceSet, EntityReferenceLink,
    NestedResourceInfo, PropertyInfo, Resource, ResourceProperty, ResourceSet,
};
use odwire_core::writer::{ScopeExtension, WriteContext};

use crate::metadata::ContextUrlBuilder;
use crate::text::JsonTextWriter;

/// Per-resource-scope JSON state
#[derive(Debug, Default)]
pub(crate) struct JsonResourceExt {
    pub is_null: bool,
}

/// Per-nested-link JSON state
#[derive(Debug, Default)]
pub(crate) struct JsonNestedExt {
    pub reference_array_open: bool,
}

fn resource_ext<'a>(ext: &'a mut Option<ScopeExtension>) -> Option<&'a mut JsonResourceExt> {
    ext.as_mut()?.downcast_mut::<JsonResourceExt>()
}

fn nested_ext<'a>(ext: &'a mut Option<ScopeExtension>) -> Option<&'a mut JsonNestedExt> {
    ext.as_mut()?.downcast_mut::<JsonNestedExt>()
}

/// Renders writer hooks into OData JSON text
#[derive(Debug)]
pub(crate) struct JsonPayloadSerializer {
    json: JsonTextWriter,
    context_urls: ContextUrlBuilder,
    include_context: bool,
    binary_buf: Option<Vec<u8>>,
}

impl JsonPayloadSerializer {
    pub(crate) fn new(context_urls: ContextUrlBuilder, include_context: bool) -> Self {
        Self {
            json: JsonTextWriter::new(),
            context_urls,
            include_context,
            binary_buf: None,
        }
    }

    pub(crate) fn take_output(&mut self) -> Bytes {
        self.json.take()
    }

    fn context_annotation(&mut self, fragment_url: String) {
        self.json.name("@odata.context");
        self.json.string(&fragment_url);
    }

    // ---- sets ---------------------------------------------------------

    pub(crate) fn start_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &ResourceSet,
    ) -> WriteResult<()> {
        if ctx.is_top_level {
            self.json.start_object();
            if self.include_context {
                if let Some(source) = ctx.navigation_source {
                    let url = self.context_urls.for_resource_set(source);
                    self.context_annotation(url);
                }
            }
            if let Some(count) = set.count {
                self.json.name("@odata.count");
                self.json.value(&Value::from(count))?;
            }
            self.json.name("value");
        }
        self.json.start_array();
        Ok(())
    }

    pub(crate) fn end_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &ResourceSet,
    ) -> WriteResult<()> {
        self.json.end_array();
        if ctx.is_top_level {
            if let Some(link) = &set.next_page_link {
                self.json.name("@odata.nextLink");
                self.json.string(link.as_str());
            }
            if let Some(link) = &set.delta_link {
                self.json.name("@odata.deltaLink");
                self.json.string(link.as_str());
            }
            self.json.end_object();
        }
        Ok(())
    }

    pub(crate) fn start_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()> {
        if ctx.is_top_level {
            self.json.start_object();
            if self.include_context {
                if let Some(source) = ctx.navigation_source {
                    let url = self.context_urls.for_delta(source);
                    self.context_annotation(url);
                }
            }
            if let Some(count) = set.count {
                self.json.name("@odata.count");
                self.json.value(&Value::from(count))?;
            }
            self.json.name("value");
        }
        self.json.start_array();
        Ok(())
    }

    pub(crate) fn end_delta_resource_set(
        &mut self,
        ctx: WriteContext<'_>,
        set: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.json.end_array();
        if ctx.is_top_level {
            if let Some(link) = &set.next_page_link {
                self.json.name("@odata.nextLink");
                self.json.string(link.as_str());
            }
            if let Some(link) = &set.delta_link {
                self.json.name("@odata.deltaLink");
                self.json.string(link.as_str());
            }
            self.json.end_object();
        }
        Ok(())
    }

    // ---- resources ----------------------------------------------------

    pub(crate) fn start_resource(
        &mut self,
        ctx: WriteContext<'_>,
        resource: &Resource,
    ) -> WriteResult<()> {
        if resource.is_null {
            if let Some(ext) = resource_ext(ctx.extension) {
                ext.is_null = true;
            }
            self.json.null();
            return Ok(());
        }
        self.json.start_object();
        if ctx.is_top_level && self.include_context {
            if let Some(source) = ctx.navigation_source {
                let url = self.context_urls.for_resource(source);
                self.context_annotation(url);
            }
        }
        let cast = match (ctx.resource_type, ctx.resource_type_from_metadata) {
            (Some(actual), Some(declared)) => actual != declared,
            _ => false,
        };
        if cast {
            if let Some(actual) = ctx.resource_type {
                self.json.name("@odata.type");
                self.json.string(&format!("#{actual}"));
            }
        }
        if let Some(id) = &resource.id {
            self.json.name("@odata.id");
            self.json.string(id.as_str());
        }
        self.write_properties(&resource.properties)
    }

    pub(crate) fn end_resource(
        &mut self,
        ctx: WriteContext<'_>,
        _resource: &Resource,
    ) -> WriteResult<()> {
        let was_null = resource_ext(ctx.extension).is_some_and(|e| e.is_null);
        if !was_null {
            self.json.end_object();
        }
        Ok(())
    }

    pub(crate) fn start_deleted_resource(
        &mut self,
        _ctx: WriteContext<'_>,
        resource: &DeletedResource,
    ) -> WriteResult<()> {
        self.json.start_object();
        self.json.name("@removed");
        self.json.start_object();
        self.json.name("reason");
        self.json.string(match resource.reason {
            DeletedEntryReason::Deleted => "deleted",
            DeletedEntryReason::Changed => "changed",
        });
        self.json.end_object();
        if let Some(id) = &resource.id {
            self.json.name("@odata.id");
            self.json.string(id.as_str());
        }
        self.write_properties(&resource.properties)
    }

    pub(crate) fn end_deleted_resource(
        &mut self,
        _ctx: WriteContext<'_>,
        _resource: &DeletedResource,
    ) -> WriteResult<()> {
        self.json.end_object();
        Ok(())
    }

    fn write_properties(&mut self, properties: &[ResourceProperty]) -> WriteResult<()> {
        for property in properties {
            self.json.name(&property.name);
            self.json.value(&property.value)?;
        }
        Ok(())
    }

    // ---- properties and primitives -------------------------------------

    pub(crate) fn start_property(
        &mut self,
        _ctx: WriteContext<'_>,
        property: &PropertyInfo,
    ) -> WriteResult<()> {
        self.json.name(&property.name);
        Ok(())
    }

    pub(crate) fn end_property(
        &mut self,
        _ctx: WriteContext<'_>,
        _property: &PropertyInfo,
    ) -> WriteResult<()> {
        // A property ended without a value still has to be valid JSON.
        if self.json.has_pending_value() {
            self.json.null();
        }
        Ok(())
    }

    pub(crate) fn write_primitive_value(
        &mut self,
        _ctx: WriteContext<'_>,
        value: &Value,
    ) -> WriteResult<()> {
        self.json.value(value)
    }

    // ---- nested links ---------------------------------------------------

    pub(crate) fn start_nested_resource_info_with_content(
        &mut self,
        _ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.json.name(&link.name);
        Ok(())
    }

    pub(crate) fn end_nested_resource_info_with_content(
        &mut self,
        ctx: WriteContext<'_>,
        _link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        if nested_ext(ctx.extension).is_some_and(|e| e.reference_array_open) {
            self.json.end_array();
        }
        Ok(())
    }

    pub(crate) fn write_deferred_nested_resource_info(
        &mut self,
        _ctx: WriteContext<'_>,
        link: &NestedResourceInfo,
    ) -> WriteResult<()> {
        if let Some(url) = &link.url {
            self.json.name(&format!("{}@odata.navigationLink", link.name));
            self.json.string(url.as_str());
        }
        Ok(())
    }

    pub(crate) fn write_entity_reference(
        &mut self,
        ctx: WriteContext<'_>,
        parent_link: &NestedResourceInfo,
        reference: &EntityReferenceLink,
    ) -> WriteResult<()> {
        if parent_link.is_collection == Some(true) {
            if let Some(ext) = nested_ext(ctx.extension) {
                if !ext.reference_array_open {
                    self.json.start_array();
                    ext.reference_array_open = true;
                }
            }
        }
        self.json.start_object();
        self.json.name("@odata.id");
        self.json.string(reference.url.as_str());
        self.json.end_object();
        Ok(())
    }

    // ---- delta links ----------------------------------------------------

    pub(crate) fn write_delta_link(
        &mut self,
        ctx: WriteContext<'_>,
        link: &DeltaLink,
        deleted: bool,
    ) -> WriteResult<()> {
        self.json.start_object();
        if self.include_context {
            if let Some(source) = ctx.navigation_source {
                let url = self.context_urls.for_delta_link(source, deleted);
                self.context_annotation(url);
            }
        }
        self.json.name("source");
        self.json.string(link.source.as_str());
        self.json.name("relationship");
        self.json.string(&link.relationship);
        self.json.name("target");
        self.json.string(link.target.as_str());
        self.json.end_object();
        Ok(())
    }

    // ---- binary and text values -----------------------------------------

    pub(crate) fn start_binary_stream(&mut self) -> WriteResult<()> {
        self.binary_buf = Some(Vec::new());
        Ok(())
    }

    pub(crate) fn binary_chunk(&mut self, chunk: &[u8]) -> WriteResult<()> {
        match &mut self.binary_buf {
            Some(buf) => {
                buf.extend_from_slice(chunk);
                Ok(())
            }
            None => Err(constructors::backend("binary chunk without an open stream")),
        }
    }

    pub(crate) fn end_binary_stream(&mut self) -> WriteResult<()> {
        match self.binary_buf.take() {
            Some(buf) => {
                self.json.string(&BASE64.encode(buf));
                Ok(())
            }
            None => Err(constructors::backend("no binary stream to close")),
        }
    }

    pub(crate) fn start_text_writer(&mut self) -> WriteResult<()> {
        self.json.begin_string_value();
        Ok(())
    }

    pub(crate) fn text_chunk(&mut self, chunk: &str) -> WriteResult<()> {
        self.json.string_fragment(chunk);
        Ok(())
    }

    pub(crate) fn end_text_writer(&mut self) -> WriteResult<()> {
        self.json.end_string_value();
        Ok(())
    }
}
