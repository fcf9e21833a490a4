//! Synchronous operation family
//!
//! Each public operation validates, adjusts the scope stack, then invokes
//! the matching back-end hook. The `*_raw` helpers do the borrow splitting
//! for hook invocation; their results are funneled through
//! `fail_on_error` so any failure moves the writer to the error state
//! before it surfaces.

use serde_json::Value;

use crate::error::{constructors, WriteResult};
use crate::payload::{
    DeletedResource, DeltaLink, DeltaResourceSet, EntityReferenceLink, NestedResourceInfo,
    PayloadItem, PropertyInfo, Resource, ResourceSet,
};
use crate::writer::state::WriterState;
use crate::writer::streams::{BinaryWriteStream, TextValueWriter};

use super::{split_scope, BackendHandle, EndAction, ODataWriter};

impl ODataWriter {
    /// Open a resource set scope.
    pub fn start_resource_set(&mut self, set: ResourceSet) -> WriteResult<()> {
        self.begin_sync_op()?;
        self.promote_pending_sync()?;
        let entered = self.enter_resource_set(set);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_sync()
    }

    /// Open a delta resource set scope.
    pub fn start_delta_resource_set(&mut self, set: DeltaResourceSet) -> WriteResult<()> {
        self.begin_sync_op()?;
        self.promote_pending_sync()?;
        let entered = self.enter_delta_resource_set(set);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_sync()
    }

    /// Open a resource scope.
    pub fn start_resource(&mut self, resource: Resource) -> WriteResult<()> {
        self.begin_sync_op()?;
        self.promote_pending_sync()?;
        let entered = self.enter_resource(resource);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_sync()
    }

    /// Open a deleted resource scope.
    pub fn start_deleted_resource(&mut self, resource: DeletedResource) -> WriteResult<()> {
        self.begin_sync_op()?;
        self.promote_pending_sync()?;
        let entered = self.enter_deleted_resource(resource);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_sync()
    }

    /// Open a nested resource info scope; content decides whether it
    /// becomes expanded or stays deferred.
    pub fn start_nested_resource_info(&mut self, link: NestedResourceInfo) -> WriteResult<()> {
        self.begin_sync_op()?;
        let entered = self.enter_nested_resource_info(link);
        self.fail_on_error(entered)?;
        // No hook yet: the link is written when content arrives or on end.
        Ok(())
    }

    /// Open a property scope; a single value may follow.
    pub fn start_property(&mut self, property: PropertyInfo) -> WriteResult<()> {
        self.begin_sync_op()?;
        let entered = self.enter_property(property);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_sync()
    }

    /// Write one primitive value into the current scope.
    pub fn write_primitive(&mut self, value: Value) -> WriteResult<()> {
        self.begin_sync_op()?;
        self.promote_pending_sync()?;
        let entered = self.enter_primitive(value);
        self.fail_on_error(entered)?;
        if !self.current_skips_writing() {
            let written = self.primitive_hook_raw_sync();
            self.fail_on_error(written)?;
        }
        self.pop_transient_scope();
        Ok(())
    }

    /// Write an entity reference link into the current nested link.
    pub fn write_entity_reference_link(
        &mut self,
        reference: EntityReferenceLink,
    ) -> WriteResult<()> {
        self.begin_sync_op()?;
        let valid = self.validate_entity_reference();
        self.fail_on_error(valid)?;
        self.promote_pending_sync()?;
        let counted = self.register_entity_reference();
        self.fail_on_error(counted)?;
        if !self.current_skips_writing() {
            let written = self.entity_reference_hook_raw_sync(&reference);
            self.fail_on_error(written)?;
        }
        Ok(())
    }

    /// Write an added-link delta entry; the scope closes immediately.
    pub fn write_delta_link(&mut self, link: DeltaLink) -> WriteResult<()> {
        self.write_delta_link_sync_impl(link, false)
    }

    /// Write a deleted-link delta entry; the scope closes immediately.
    pub fn write_delta_deleted_link(&mut self, link: DeltaLink) -> WriteResult<()> {
        self.write_delta_link_sync_impl(link, true)
    }

    fn write_delta_link_sync_impl(&mut self, link: DeltaLink, deleted: bool) -> WriteResult<()> {
        self.begin_sync_op()?;
        let entered = self.enter_delta_link(link, deleted);
        self.fail_on_error(entered)?;
        if !self.current_skips_writing() {
            let written = self.delta_link_hook_raw_sync(deleted);
            self.fail_on_error(written)?;
        }
        self.pop_transient_scope();
        Ok(())
    }

    /// Obtain a binary sink for the current property or untyped set slot.
    ///
    /// The writer is borrowed until the returned stream is closed or
    /// dropped.
    pub fn create_binary_write_stream(&mut self) -> WriteResult<BinaryWriteStream<'_>> {
        self.begin_sync_op()?;
        let entered = self.enter_stream_scope(WriterState::Stream);
        self.fail_on_error(entered)?;
        if !self.current_skips_writing() {
            let started = self.stream_lifecycle_hook_raw_sync(WriterState::Stream, true);
            self.fail_on_error(started)?;
        }
        Ok(BinaryWriteStream::new(self))
    }

    /// Obtain a character sink for the current property value.
    ///
    /// The writer is borrowed until the returned sink is closed or
    /// dropped.
    pub fn create_text_writer(&mut self) -> WriteResult<TextValueWriter<'_>> {
        self.begin_sync_op()?;
        let entered = self.enter_stream_scope(WriterState::TextValue);
        self.fail_on_error(entered)?;
        if !self.current_skips_writing() {
            let started = self.stream_lifecycle_hook_raw_sync(WriterState::TextValue, true);
            self.fail_on_error(started)?;
        }
        Ok(TextValueWriter::new(self))
    }

    /// Close the current scope; completing the payload when the stack
    /// drains.
    pub fn end(&mut self) -> WriteResult<()> {
        let affinity = self.expect_sync();
        self.fail_on_error(affinity)?;
        let alive = self.check_not_disposed();
        self.fail_on_error(alive)?;

        let classified = self.classify_end();
        let action = self.fail_on_error(classified)?;
        if !self.current_skips_writing() {
            let ended = self.end_hook_raw_sync(action);
            self.fail_on_error(ended)?;
        }
        if self.leave_scope() {
            self.replace_root_completed();
            let payload_done = self.payload_end_hook_raw_sync();
            self.fail_on_error(payload_done)?;
            self.notify_completed();
            let flushed = self.flush_raw_sync();
            self.fail_on_error(flushed)?;
        }
        Ok(())
    }

    /// Flush the back-end; legal in any state.
    pub fn flush(&mut self) -> WriteResult<()> {
        let affinity = self.expect_sync();
        self.fail_on_error(affinity)?;
        let alive = self.check_not_disposed();
        self.fail_on_error(alive)?;
        let flushed = self.flush_raw_sync();
        self.fail_on_error(flushed)
    }

    // ---- shared op prologue ------------------------------------------

    fn begin_sync_op(&mut self) -> WriteResult<()> {
        let affinity = self.expect_sync();
        self.fail_on_error(affinity)?;
        let alive = self.check_not_disposed();
        self.fail_on_error(alive)?;
        if self.needs_payload_start() {
            let started = self.payload_start_hook_raw_sync();
            self.fail_on_error(started)?;
            self.mark_payload_started();
        }
        Ok(())
    }

    fn promote_pending_sync(&mut self) -> WriteResult<()> {
        let prepared = self.prepare_promotion();
        let promoted = self.fail_on_error(prepared)?;
        if promoted && !self.current_skips_writing() {
            let announced = self.nested_content_hook_raw_sync();
            self.fail_on_error(announced)?;
        }
        Ok(())
    }

    fn invoke_start_hook_sync(&mut self) -> WriteResult<()> {
        if self.current_skips_writing() {
            return Ok(());
        }
        let result = self.start_hook_raw_sync();
        self.fail_on_error(result)
    }

    // ---- raw hook invocations (no error-state handling) ---------------

    fn sync_backend(&mut self) -> WriteResult<&mut dyn crate::writer::hooks::FormatBackend> {
        match &mut self.backend {
            BackendHandle::Sync(backend) => Ok(backend.as_mut()),
            BackendHandle::Async(_) => Err(constructors::sync_call_on_async_writer()),
        }
    }

    fn payload_start_hook_raw_sync(&mut self) -> WriteResult<()> {
        self.sync_backend()?.start_payload()
    }

    fn payload_end_hook_raw_sync(&mut self) -> WriteResult<()> {
        self.sync_backend()?.end_payload()
    }

    fn flush_raw_sync(&mut self) -> WriteResult<()> {
        self.sync_backend()?.flush()
    }

    fn start_hook_raw_sync(&mut self) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Sync(backend) = backend else {
            return Err(constructors::sync_call_on_async_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::Resource(resource)) => backend.start_resource(ctx, resource),
            Some(PayloadItem::ResourceSet(set)) => backend.start_resource_set(ctx, set),
            Some(PayloadItem::DeltaResourceSet(set)) => {
                backend.start_delta_resource_set(ctx, set)
            }
            Some(PayloadItem::DeletedResource(resource)) => {
                backend.start_deleted_resource(ctx, resource)
            }
            Some(PayloadItem::Property(property)) => backend.start_property(ctx, property),
            _ => Err(constructors::internal("no start hook for current scope")),
        }
    }

    fn nested_content_hook_raw_sync(&mut self) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Sync(backend) = backend else {
            return Err(constructors::sync_call_on_async_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::NestedResourceInfo(link)) => {
                backend.start_nested_resource_info_with_content(ctx, link)
            }
            _ => Err(constructors::internal("promotion without a nested link")),
        }
    }

    fn end_hook_raw_sync(&mut self, action: EndAction) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Sync(backend) = backend else {
            return Err(constructors::sync_call_on_async_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match (action, item) {
            (EndAction::ResourceSet, Some(PayloadItem::ResourceSet(set))) => {
                backend.end_resource_set(ctx, set)
            }
            (EndAction::DeltaResourceSet, Some(PayloadItem::DeltaResourceSet(set))) => {
                backend.end_delta_resource_set(ctx, set)
            }
            (EndAction::Resource, Some(PayloadItem::Resource(resource))) => {
                backend.end_resource(ctx, resource)
            }
            (EndAction::DeletedResource, Some(PayloadItem::DeletedResource(resource))) => {
                backend.end_deleted_resource(ctx, resource)
            }
            (EndAction::Property, Some(PayloadItem::Property(property))) => {
                backend.end_property(ctx, property)
            }
            (EndAction::NestedWithContent, Some(PayloadItem::NestedResourceInfo(link))) => {
                backend.end_nested_resource_info_with_content(ctx, link)
            }
            (EndAction::DeferredNested, Some(PayloadItem::NestedResourceInfo(link))) => {
                backend.write_deferred_nested_resource_info(ctx, link)
            }
            _ => Err(constructors::internal("end hook item mismatch")),
        }
    }

    fn primitive_hook_raw_sync(&mut self) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Sync(backend) = backend else {
            return Err(constructors::sync_call_on_async_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::Primitive(value)) => backend.write_primitive_value(ctx, value),
            _ => Err(constructors::internal("primitive hook without a value")),
        }
    }

    fn entity_reference_hook_raw_sync(
        &mut self,
        reference: &EntityReferenceLink,
    ) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Sync(backend) = backend else {
            return Err(constructors::sync_call_on_async_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::NestedResourceInfo(link)) => {
                backend.write_entity_reference_in_navigation_link_content(ctx, link, reference)
            }
            _ => Err(constructors::internal(
                "entity reference without a nested link",
            )),
        }
    }

    fn delta_link_hook_raw_sync(&mut self, deleted: bool) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Sync(backend) = backend else {
            return Err(constructors::sync_call_on_async_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::DeltaLink(link) | PayloadItem::DeltaDeletedLink(link)) => {
                backend.write_delta_link(ctx, link, deleted)
            }
            _ => Err(constructors::internal("delta link hook without a link")),
        }
    }

    fn stream_lifecycle_hook_raw_sync(
        &mut self,
        state: WriterState,
        starting: bool,
    ) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Sync(backend) = backend else {
            return Err(constructors::sync_call_on_async_writer());
        };
        let (ctx, _) = split_scope(stack.current_mut(), is_top);
        match (state, starting) {
            (WriterState::Stream, true) => backend.start_binary_stream(ctx),
            (WriterState::Stream, false) => backend.end_binary_stream(ctx),
            (WriterState::TextValue, true) => backend.start_text_writer(ctx),
            (WriterState::TextValue, false) => backend.end_text_writer(ctx),
            _ => Err(constructors::internal("not a stream scope")),
        }
    }

    // ---- sub-writer plumbing (called from the stream guards) ----------

    pub(crate) fn stream_chunk_sync(&mut self, chunk: &[u8]) -> WriteResult<()> {
        if self.current_skips_writing() {
            return Ok(());
        }
        let written = self.sync_backend().and_then(|b| b.binary_chunk(chunk));
        self.fail_on_error(written)
    }

    pub(crate) fn text_chunk_sync(&mut self, chunk: &str) -> WriteResult<()> {
        if self.current_skips_writing() {
            return Ok(());
        }
        let written = self.sync_backend().and_then(|b| b.text_chunk(chunk));
        self.fail_on_error(written)
    }

    /// A sub-writer was closed: run the matching end hook and pop.
    pub(crate) fn stream_disposed_sync(&mut self) -> WriteResult<()> {
        let state = self.current_state();
        if !matches!(state, WriterState::Stream | WriterState::TextValue) {
            let err = Err(constructors::internal("no open sub-writer to dispose"));
            return self.fail_on_error(err);
        }
        if !self.current_skips_writing() {
            let ended = self.stream_lifecycle_hook_raw_sync(state, false);
            self.fail_on_error(ended)?;
        }
        self.pop_transient_scope();
        Ok(())
    }
}
