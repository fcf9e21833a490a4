//! Asynchronous operation family
//!
//! Twin of the synchronous API: identical validation and scope handling,
//! with the back-end hooks awaited. Validation, scope manipulation, type
//! resolution, and path composition complete before any suspension point.

use serde_json::Value;

use crate::error::{constructors, WriteResult};
use crate::payload::{
    DeletedResource, DeltaLink, DeltaResourceSet, EntityReferenceLink, NestedResourceInfo,
    PayloadItem, PropertyInfo, Resource, ResourceSet,
};
use crate::writer::state::WriterState;
use crate::writer::streams::{AsyncBinaryWriteStream, AsyncTextValueWriter};

use super::{split_scope, BackendHandle, EndAction, ODataWriter};

impl ODataWriter {
    /// Async twin of [`ODataWriter::start_resource_set`].
    pub async fn start_resource_set_async(&mut self, set: ResourceSet) -> WriteResult<()> {
        self.begin_async_op().await?;
        self.promote_pending_async().await?;
        let entered = self.enter_resource_set(set);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_async().await
    }

    /// Async twin of [`ODataWriter::start_delta_resource_set`].
    pub async fn start_delta_resource_set_async(
        &mut self,
        set: DeltaResourceSet,
    ) -> WriteResult<()> {
        self.begin_async_op().await?;
        self.promote_pending_async().await?;
        let entered = self.enter_delta_resource_set(set);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_async().await
    }

    /// Async twin of [`ODataWriter::start_resource`].
    pub async fn start_resource_async(&mut self, resource: Resource) -> WriteResult<()> {
        self.begin_async_op().await?;
        self.promote_pending_async().await?;
        let entered = self.enter_resource(resource);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_async().await
    }

    /// Async twin of [`ODataWriter::start_deleted_resource`].
    pub async fn start_deleted_resource_async(
        &mut self,
        resource: DeletedResource,
    ) -> WriteResult<()> {
        self.begin_async_op().await?;
        self.promote_pending_async().await?;
        let entered = self.enter_deleted_resource(resource);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_async().await
    }

    /// Async twin of [`ODataWriter::start_nested_resource_info`].
    pub async fn start_nested_resource_info_async(
        &mut self,
        link: NestedResourceInfo,
    ) -> WriteResult<()> {
        self.begin_async_op().await?;
        let entered = self.enter_nested_resource_info(link);
        self.fail_on_error(entered)?;
        Ok(())
    }

    /// Async twin of [`ODataWriter::start_property`].
    pub async fn start_property_async(&mut self, property: PropertyInfo) -> WriteResult<()> {
        self.begin_async_op().await?;
        let entered = self.enter_property(property);
        self.fail_on_error(entered)?;
        self.invoke_start_hook_async().await
    }

    /// Async twin of [`ODataWriter::write_primitive`].
    pub async fn write_primitive_async(&mut self, value: Value) -> WriteResult<()> {
        self.begin_async_op().await?;
        self.promote_pending_async().await?;
        let entered = self.enter_primitive(value);
        self.fail_on_error(entered)?;
        if !self.current_skips_writing() {
            let written = self.primitive_hook_raw_async().await;
            self.fail_on_error(written)?;
        }
        self.pop_transient_scope();
        Ok(())
    }

    /// Async twin of [`ODataWriter::write_entity_reference_link`].
    pub async fn write_entity_reference_link_async(
        &mut self,
        reference: EntityReferenceLink,
    ) -> WriteResult<()> {
        self.begin_async_op().await?;
        let valid = self.validate_entity_reference();
        self.fail_on_error(valid)?;
        self.promote_pending_async().await?;
        let counted = self.register_entity_reference();
        self.fail_on_error(counted)?;
        if !self.current_skips_writing() {
            let written = self.entity_reference_hook_raw_async(&reference).await;
            self.fail_on_error(written)?;
        }
        Ok(())
    }

    /// Async twin of [`ODataWriter::write_delta_link`].
    pub async fn write_delta_link_async(&mut self, link: DeltaLink) -> WriteResult<()> {
        self.write_delta_link_async_impl(link, false).await
    }

    /// Async twin of [`ODataWriter::write_delta_deleted_link`].
    pub async fn write_delta_deleted_link_async(&mut self, link: DeltaLink) -> WriteResult<()> {
        self.write_delta_link_async_impl(link, true).await
    }

    async fn write_delta_link_async_impl(
        &mut self,
        link: DeltaLink,
        deleted: bool,
    ) -> WriteResult<()> {
        self.begin_async_op().await?;
        let entered = self.enter_delta_link(link, deleted);
        self.fail_on_error(entered)?;
        if !self.current_skips_writing() {
            let written = self.delta_link_hook_raw_async(deleted).await;
            self.fail_on_error(written)?;
        }
        self.pop_transient_scope();
        Ok(())
    }

    /// Async twin of [`ODataWriter::create_binary_write_stream`].
    pub async fn create_binary_write_stream_async(
        &mut self,
    ) -> WriteResult<AsyncBinaryWriteStream<'_>> {
        self.begin_async_op().await?;
        let entered = self.enter_stream_scope(WriterState::Stream);
        self.fail_on_error(entered)?;
        if !self.current_skips_writing() {
            let started = self
                .stream_lifecycle_hook_raw_async(WriterState::Stream, true)
                .await;
            self.fail_on_error(started)?;
        }
        Ok(AsyncBinaryWriteStream::new(self))
    }

    /// Async twin of [`ODataWriter::create_text_writer`].
    pub async fn create_text_writer_async(&mut self) -> WriteResult<AsyncTextValueWriter<'_>> {
        self.begin_async_op().await?;
        let entered = self.enter_stream_scope(WriterState::TextValue);
        self.fail_on_error(entered)?;
        if !self.current_skips_writing() {
            let started = self
                .stream_lifecycle_hook_raw_async(WriterState::TextValue, true)
                .await;
            self.fail_on_error(started)?;
        }
        Ok(AsyncTextValueWriter::new(self))
    }

    /// Async twin of [`ODataWriter::end`].
    pub async fn end_async(&mut self) -> WriteResult<()> {
        let affinity = self.expect_async();
        self.fail_on_error(affinity)?;
        let alive = self.check_not_disposed();
        self.fail_on_error(alive)?;

        let classified = self.classify_end();
        let action = self.fail_on_error(classified)?;
        if !self.current_skips_writing() {
            let ended = self.end_hook_raw_async(action).await;
            self.fail_on_error(ended)?;
        }
        if self.leave_scope() {
            self.replace_root_completed();
            let payload_done = self.payload_end_hook_raw_async().await;
            self.fail_on_error(payload_done)?;
            self.notify_completed();
            let flushed = self.flush_raw_async().await;
            self.fail_on_error(flushed)?;
        }
        Ok(())
    }

    /// Async twin of [`ODataWriter::flush`].
    pub async fn flush_async(&mut self) -> WriteResult<()> {
        let affinity = self.expect_async();
        self.fail_on_error(affinity)?;
        let alive = self.check_not_disposed();
        self.fail_on_error(alive)?;
        let flushed = self.flush_raw_async().await;
        self.fail_on_error(flushed)
    }

    // ---- shared op prologue ------------------------------------------

    async fn begin_async_op(&mut self) -> WriteResult<()> {
        let affinity = self.expect_async();
        self.fail_on_error(affinity)?;
        let alive = self.check_not_disposed();
        self.fail_on_error(alive)?;
        if self.needs_payload_start() {
            let started = self.payload_start_hook_raw_async().await;
            self.fail_on_error(started)?;
            self.mark_payload_started();
        }
        Ok(())
    }

    async fn promote_pending_async(&mut self) -> WriteResult<()> {
        let prepared = self.prepare_promotion();
        let promoted = self.fail_on_error(prepared)?;
        if promoted && !self.current_skips_writing() {
            let announced = self.nested_content_hook_raw_async().await;
            self.fail_on_error(announced)?;
        }
        Ok(())
    }

    async fn invoke_start_hook_async(&mut self) -> WriteResult<()> {
        if self.current_skips_writing() {
            return Ok(());
        }
        let result = self.start_hook_raw_async().await;
        self.fail_on_error(result)
    }

    // ---- raw hook invocations (no error-state handling) ---------------

    async fn payload_start_hook_raw_async(&mut self) -> WriteResult<()> {
        match &mut self.backend {
            BackendHandle::Async(backend) => backend.start_payload().await,
            BackendHandle::Sync(_) => Err(constructors::async_call_on_sync_writer()),
        }
    }

    async fn payload_end_hook_raw_async(&mut self) -> WriteResult<()> {
        match &mut self.backend {
            BackendHandle::Async(backend) => backend.end_payload().await,
            BackendHandle::Sync(_) => Err(constructors::async_call_on_sync_writer()),
        }
    }

    async fn flush_raw_async(&mut self) -> WriteResult<()> {
        match &mut self.backend {
            BackendHandle::Async(backend) => backend.flush().await,
            BackendHandle::Sync(_) => Err(constructors::async_call_on_sync_writer()),
        }
    }

    async fn start_hook_raw_async(&mut self) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Async(backend) = backend else {
            return Err(constructors::async_call_on_sync_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::Resource(resource)) => backend.start_resource(ctx, resource).await,
            Some(PayloadItem::ResourceSet(set)) => backend.start_resource_set(ctx, set).await,
            Some(PayloadItem::DeltaResourceSet(set)) => {
                backend.start_delta_resource_set(ctx, set).await
            }
            Some(PayloadItem::DeletedResource(resource)) => {
                backend.start_deleted_resource(ctx, resource).await
            }
            Some(PayloadItem::Property(property)) => backend.start_property(ctx, property).await,
            _ => Err(constructors::internal("no start hook for current scope")),
        }
    }

    async fn nested_content_hook_raw_async(&mut self) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Async(backend) = backend else {
            return Err(constructors::async_call_on_sync_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::NestedResourceInfo(link)) => {
                backend.start_nested_resource_info_with_content(ctx, link).await
            }
            _ => Err(constructors::internal("promotion without a nested link")),
        }
    }

    async fn end_hook_raw_async(&mut self, action: EndAction) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Async(backend) = backend else {
            return Err(constructors::async_call_on_sync_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match (action, item) {
            (EndAction::ResourceSet, Some(PayloadItem::ResourceSet(set))) => {
                backend.end_resource_set(ctx, set).await
            }
            (EndAction::DeltaResourceSet, Some(PayloadItem::DeltaResourceSet(set))) => {
                backend.end_delta_resource_set(ctx, set).await
            }
            (EndAction::Resource, Some(PayloadItem::Resource(resource))) => {
                backend.end_resource(ctx, resource).await
            }
            (EndAction::DeletedResource, Some(PayloadItem::DeletedResource(resource))) => {
                backend.end_deleted_resource(ctx, resource).await
            }
            (EndAction::Property, Some(PayloadItem::Property(property))) => {
                backend.end_property(ctx, property).await
            }
            (EndAction::NestedWithContent, Some(PayloadItem::NestedResourceInfo(link))) => {
                backend.end_nested_resource_info_with_content(ctx, link).await
            }
            (EndAction::DeferredNested, Some(PayloadItem::NestedResourceInfo(link))) => {
                backend.write_deferred_nested_resource_info(ctx, link).await
            }
            _ => Err(constructors::internal("end hook item mismatch")),
        }
    }

    async fn primitive_hook_raw_async(&mut self) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Async(backend) = backend else {
            return Err(constructors::async_call_on_sync_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::Primitive(value)) => {
                backend.write_primitive_value(ctx, value).await
            }
            _ => Err(constructors::internal("primitive hook without a value")),
        }
    }

    async fn entity_reference_hook_raw_async(
        &mut self,
        reference: &EntityReferenceLink,
    ) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Async(backend) = backend else {
            return Err(constructors::async_call_on_sync_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::NestedResourceInfo(link)) => {
                backend
                    .write_entity_reference_in_navigation_link_content(ctx, link, reference)
                    .await
            }
            _ => Err(constructors::internal(
                "entity reference without a nested link",
            )),
        }
    }

    async fn delta_link_hook_raw_async(&mut self, deleted: bool) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Async(backend) = backend else {
            return Err(constructors::async_call_on_sync_writer());
        };
        let (ctx, item) = split_scope(stack.current_mut(), is_top);
        match item {
            Some(PayloadItem::DeltaLink(link) | PayloadItem::DeltaDeletedLink(link)) => {
                backend.write_delta_link(ctx, link, deleted).await
            }
            _ => Err(constructors::internal("delta link hook without a link")),
        }
    }

    async fn stream_lifecycle_hook_raw_async(
        &mut self,
        state: WriterState,
        starting: bool,
    ) -> WriteResult<()> {
        let is_top = self.stack.is_top_level();
        let ODataWriter { stack, backend, .. } = self;
        let BackendHandle::Async(backend) = backend else {
            return Err(constructors::async_call_on_sync_writer());
        };
        let (ctx, _) = split_scope(stack.current_mut(), is_top);
        match (state, starting) {
            (WriterState::Stream, true) => backend.start_binary_stream(ctx).await,
            (WriterState::Stream, false) => backend.end_binary_stream(ctx).await,
            (WriterState::TextValue, true) => backend.start_text_writer(ctx).await,
            (WriterState::TextValue, false) => backend.end_text_writer(ctx).await,
            _ => Err(constructors::internal("not a stream scope")),
        }
    }

    // ---- sub-writer plumbing (called from the stream guards) ----------

    pub(crate) async fn stream_chunk_async(&mut self, chunk: &[u8]) -> WriteResult<()> {
        if self.current_skips_writing() {
            return Ok(());
        }
        let written = match &mut self.backend {
            BackendHandle::Async(backend) => backend.binary_chunk(chunk).await,
            BackendHandle::Sync(_) => Err(constructors::async_call_on_sync_writer()),
        };
        self.fail_on_error(written)
    }

    pub(crate) async fn text_chunk_async(&mut self, chunk: &str) -> WriteResult<()> {
        if self.current_skips_writing() {
            return Ok(());
        }
        let written = match &mut self.backend {
            BackendHandle::Async(backend) => backend.text_chunk(chunk).await,
            BackendHandle::Sync(_) => Err(constructors::async_call_on_sync_writer()),
        };
        self.fail_on_error(written)
    }

    /// Async twin of the sub-writer disposal path.
    pub(crate) async fn stream_disposed_async(&mut self) -> WriteResult<()> {
        let state = self.current_state();
        if !matches!(state, WriterState::Stream | WriterState::TextValue) {
            let err = Err(constructors::internal("no open sub-writer to dispose"));
            return self.fail_on_error(err);
        }
        if !self.current_skips_writing() {
            let ended = self.stream_lifecycle_hook_raw_async(state, false).await;
            self.fail_on_error(ended)?;
        }
        self.pop_transient_scope();
        Ok(())
    }
}
