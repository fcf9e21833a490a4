//! Shared fixtures: a recording back-end that logs hook invocations, an
//! async twin, a counting observer, and the schema used across the writer
//! integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use odwire_core::edm::{EdmModel, EdmProperty, EdmStructuredType, NavigationSource};
use odwire_core::error::{constructors, WriteError, WriteResult};
use odwire_core::payload::{
    DeletedResource, DeltaLink, DeltaResourceSet, EntityReferenceLink, NestedResourceInfo,
    PropertyInfo, Resource, ResourceSet,
};
use odwire_core::writer::{
    AsyncFormatBackend, FormatBackend, WriteContext, WriterObserver,
};

pub type HookLog = Arc<Mutex<Vec<String>>>;

/// Schema shared by the writer tests: customers with orders, a manager,
/// and a complex address.
pub fn test_model() -> Arc<EdmModel> {
    Arc::new(
        EdmModel::new("Container")
            .with_type(
                EdmStructuredType::entity("NS.Customer")
                    .with_key(["Id"])
                    .with_property(EdmProperty::structural("Id", "Edm.Int32"))
                    .with_property(EdmProperty::structural("Name", "Edm.String"))
                    .with_property(EdmProperty::structural("Address", "NS.Address"))
                    .with_property(EdmProperty::navigation("Orders", "Collection(NS.Order)"))
                    .with_property(EdmProperty::navigation("Manager", "NS.Employee"))
                    .with_property(
                        EdmProperty::navigation("Reviews", "Collection(NS.Review)").contained(),
                    ),
            )
            .with_type(EdmStructuredType::entity("NS.VipCustomer").with_base("NS.Customer"))
            .with_type(EdmStructuredType::entity("NS.PremiumCustomer").with_base("NS.Customer"))
            .with_type(
                EdmStructuredType::entity("NS.Order")
                    .with_key(["Id"])
                    .with_property(EdmProperty::structural("Id", "Edm.Int32"))
                    .with_property(EdmProperty::structural("Amount", "Edm.Decimal")),
            )
            .with_type(
                EdmStructuredType::entity("NS.Employee")
                    .with_key(["Id"])
                    .with_property(EdmProperty::structural("Id", "Edm.Int32")),
            )
            .with_type(
                EdmStructuredType::entity("NS.Review")
                    .with_key(["Id"])
                    .with_property(EdmProperty::structural("Id", "Edm.Int32")),
            )
            .with_type(
                EdmStructuredType::complex("NS.Address")
                    .with_property(EdmProperty::structural("City", "Edm.String")),
            )
            .with_source(
                NavigationSource::entity_set("Customers", "NS.Customer")
                    .with_binding("Orders", "Orders")
                    .with_binding("Manager", "Employees"),
            )
            .with_source(NavigationSource::entity_set("Orders", "NS.Order"))
            .with_source(NavigationSource::entity_set("Employees", "NS.Employee")),
    )
}

/// Back-end that records hook names and optionally fails at one of them.
pub struct RecordingBackend {
    log: HookLog,
    fail_on: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> (Box<Self>, HookLog) {
        let log: HookLog = Arc::default();
        (
            Box::new(Self {
                log: Arc::clone(&log),
                fail_on: None,
            }),
            log,
        )
    }

    pub fn failing_at(hook: &str) -> (Box<Self>, HookLog) {
        let log: HookLog = Arc::default();
        (
            Box::new(Self {
                log: Arc::clone(&log),
                fail_on: Some(hook.to_owned()),
            }),
            log,
        )
    }

    fn record(&mut self, hook: &str) -> WriteResult<()> {
        self.log.lock().unwrap().push(hook.to_owned());
        if self.fail_on.as_deref() == Some(hook) {
            Err(constructors::backend("injected failure"))
        } else {
            Ok(())
        }
    }
}

impl FormatBackend for RecordingBackend {
    fn start_payload(&mut self) -> WriteResult<()> {
        self.record("start_payload")
    }
    fn end_payload(&mut self) -> WriteResult<()> {
        self.record("end_payload")
    }
    fn start_resource(&mut self, _ctx: WriteContext<'_>, _r: &Resource) -> WriteResult<()> {
        self.record("start_resource")
    }
    fn end_resource(&mut self, _ctx: WriteContext<'_>, _r: &Resource) -> WriteResult<()> {
        self.record("end_resource")
    }
    fn start_resource_set(&mut self, _ctx: WriteContext<'_>, _s: &ResourceSet) -> WriteResult<()> {
        self.record("start_resource_set")
    }
    fn end_resource_set(&mut self, _ctx: WriteContext<'_>, _s: &ResourceSet) -> WriteResult<()> {
        self.record("end_resource_set")
    }
    fn start_delta_resource_set(
        &mut self,
        _ctx: WriteContext<'_>,
        _s: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.record("start_delta_resource_set")
    }
    fn end_delta_resource_set(
        &mut self,
        _ctx: WriteContext<'_>,
        _s: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.record("end_delta_resource_set")
    }
    fn start_deleted_resource(
        &mut self,
        _ctx: WriteContext<'_>,
        _r: &DeletedResource,
    ) -> WriteResult<()> {
        self.record("start_deleted_resource")
    }
    fn end_deleted_resource(
        &mut self,
        _ctx: WriteContext<'_>,
        _r: &DeletedResource,
    ) -> WriteResult<()> {
        self.record("end_deleted_resource")
    }
    fn start_property(&mut self, _ctx: WriteContext<'_>, _p: &PropertyInfo) -> WriteResult<()> {
        self.record("start_property")
    }
    fn end_property(&mut self, _ctx: WriteContext<'_>, _p: &PropertyInfo) -> WriteResult<()> {
        self.record("end_property")
    }
    fn start_nested_resource_info_with_content(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.record("start_nested_resource_info_with_content")
    }
    fn end_nested_resource_info_with_content(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.record("end_nested_resource_info_with_content")
    }
    fn write_deferred_nested_resource_info(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.record("write_deferred_nested_resource_info")
    }
    fn write_entity_reference_in_navigation_link_content(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &NestedResourceInfo,
        _r: &EntityReferenceLink,
    ) -> WriteResult<()> {
        self.record("write_entity_reference")
    }
    fn write_primitive_value(&mut self, _ctx: WriteContext<'_>, _v: &Value) -> WriteResult<()> {
        self.record("write_primitive_value")
    }
    fn write_delta_link(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &DeltaLink,
        deleted: bool,
    ) -> WriteResult<()> {
        if deleted {
            self.record("write_delta_deleted_link")
        } else {
            self.record("write_delta_link")
        }
    }
    fn start_binary_stream(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.record("start_binary_stream")
    }
    fn binary_chunk(&mut self, _chunk: &[u8]) -> WriteResult<()> {
        self.record("binary_chunk")
    }
    fn end_binary_stream(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.record("end_binary_stream")
    }
    fn start_text_writer(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.record("start_text_writer")
    }
    fn text_chunk(&mut self, _chunk: &str) -> WriteResult<()> {
        self.record("text_chunk")
    }
    fn end_text_writer(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.record("end_text_writer")
    }
    fn flush(&mut self) -> WriteResult<()> {
        self.record("flush")
    }
}

/// Async twin of [`RecordingBackend`]; yields before each hook to exercise
/// real suspension points.
pub struct AsyncRecordingBackend {
    log: HookLog,
    fail_on: Option<String>,
}

impl AsyncRecordingBackend {
    pub fn new() -> (Box<Self>, HookLog) {
        let log: HookLog = Arc::default();
        (
            Box::new(Self {
                log: Arc::clone(&log),
                fail_on: None,
            }),
            log,
        )
    }

    pub fn failing_at(hook: &str) -> (Box<Self>, HookLog) {
        let log: HookLog = Arc::default();
        (
            Box::new(Self {
                log: Arc::clone(&log),
                fail_on: Some(hook.to_owned()),
            }),
            log,
        )
    }

    async fn record(&mut self, hook: &str) -> WriteResult<()> {
        tokio::task::yield_now().await;
        self.log.lock().unwrap().push(hook.to_owned());
        if self.fail_on.as_deref() == Some(hook) {
            Err(constructors::backend("injected failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AsyncFormatBackend for AsyncRecordingBackend {
    async fn start_payload(&mut self) -> WriteResult<()> {
        self.record("start_payload").await
    }
    async fn end_payload(&mut self) -> WriteResult<()> {
        self.record("end_payload").await
    }
    async fn start_resource(&mut self, _ctx: WriteContext<'_>, _r: &Resource) -> WriteResult<()> {
        self.record("start_resource").await
    }
    async fn end_resource(&mut self, _ctx: WriteContext<'_>, _r: &Resource) -> WriteResult<()> {
        self.record("end_resource").await
    }
    async fn start_resource_set(
        &mut self,
        _ctx: WriteContext<'_>,
        _s: &ResourceSet,
    ) -> WriteResult<()> {
        self.record("start_resource_set").await
    }
    async fn end_resource_set(
        &mut self,
        _ctx: WriteContext<'_>,
        _s: &ResourceSet,
    ) -> WriteResult<()> {
        self.record("end_resource_set").await
    }
    async fn start_delta_resource_set(
        &mut self,
        _ctx: WriteContext<'_>,
        _s: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.record("start_delta_resource_set").await
    }
    async fn end_delta_resource_set(
        &mut self,
        _ctx: WriteContext<'_>,
        _s: &DeltaResourceSet,
    ) -> WriteResult<()> {
        self.record("end_delta_resource_set").await
    }
    async fn start_deleted_resource(
        &mut self,
        _ctx: WriteContext<'_>,
        _r: &DeletedResource,
    ) -> WriteResult<()> {
        self.record("start_deleted_resource").await
    }
    async fn end_deleted_resource(
        &mut self,
        _ctx: WriteContext<'_>,
        _r: &DeletedResource,
    ) -> WriteResult<()> {
        self.record("end_deleted_resource").await
    }
    async fn start_property(
        &mut self,
        _ctx: WriteContext<'_>,
        _p: &PropertyInfo,
    ) -> WriteResult<()> {
        self.record("start_property").await
    }
    async fn end_property(
        &mut self,
        _ctx: WriteContext<'_>,
        _p: &PropertyInfo,
    ) -> WriteResult<()> {
        self.record("end_property").await
    }
    async fn start_nested_resource_info_with_content(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.record("start_nested_resource_info_with_content").await
    }
    async fn end_nested_resource_info_with_content(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.record("end_nested_resource_info_with_content").await
    }
    async fn write_deferred_nested_resource_info(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &NestedResourceInfo,
    ) -> WriteResult<()> {
        self.record("write_deferred_nested_resource_info").await
    }
    async fn write_entity_reference_in_navigation_link_content(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &NestedResourceInfo,
        _r: &EntityReferenceLink,
    ) -> WriteResult<()> {
        self.record("write_entity_reference").await
    }
    async fn write_primitive_value(
        &mut self,
        _ctx: WriteContext<'_>,
        _v: &Value,
    ) -> WriteResult<()> {
        self.record("write_primitive_value").await
    }
    async fn write_delta_link(
        &mut self,
        _ctx: WriteContext<'_>,
        _l: &DeltaLink,
        deleted: bool,
    ) -> WriteResult<()> {
        if deleted {
            self.record("write_delta_deleted_link").await
        } else {
            self.record("write_delta_link").await
        }
    }
    async fn start_binary_stream(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.record("start_binary_stream").await
    }
    async fn binary_chunk(&mut self, _chunk: &[u8]) -> WriteResult<()> {
        self.record("binary_chunk").await
    }
    async fn end_binary_stream(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.record("end_binary_stream").await
    }
    async fn start_text_writer(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.record("start_text_writer").await
    }
    async fn text_chunk(&mut self, _chunk: &str) -> WriteResult<()> {
        self.record("text_chunk").await
    }
    async fn end_text_writer(&mut self, _ctx: WriteContext<'_>) -> WriteResult<()> {
        self.record("end_text_writer").await
    }
    async fn flush(&mut self) -> WriteResult<()> {
        self.record("flush").await
    }
}

/// Observer counting completion and error callbacks.
pub struct CountingObserver {
    pub completed: Arc<AtomicUsize>,
    pub errors: Arc<AtomicUsize>,
}

impl CountingObserver {
    pub fn new() -> (Box<Self>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let completed = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Self {
                completed: Arc::clone(&completed),
                errors: Arc::clone(&errors),
            }),
            completed,
            errors,
        )
    }
}

impl WriterObserver for CountingObserver {
    fn on_completed(&mut self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exception(&mut self, _error: &WriteError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

/// Snapshot of the hook log.
pub fn logged(log: &HookLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
