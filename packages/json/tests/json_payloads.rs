//! End-to-end JSON payloads: the writer engine driving the JSON back-end
//! into a shared in-memory sink, asserting the exact emitted text.

use std::io;
use std::io::Write as _;
use std::sync::{Arc, Mutex};

use serde_json::json;
use url::Url;

use odwire_core::edm::{EdmModel, EdmProperty, EdmStructuredType, NavigationSource};
use odwire_core::payload::{
    DeletedResource, DeltaLink, DeltaResourceSet, EntityReferenceLink, NestedResourceInfo,
    PropertyInfo, Resource, ResourceSet,
};
use odwire_core::writer::{ODataWriter, WriterDescriptor, WriterSettings};
use odwire_json::{JsonFormatBackend, JsonWriterOptions};

/// Sink shared between the back-end and the test assertions.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn model() -> Arc<EdmModel> {
    Arc::new(
        EdmModel::new("Container")
            .with_type(
                EdmStructuredType::entity("NS.Customer")
                    .with_key(["Id"])
                    .with_property(EdmProperty::structural("Id", "Edm.Int32"))
                    .with_property(EdmProperty::structural("Name", "Edm.String"))
                    .with_property(EdmProperty::navigation("Orders", "Collection(NS.Order)"))
                    .with_property(EdmProperty::navigation("Manager", "NS.Employee")),
            )
            .with_type(EdmStructuredType::entity("NS.VipCustomer").with_base("NS.Customer"))
            .with_type(
                EdmStructuredType::entity("NS.Order")
                    .with_key(["Id"])
                    .with_property(EdmProperty::structural("Id", "Edm.Int32")),
            )
            .with_type(
                EdmStructuredType::entity("NS.Employee")
                    .with_key(["Id"])
                    .with_property(EdmProperty::structural("Id", "Edm.Int32")),
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

fn writer_with(
    descriptor: WriterDescriptor,
    settings: WriterSettings,
    options: JsonWriterOptions,
) -> (ODataWriter, SharedBuf) {
    let sink = SharedBuf::default();
    let backend = JsonFormatBackend::new(Box::new(sink.clone()), options);
    (
        ODataWriter::new(model(), settings, descriptor, Box::new(backend)),
        sink,
    )
}

fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

#[test]
fn resource_set_payload_with_context() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource_set(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new(),
    );

    writer.start_resource_set(ResourceSet::new()).unwrap();
    writer
        .start_resource(
            Resource::new()
                .with_property("Id", json!(1))
                .with_property("Name", json!("A")),
        )
        .unwrap();
    writer.end().unwrap();
    writer
        .start_resource(
            Resource::new()
                .with_property("Id", json!(2))
                .with_property("Name", json!("B")),
        )
        .unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        r#"{"@odata.context":"$metadata#Customers","value":[{"Id":1,"Name":"A"},{"Id":2,"Name":"B"}]}"#
    );
}

#[test]
fn expanded_navigation_renders_inline() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new(),
    );

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer
        .start_nested_resource_info(NestedResourceInfo::named("Orders").collection(true))
        .unwrap();
    writer.start_resource_set(ResourceSet::new()).unwrap();
    writer
        .start_resource(Resource::new().with_property("Id", json!(10)))
        .unwrap();
    writer.end().unwrap();
    writer.end().unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        r#"{"@odata.context":"$metadata#Customers/$entity","Id":1,"Orders":[{"Id":10}]}"#
    );
}

#[test]
fn type_casts_emit_the_type_annotation() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource_set(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new().without_context(),
    );

    writer.start_resource_set(ResourceSet::new()).unwrap();
    writer
        .start_resource(
            Resource::new()
                .with_type("NS.VipCustomer")
                .with_property("Id", json!(1)),
        )
        .unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        r##"{"value":[{"@odata.type":"#NS.VipCustomer","Id":1}]}"##
    );
}

#[test]
fn delta_payload_with_removed_entry_and_link() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::delta_resource_set(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new(),
    );

    writer
        .start_delta_resource_set(DeltaResourceSet::new())
        .unwrap();
    writer
        .start_deleted_resource(
            DeletedResource::new().with_id(url("http://host/Customers(1)")),
        )
        .unwrap();
    writer.end().unwrap();
    writer
        .write_delta_link(DeltaLink::new(
            url("http://host/Customers(1)"),
            "Orders",
            url("http://host/Orders(10)"),
        ))
        .unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        concat!(
            r#"{"@odata.context":"$metadata#Customers/$delta","value":["#,
            r#"{"@removed":{"reason":"deleted"},"@odata.id":"http://host/Customers(1)"},"#,
            r#"{"@odata.context":"$metadata#Customers/$link","source":"http://host/Customers(1)","relationship":"Orders","target":"http://host/Orders(10)"}"#,
            r#"]}"#
        )
    );
}

#[test]
fn property_value_streams_into_the_member() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new().without_context(),
    );

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer.start_property(PropertyInfo::named("Name")).unwrap();
    writer.write_primitive(json!("A")).unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(sink.contents(), r#"{"Id":1,"Name":"A"}"#);
}

#[test]
fn binary_streams_render_as_base64() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new().without_context(),
    );

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer.start_property(PropertyInfo::named("Photo")).unwrap();
    let mut stream = writer.create_binary_write_stream().unwrap();
    stream.write_all(&[1, 2, 3, 4]).unwrap();
    stream.close().unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(sink.contents(), r#"{"Id":1,"Photo":"AQIDBA=="}"#);
}

#[test]
fn text_writer_renders_fragments_as_one_string() {
    use std::fmt::Write as _;

    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new().without_context(),
    );

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer.start_property(PropertyInfo::named("Bio")).unwrap();
    let mut text = writer.create_text_writer().unwrap();
    write!(text, "line one\n").unwrap();
    write!(text, "and \"two\"").unwrap();
    text.close().unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        "{\"Id\":1,\"Bio\":\"line one\\nand \\\"two\\\"\"}"
    );
}

#[test]
fn deferred_links_render_the_navigation_annotation() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new().without_context(),
    );

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer
        .start_nested_resource_info(
            NestedResourceInfo::named("Orders")
                .collection(true)
                .with_url(url("http://host/Customers(1)/Orders")),
        )
        .unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        r#"{"Id":1,"Orders@odata.navigationLink":"http://host/Customers(1)/Orders"}"#
    );
}

#[test]
fn entity_reference_binds_render_as_id_objects() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource(Some("Customers")),
        WriterSettings::request(),
        JsonWriterOptions::new().without_context(),
    );

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer
        .start_nested_resource_info(NestedResourceInfo::named("Orders").collection(true))
        .unwrap();
    writer
        .write_entity_reference_link(EntityReferenceLink::new(url("http://host/Orders(1)")))
        .unwrap();
    writer
        .write_entity_reference_link(EntityReferenceLink::new(url("http://host/Orders(2)")))
        .unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        concat!(
            r#"{"Id":1,"Orders":[{"@odata.id":"http://host/Orders(1)"},"#,
            r#"{"@odata.id":"http://host/Orders(2)"}]}"#
        )
    );
}

#[test]
fn null_resources_render_as_null() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new().without_context(),
    );

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer
        .start_nested_resource_info(NestedResourceInfo::named("Manager").collection(false))
        .unwrap();
    writer.start_resource(Resource::null()).unwrap();
    writer.end().unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(sink.contents(), r#"{"Id":1,"Manager":null}"#);
}

#[test]
fn untyped_sets_mix_values_and_records() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource_set(None).with_expected_type("Collection(Edm.Untyped)"),
        WriterSettings::response(),
        JsonWriterOptions::new().without_context(),
    );

    writer.start_resource_set(ResourceSet::new()).unwrap();
    writer.write_primitive(json!(42)).unwrap();
    writer.start_resource_set(ResourceSet::new()).unwrap();
    writer.write_primitive(json!("inner")).unwrap();
    writer.end().unwrap();
    writer.start_resource(Resource::new()).unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(sink.contents(), r#"{"value":[42,["inner"],{}]}"#);
}

#[test]
fn paging_links_follow_the_value_array() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource_set(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new().without_context(),
    );

    writer
        .start_resource_set(
            ResourceSet::new()
                .with_count(2)
                .with_next_page_link(url("http://host/Customers?$skip=2")),
        )
        .unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        r#"{"@odata.count":2,"value":[],"@odata.nextLink":"http://host/Customers?$skip=2"}"#
    );
}

#[test]
fn service_root_prefixes_the_context_url() {
    let (mut writer, sink) = writer_with(
        WriterDescriptor::resource_set(Some("Customers")),
        WriterSettings::response(),
        JsonWriterOptions::new().with_service_root(url("http://host/svc/")),
    );

    writer.start_resource_set(ResourceSet::new()).unwrap();
    writer.end().unwrap();

    assert_eq!(
        sink.contents(),
        r#"{"@odata.context":"http://host/svc/$metadata#Customers","value":[]}"#
    );
}
