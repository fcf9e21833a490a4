//! Binary and text sub-writers: chunk forwarding, disposal discipline, and
//! the interaction with property value tracking.

mod common;

use std::fmt::Write as _;
use std::io::Write as _;

use serde_json::json;

use odwire_core::error::WriteErrorKind;
use odwire_core::payload::{PropertyInfo, Resource};
use odwire_core::writer::{ODataWriter, WriterDescriptor, WriterSettings, WriterState};

use common::{logged, test_model, RecordingBackend};

fn resource_writer(backend: Box<RecordingBackend>) -> ODataWriter {
    ODataWriter::new(
        test_model(),
        WriterSettings::response(),
        WriterDescriptor::resource(Some("Customers")),
        backend,
    )
}

#[test]
fn binary_stream_forwards_chunks_and_closes() {
    let (backend, log) = RecordingBackend::new();
    let mut writer = resource_writer(backend);

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer.start_property(PropertyInfo::named("Photo")).unwrap();
    let mut stream = writer.create_binary_write_stream().unwrap();
    stream.write_all(&[1, 2, 3]).unwrap();
    stream.write_all(&[4]).unwrap();
    stream.close().unwrap();

    writer.end().unwrap();
    writer.end().unwrap();

    assert_eq!(
        logged(&log),
        vec![
            "start_payload",
            "start_resource",
            "start_property",
            "start_binary_stream",
            "binary_chunk",
            "binary_chunk",
            "end_binary_stream",
            "end_property",
            "end_resource",
            "end_payload",
            "flush",
        ]
    );
    assert_eq!(writer.current_state(), WriterState::Completed);
}

#[test]
fn text_writer_forwards_fragments() {
    let (backend, log) = RecordingBackend::new();
    let mut writer = resource_writer(backend);

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer.start_property(PropertyInfo::named("Bio")).unwrap();
    let mut text = writer.create_text_writer().unwrap();
    write!(text, "hello ").unwrap();
    write!(text, "world").unwrap();
    text.close().unwrap();
    writer.end().unwrap();
    writer.end().unwrap();

    let hooks = logged(&log);
    assert!(hooks.contains(&"start_text_writer".to_owned()));
    assert_eq!(hooks.iter().filter(|h| h.as_str() == "text_chunk").count(), 2);
    assert!(hooks.contains(&"end_text_writer".to_owned()));
    assert_eq!(writer.current_state(), WriterState::Completed);
}

#[test]
fn dropping_a_sync_stream_disposes_it() {
    let (backend, log) = RecordingBackend::new();
    let mut writer = resource_writer(backend);

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer.start_property(PropertyInfo::named("Photo")).unwrap();
    {
        let mut stream = writer.create_binary_write_stream().unwrap();
        stream.write_all(&[1]).unwrap();
        // Dropped without close: best-effort disposal kicks in.
    }
    writer.end().unwrap();
    writer.end().unwrap();

    assert!(logged(&log).contains(&"end_binary_stream".to_owned()));
    assert_eq!(writer.current_state(), WriterState::Completed);
}

#[test]
fn stream_consumes_the_property_value_slot() {
    let (backend, _log) = RecordingBackend::new();
    let mut writer = resource_writer(backend);

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    writer.start_property(PropertyInfo::named("Photo")).unwrap();
    let stream = writer.create_binary_write_stream().unwrap();
    stream.close().unwrap();

    let err = writer.write_primitive(json!("again")).unwrap_err();
    assert_eq!(err.kind(), WriteErrorKind::PropertyValueAlreadyWritten);
}

#[test]
fn streams_outside_a_value_position_are_rejected() {
    let (backend, _log) = RecordingBackend::new();
    let mut writer = resource_writer(backend);

    writer
        .start_resource(Resource::new().with_property("Id", json!(1)))
        .unwrap();
    let err = writer.create_binary_write_stream().unwrap_err();
    assert_eq!(err.kind(), WriteErrorKind::InvalidStateTransition);
}

#[tokio::test]
async fn async_stream_left_open_blocks_end() {
    use common::AsyncRecordingBackend;

    let (backend, _log) = AsyncRecordingBackend::new();
    let mut writer = ODataWriter::new_async(
        test_model(),
        WriterSettings::response(),
        WriterDescriptor::resource(Some("Customers")),
        backend,
    );

    writer
        .start_resource_async(Resource::new().with_property("Id", json!(1)))
        .await
        .unwrap();
    writer
        .start_property_async(PropertyInfo::named("Photo"))
        .await
        .unwrap();
    {
        let mut stream = writer.create_binary_write_stream_async().await.unwrap();
        stream.write_all(&[1, 2]).await.unwrap();
        // Dropped without close: the scope stays open.
    }
    let err = writer.end_async().await.unwrap_err();
    assert_eq!(err.kind(), WriteErrorKind::StreamNotDisposed);
}

#[tokio::test]
async fn async_stream_closed_properly_completes() {
    use common::AsyncRecordingBackend;

    let (backend, log) = AsyncRecordingBackend::new();
    let mut writer = ODataWriter::new_async(
        test_model(),
        WriterSettings::response(),
        WriterDescriptor::resource(Some("Customers")),
        backend,
    );

    writer
        .start_resource_async(Resource::new().with_property("Id", json!(1)))
        .await
        .unwrap();
    writer
        .start_property_async(PropertyInfo::named("Bio"))
        .await
        .unwrap();
    let mut text = writer.create_text_writer_async().await.unwrap();
    text.write_str("streamed").await.unwrap();
    text.close().await.unwrap();
    writer.end_async().await.unwrap();
    writer.end_async().await.unwrap();

    assert!(logged(&log).contains(&"end_text_writer".to_owned()));
    assert_eq!(writer.current_state(), WriterState::Completed);
}
