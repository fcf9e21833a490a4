//! Writer error constructors
//!
//! One helper per error kind; each renders its message from the central
//! message table and tags it with the matching `WriteErrorKind`.

use std::fmt::Display;

use super::messages;
use super::types::{WriteError, WriteErrorKind};

pub fn invalid_state_transition(from: impl Display, to: impl Display) -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidStateTransition,
        messages::invalid_state_transition(from, to),
    )
}

pub fn invalid_transition_from_start(to: impl Display) -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidTransitionFromStart,
        messages::invalid_transition_from_start(to),
    )
}

pub fn invalid_transition_from_resource_set(to: impl Display) -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidTransitionFromResourceSet,
        messages::invalid_transition_from_resource_set(to),
    )
}

pub fn invalid_transition_from_expanded_link(to: impl Display) -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidTransitionFromExpandedLink,
        messages::invalid_transition_from_expanded_link(to),
    )
}

pub fn invalid_transition_from_completed(to: impl Display) -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidTransitionFromCompleted,
        messages::invalid_transition_from_completed(to),
    )
}

pub fn invalid_transition_from_error() -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidTransitionFromError,
        messages::invalid_transition_from_error(),
    )
}

pub fn invalid_transition_from_null_resource(to: impl Display) -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidTransitionFromNullResource,
        messages::invalid_transition_from_null_resource(to),
    )
}

pub fn invalid_transition_from_v4_deleted_resource() -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidTransitionFromV4DeletedResource,
        messages::invalid_transition_from_v4_deleted_resource(),
    )
}

pub fn multiple_items_in_non_collection_nested_resource_info(link: &str) -> WriteError {
    WriteError::new(
        WriteErrorKind::MultipleItemsInNonCollectionNestedResourceInfo,
        messages::multiple_items_in_non_collection_nested_resource_info(link),
    )
}

pub fn entity_reference_link_without_nested_link() -> WriteError {
    WriteError::new(
        WriteErrorKind::EntityReferenceLinkWithoutNestedLink,
        messages::entity_reference_link_without_nested_link(),
    )
}

pub fn entity_reference_link_in_response() -> WriteError {
    WriteError::new(
        WriteErrorKind::InvalidStateTransition,
        messages::entity_reference_link_in_response(),
    )
}

pub fn deferred_link_in_request(link: &str) -> WriteError {
    WriteError::new(
        WriteErrorKind::DeferredLinkInRequest,
        messages::deferred_link_in_request(link),
    )
}

pub fn property_value_already_written(property: &str) -> WriteError {
    WriteError::new(
        WriteErrorKind::PropertyValueAlreadyWritten,
        messages::property_value_already_written(property),
    )
}

pub fn stream_not_disposed() -> WriteError {
    WriteError::new(WriteErrorKind::StreamNotDisposed, messages::stream_not_disposed())
}

pub fn write_end_in_invalid_state(state: impl Display) -> WriteError {
    WriteError::new(
        WriteErrorKind::WriteEndInInvalidState,
        messages::write_end_in_invalid_state(state),
    )
}

pub fn duplicate_property_name(property: &str) -> WriteError {
    WriteError::new(
        WriteErrorKind::DuplicatePropertyName,
        messages::duplicate_property_name(property),
    )
}

pub fn incompatible_resource_types(actual: &str, expected: &str) -> WriteError {
    WriteError::new(
        WriteErrorKind::IncompatibleResourceTypes,
        messages::incompatible_resource_types(actual, expected),
    )
}

pub fn derived_type_constraint_violated(actual: &str, position: &str) -> WriteError {
    WriteError::new(
        WriteErrorKind::DerivedTypeConstraintViolated,
        messages::derived_type_constraint_violated(actual, position),
    )
}

pub fn type_name_not_found(name: &str) -> WriteError {
    WriteError::new(WriteErrorKind::TypeNameNotFound, messages::type_name_not_found(name))
}

pub fn count_in_request() -> WriteError {
    WriteError::new(WriteErrorKind::CountInRequest, messages::count_in_request())
}

pub fn next_link_in_request() -> WriteError {
    WriteError::new(WriteErrorKind::NextLinkInRequest, messages::next_link_in_request())
}

pub fn delta_link_in_request() -> WriteError {
    WriteError::new(WriteErrorKind::DeltaLinkInRequest, messages::delta_link_in_request())
}

pub fn delta_link_on_expanded_set() -> WriteError {
    WriteError::new(
        WriteErrorKind::DeltaLinkOnExpandedSet,
        messages::delta_link_on_expanded_set(),
    )
}

pub fn delta_resource_without_id_or_key() -> WriteError {
    WriteError::new(
        WriteErrorKind::DeltaResourceWithoutIdOrKey,
        messages::delta_resource_without_id_or_key(),
    )
}

pub fn containment_without_path(navigation: &str) -> WriteError {
    WriteError::new(
        WriteErrorKind::ContainmentWithoutPath,
        messages::containment_without_path(navigation),
    )
}

pub fn max_nesting_depth_exceeded(max: usize) -> WriteError {
    WriteError::new(
        WriteErrorKind::MaxNestingDepthExceeded,
        messages::max_nesting_depth_exceeded(max),
    )
}

pub fn sync_call_on_async_writer() -> WriteError {
    WriteError::new(
        WriteErrorKind::SyncCallOnAsyncWriter,
        messages::sync_call_on_async_writer(),
    )
}

pub fn async_call_on_sync_writer() -> WriteError {
    WriteError::new(
        WriteErrorKind::AsyncCallOnSyncWriter,
        messages::async_call_on_sync_writer(),
    )
}

pub fn writer_disposed() -> WriteError {
    WriteError::new(WriteErrorKind::WriterDisposed, messages::writer_disposed())
}

pub fn backend(detail: impl Display) -> WriteError {
    WriteError::new(WriteErrorKind::Backend, messages::backend(detail))
}

pub fn internal(detail: impl Display) -> WriteError {
    WriteError::new(WriteErrorKind::Internal, messages::internal(detail))
}
