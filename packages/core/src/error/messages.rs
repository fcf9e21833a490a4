//! Writer error message table
//!
//! All user-facing message text lives here so the engine itself carries no
//! baked-in strings. Constructors in the sibling module render these into
//! `WriteError` values.

use std::fmt::Display;

pub(crate) fn invalid_state_transition(from: impl Display, to: impl Display) -> String {
    format!("cannot transition from state '{from}' to state '{to}'")
}

pub(crate) fn invalid_transition_from_start(to: impl Display) -> String {
    format!("cannot transition from the start state to state '{to}'; the transition does not match what the writer was created to write")
}

pub(crate) fn invalid_transition_from_resource_set(to: impl Display) -> String {
    format!("cannot transition from a resource set to state '{to}'; only resources can be written into a typed resource set")
}

pub(crate) fn invalid_transition_from_expanded_link(to: impl Display) -> String {
    format!("cannot transition from an expanded nested resource info to state '{to}'")
}

pub(crate) fn invalid_transition_from_completed(to: impl Display) -> String {
    format!("cannot transition to state '{to}'; the payload has already been completed")
}

pub(crate) fn invalid_transition_from_error() -> String {
    "no further writing is possible; the writer entered the error state".to_owned()
}

pub(crate) fn invalid_transition_from_null_resource(to: impl Display) -> String {
    format!("cannot transition from a null resource to state '{to}'; a null resource has no content")
}

pub(crate) fn invalid_transition_from_v4_deleted_resource() -> String {
    "deleted resources cannot contain nested resource infos before OData 4.01".to_owned()
}

pub(crate) fn multiple_items_in_non_collection_nested_resource_info(link: &str) -> String {
    format!("multiple items were written into the non-collection nested resource info '{link}'")
}

pub(crate) fn entity_reference_link_without_nested_link() -> String {
    "an entity reference link can only be written inside a nested resource info".to_owned()
}

pub(crate) fn entity_reference_link_in_response() -> String {
    "entity reference links inside a nested resource info can only be written in request payloads".to_owned()
}

pub(crate) fn deferred_link_in_request(link: &str) -> String {
    format!("the nested resource info '{link}' was ended without content; deferred links are only allowed in response payloads")
}

pub(crate) fn property_value_already_written(property: &str) -> String {
    format!("the property '{property}' already has a value; a property can carry at most one value")
}

pub(crate) fn stream_not_disposed() -> String {
    "a binary or text sub-writer is still open; close it before continuing to write".to_owned()
}

pub(crate) fn write_end_in_invalid_state(state: impl Display) -> String {
    format!("'end' is not valid in state '{state}'")
}

pub(crate) fn duplicate_property_name(property: &str) -> String {
    format!("the property '{property}' was written more than once on the same resource")
}

pub(crate) fn incompatible_resource_types(actual: &str, expected: &str) -> String {
    format!("resource type '{actual}' is not compatible with the expected type '{expected}'")
}

pub(crate) fn derived_type_constraint_violated(actual: &str, position: &str) -> String {
    format!("resource type '{actual}' is not among the derived types allowed at '{position}'")
}

pub(crate) fn type_name_not_found(name: &str) -> String {
    format!("the type '{name}' was not found in the model")
}

pub(crate) fn count_in_request() -> String {
    "a count can only be written in response payloads".to_owned()
}

pub(crate) fn next_link_in_request() -> String {
    "a next page link can only be written in response payloads".to_owned()
}

pub(crate) fn delta_link_in_request() -> String {
    "a delta link can only be written in response payloads".to_owned()
}

pub(crate) fn delta_link_on_expanded_set() -> String {
    "a delta link is not allowed on an expanded resource set".to_owned()
}

pub(crate) fn delta_resource_without_id_or_key() -> String {
    "a top-level resource in a delta payload needs an id or values for all key properties".to_owned()
}

pub(crate) fn containment_without_path(navigation: &str) -> String {
    format!("the contained navigation property '{navigation}' requires a non-empty parent path")
}

pub(crate) fn max_nesting_depth_exceeded(max: usize) -> String {
    format!("resource nesting exceeds the configured maximum depth of {max}")
}

pub(crate) fn sync_call_on_async_writer() -> String {
    "a synchronous operation was called on a writer created for asynchronous writing".to_owned()
}

pub(crate) fn async_call_on_sync_writer() -> String {
    "an asynchronous operation was called on a writer created for synchronous writing".to_owned()
}

pub(crate) fn writer_disposed() -> String {
    "the writer has been disposed".to_owned()
}

pub(crate) fn backend(detail: impl Display) -> String {
    format!("the format back-end reported a failure: {detail}")
}

pub(crate) fn internal(detail: impl Display) -> String {
    format!("internal writer error: {detail}")
}
