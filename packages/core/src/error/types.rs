//! Writer error types
//!
//! Core error type for the payload writer. Every failure the engine can
//! surface is a `WriteError` carrying a `WriteErrorKind` and a message
//! rendered from the central message table.

use std::error::Error;
use std::fmt;

/// Classification of writer failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteErrorKind {
    /// Transition between writer states is not allowed
    InvalidStateTransition,
    /// Transition out of the initial state does not match the writer's intent
    InvalidTransitionFromStart,
    /// Resource set scopes only accept resources (unless untyped)
    InvalidTransitionFromResourceSet,
    /// Expanded nested resource info scope rejected the requested child
    InvalidTransitionFromExpandedLink,
    /// The payload has already been completed
    InvalidTransitionFromCompleted,
    /// The writer is in the error state
    InvalidTransitionFromError,
    /// A null resource cannot have children
    InvalidTransitionFromNullResource,
    /// Deleted resources cannot carry nested content before OData 4.01
    InvalidTransitionFromV4DeletedResource,

    /// More than one child written into a non-collection nested resource info
    MultipleItemsInNonCollectionNestedResourceInfo,
    /// Entity reference link written outside a nested resource info
    EntityReferenceLinkWithoutNestedLink,
    /// Nested resource info ended without content in a request payload
    DeferredLinkInRequest,
    /// The enclosing property already has a value
    PropertyValueAlreadyWritten,
    /// A binary or text sub-writer is still open
    StreamNotDisposed,
    /// `end` called in a state that has nothing to end
    WriteEndInInvalidState,
    /// The same property name was written twice on one resource
    DuplicatePropertyName,

    /// Resource type is not assignable to the declared element type
    IncompatibleResourceTypes,
    /// Resource type violates a derived-type constraint annotation
    DerivedTypeConstraintViolated,
    /// A named type could not be found in the model
    TypeNameNotFound,

    /// `count` is not allowed on request payloads
    CountInRequest,
    /// `next_page_link` is not allowed on request payloads
    NextLinkInRequest,
    /// `delta_link` is not allowed on request payloads
    DeltaLinkInRequest,
    /// `delta_link` is not allowed on expanded (nested) resource sets
    DeltaLinkOnExpandedSet,
    /// A delta resource needs an id or all key property values
    DeltaResourceWithoutIdOrKey,
    /// Contained navigation requires a non-empty parent path
    ContainmentWithoutPath,
    /// Resource nesting exceeds the configured maximum
    MaxNestingDepthExceeded,

    /// Synchronous call on a writer constructed for asynchronous use
    SyncCallOnAsyncWriter,
    /// Asynchronous call on a writer constructed for synchronous use
    AsyncCallOnSyncWriter,
    /// The writer has been disposed
    WriterDisposed,

    /// Format back-end failure (I/O or serialization)
    Backend,
    /// Engine invariant violation
    Internal,
}

/// Main writer error type
#[derive(Debug, Clone)]
pub struct WriteError {
    pub kind: WriteErrorKind,
    pub message: String,
}

impl WriteError {
    #[must_use]
    pub fn new(kind: WriteErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    #[must_use]
    pub fn kind(&self) -> WriteErrorKind {
        self.kind
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for WriteError {}

/// Result type for writer operations
pub type WriteResult<T> = Result<T, WriteError>;
