//! Writer states
//!
//! Every scope on the stack carries one of these states; the transition
//! table in the sibling module decides which moves are legal.

use std::fmt;

/// State of one writer scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing written yet; bottom of the stack
    Start,
    ResourceSet,
    DeltaResourceSet,
    Resource,
    DeletedResource,
    /// A nested link with no content written yet (deferred if ended here)
    NestedResourceInfo,
    /// A nested link whose content has started
    NestedResourceInfoWithContent,
    /// A primitive value being written; balanced within one call
    Primitive,
    Property,
    /// An open binary sub-writer
    Stream,
    /// An open text sub-writer
    TextValue,
    DeltaLink,
    DeltaDeletedLink,
    /// The payload has been fully written
    Completed,
    /// A failure occurred; only further errors are accepted
    Error,
}

impl WriterState {
    /// True for states that accept no further transitions at all.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, WriterState::Completed | WriterState::Error)
    }
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriterState::Start => "Start",
            WriterState::ResourceSet => "ResourceSet",
            WriterState::DeltaResourceSet => "DeltaResourceSet",
            WriterState::Resource => "Resource",
            WriterState::DeletedResource => "DeletedResource",
            WriterState::NestedResourceInfo => "NestedResourceInfo",
            WriterState::NestedResourceInfoWithContent => "NestedResourceInfoWithContent",
            WriterState::Primitive => "Primitive",
            WriterState::Property => "Property",
            WriterState::Stream => "Stream",
            WriterState::TextValue => "TextValue",
            WriterState::DeltaLink => "DeltaLink",
            WriterState::DeltaDeletedLink => "DeltaDeletedLink",
            WriterState::Completed => "Completed",
            WriterState::Error => "Error",
        };
        f.write_str(name)
    }
}
