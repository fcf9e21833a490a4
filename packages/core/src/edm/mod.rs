//! Entity data model surface
//!
//! The narrow, read-only schema interface the writer engine consumes:
//! structured types, properties, navigation sources, and the lookups the
//! type resolver needs. The model is immutable once built and can be shared
//! across writers.

mod model;
mod types;

pub use model::{EdmModel, NavigationBinding, NavigationSource, NavigationSourceKind};
pub use types::{EdmProperty, EdmStructuredType, EdmTypeRef, PropertyKind, UNTYPED};
