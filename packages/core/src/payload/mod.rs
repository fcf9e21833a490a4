//! Payload items
//!
//! Everything a caller can push into the writer. Primitive values are
//! `serde_json::Value`; absolute references are `url::Url`.

mod items;
mod serialization_info;

pub use items::{
    DeletedEntryReason, DeletedResource, DeltaLink, DeltaResourceSet, EntityReferenceLink,
    NestedResourceInfo, PayloadItem, PropertyInfo, Resource, ResourceProperty, ResourceSet,
};
pub use serialization_info::SerializationInfo;
