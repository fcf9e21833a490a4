//! Payload item types
//!
//! The data records callers hand to the writer: resources, resource sets,
//! delta items, nested resource infos, and reference links. These carry no
//! behavior; the driver validates them and the format back-end renders
//! them.

use serde_json::Value;
use url::Url;

use super::serialization_info::SerializationInfo;

/// A named primitive property value on a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceProperty {
    pub name: String,
    pub value: Value,
}

/// A structured record (entity or complex value)
#[derive(Debug, Clone, Default)]
pub struct Resource {
    /// Concrete type name; resolved against the model when present
    pub type_name: Option<String>,
    pub id: Option<Url>,
    pub properties: Vec<ResourceProperty>,
    pub serialization_info: Option<SerializationInfo>,
    /// A null resource - legal only inside a non-collection nested link
    pub is_null: bool,
}

impl Resource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The null resource; written as a literal null value.
    #[must_use]
    pub fn null() -> Self {
        Self {
            is_null: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, name: &str) -> Self {
        self.type_name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: Url) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.push(ResourceProperty {
            name: name.to_owned(),
            value,
        });
        self
    }

    #[must_use]
    pub fn with_serialization_info(mut self, info: SerializationInfo) -> Self {
        self.serialization_info = Some(info);
        self
    }

    /// Value of a named property, if present.
    #[must_use]
    pub fn property_value(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

/// An ordered sequence of resources
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    /// `Collection(...)` type name of the set, when declared by the caller
    pub type_name: Option<String>,
    pub count: Option<i64>,
    pub next_page_link: Option<Url>,
    pub delta_link: Option<Url>,
    pub serialization_info: Option<SerializationInfo>,
}

impl ResourceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, name: &str) -> Self {
        self.type_name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_next_page_link(mut self, link: Url) -> Self {
        self.next_page_link = Some(link);
        self
    }

    #[must_use]
    pub fn with_delta_link(mut self, link: Url) -> Self {
        self.delta_link = Some(link);
        self
    }

    #[must_use]
    pub fn with_serialization_info(mut self, info: SerializationInfo) -> Self {
        self.serialization_info = Some(info);
        self
    }
}

/// A resource set representing a change feed
#[derive(Debug, Clone, Default)]
pub struct DeltaResourceSet {
    pub type_name: Option<String>,
    pub count: Option<i64>,
    pub next_page_link: Option<Url>,
    pub delta_link: Option<Url>,
    pub serialization_info: Option<SerializationInfo>,
}

impl DeltaResourceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_next_page_link(mut self, link: Url) -> Self {
        self.next_page_link = Some(link);
        self
    }

    #[must_use]
    pub fn with_delta_link(mut self, link: Url) -> Self {
        self.delta_link = Some(link);
        self
    }

    #[must_use]
    pub fn with_serialization_info(mut self, info: SerializationInfo) -> Self {
        self.serialization_info = Some(info);
        self
    }
}

/// Why a resource appears as deleted in a delta payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletedEntryReason {
    #[default]
    Deleted,
    Changed,
}

/// A deleted resource inside a delta resource set
#[derive(Debug, Clone, Default)]
pub struct DeletedResource {
    pub id: Option<Url>,
    pub reason: DeletedEntryReason,
    pub type_name: Option<String>,
    pub properties: Vec<ResourceProperty>,
    pub serialization_info: Option<SerializationInfo>,
}

impl DeletedResource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(mut self, id: Url) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: DeletedEntryReason) -> Self {
        self.reason = reason;
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.push(ResourceProperty {
            name: name.to_owned(),
            value,
        });
        self
    }

    #[must_use]
    pub fn property_value(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

/// A named link from a resource to related content
#[derive(Debug, Clone)]
pub struct NestedResourceInfo {
    pub name: String,
    /// Collection cardinality when the caller knows it; otherwise resolved
    /// from the declared property
    pub is_collection: Option<bool>,
    pub url: Option<Url>,
}

impl NestedResourceInfo {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            is_collection: None,
            url: None,
        }
    }

    #[must_use]
    pub fn collection(mut self, is_collection: bool) -> Self {
        self.is_collection = Some(is_collection);
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }
}

/// A property announced ahead of its value
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    pub name: String,
}

impl PropertyInfo {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

/// A link added or removed in a delta payload
///
/// Added and deleted link entries share this shape; only the surrounding
/// scope state distinguishes them.
#[derive(Debug, Clone)]
pub struct DeltaLink {
    pub source: Url,
    pub relationship: String,
    pub target: Url,
}

impl DeltaLink {
    #[must_use]
    pub fn new(source: Url, relationship: &str, target: Url) -> Self {
        Self {
            source,
            relationship: relationship.to_owned(),
            target,
        }
    }
}

/// A reference to an existing entity, written inside a nested link
#[derive(Debug, Clone)]
pub struct EntityReferenceLink {
    pub url: Url,
}

impl EntityReferenceLink {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

/// The item a scope was opened for
#[derive(Debug, Clone)]
pub enum PayloadItem {
    Resource(Resource),
    ResourceSet(ResourceSet),
    DeltaResourceSet(DeltaResourceSet),
    DeletedResource(DeletedResource),
    NestedResourceInfo(NestedResourceInfo),
    Property(PropertyInfo),
    Primitive(Value),
    DeltaLink(DeltaLink),
    DeltaDeletedLink(DeltaLink),
}
