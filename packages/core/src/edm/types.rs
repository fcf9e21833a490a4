//! EDM type references and structured types
//!
//! The engine consumes a read-only entity data model. Types are referenced
//! by qualified name; `EdmTypeRef` is the parsed form of a type name,
//! including `Collection(...)` wrappers and the untyped placeholder.

use serde::{Deserialize, Serialize};

/// Qualified name of the untyped placeholder type
pub const UNTYPED: &str = "Edm.Untyped";

/// Parsed reference to an EDM type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdmTypeRef {
    /// Built-in primitive type, e.g. `Edm.String`
    Primitive(String),
    /// Entity or complex type by qualified name
    Structured(String),
    /// Collection of an element type
    Collection(Box<EdmTypeRef>),
    /// `Edm.Untyped` - anything goes
    Untyped,
}

impl EdmTypeRef {
    /// Parse a type name, unwrapping any `Collection(...)` wrapper.
    ///
    /// Whether a bare name is primitive or structured is decided by the
    /// `Edm.` namespace prefix; model-level lookups refine this.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        if let Some(inner) = trimmed
            .strip_prefix("Collection(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return EdmTypeRef::Collection(Box::new(EdmTypeRef::parse(inner)));
        }
        if trimmed == UNTYPED {
            return EdmTypeRef::Untyped;
        }
        if trimmed.starts_with("Edm.") {
            return EdmTypeRef::Primitive(trimmed.to_owned());
        }
        EdmTypeRef::Structured(trimmed.to_owned())
    }

    /// Element type of a collection; `None` for non-collections.
    #[must_use]
    pub fn element(&self) -> Option<&EdmTypeRef> {
        match self {
            EdmTypeRef::Collection(inner) => Some(inner),
            _ => None,
        }
    }

    /// The type itself for single-valued refs, the element for collections.
    #[must_use]
    pub fn single_level(&self) -> &EdmTypeRef {
        match self {
            EdmTypeRef::Collection(inner) => inner.single_level(),
            other => other,
        }
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, EdmTypeRef::Collection(_))
    }

    /// True when the ref (or its element) is `Edm.Untyped`.
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        matches!(self.single_level(), EdmTypeRef::Untyped)
    }

    /// Qualified name of a structured ref (single level), if any.
    #[must_use]
    pub fn structured_name(&self) -> Option<&str> {
        match self.single_level() {
            EdmTypeRef::Structured(name) => Some(name),
            _ => None,
        }
    }

    /// Render the reference back to its type-name form.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self {
            EdmTypeRef::Primitive(name) | EdmTypeRef::Structured(name) => name.clone(),
            EdmTypeRef::Collection(inner) => format!("Collection({})", inner.qualified_name()),
            EdmTypeRef::Untyped => UNTYPED.to_owned(),
        }
    }
}

/// Whether a property is structural (data) or a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Structural,
    Navigation,
}

/// A declared property on a structured type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdmProperty {
    pub name: String,
    pub property_type: EdmTypeRef,
    pub kind: PropertyKind,
    pub nullable: bool,
    /// Navigation properties only: target lives inside the parent
    pub contains_target: bool,
    /// Permitted sub-type names at this position; empty means unconstrained
    pub derived_type_constraints: Vec<String>,
}

impl EdmProperty {
    #[must_use]
    pub fn structural(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_owned(),
            property_type: EdmTypeRef::parse(type_name),
            kind: PropertyKind::Structural,
            nullable: true,
            contains_target: false,
            derived_type_constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn navigation(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_owned(),
            property_type: EdmTypeRef::parse(type_name),
            kind: PropertyKind::Navigation,
            nullable: true,
            contains_target: false,
            derived_type_constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn contained(mut self) -> Self {
        self.contains_target = true;
        self
    }

    #[must_use]
    pub fn with_derived_constraints<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derived_type_constraints = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.property_type.is_collection()
    }
}

/// An entity or complex type declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdmStructuredType {
    /// Qualified name, e.g. `NS.Customer`
    pub name: String,
    pub base_type: Option<String>,
    pub is_entity: bool,
    pub is_open: bool,
    /// Key property names; entity types only
    pub key: Vec<String>,
    pub properties: Vec<EdmProperty>,
}

impl EdmStructuredType {
    #[must_use]
    pub fn entity(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            base_type: None,
            is_entity: true,
            is_open: false,
            key: Vec::new(),
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn complex(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            base_type: None,
            is_entity: false,
            is_open: false,
            key: Vec::new(),
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: &str) -> Self {
        self.base_type = Some(base.to_owned());
        self
    }

    #[must_use]
    pub fn open(mut self) -> Self {
        self.is_open = true;
        self
    }

    #[must_use]
    pub fn with_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_property(mut self, property: EdmProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Direct property lookup; base types are resolved at the model level.
    #[must_use]
    pub fn declared_property(&self, name: &str) -> Option<&EdmProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}
