//! OData path composition
//!
//! The writer keeps a path that mirrors the current scope chain:
//! `Customers(1)/NS.VipCustomer/Orders(10)`. Segments are appended as
//! scopes are pushed; entity-set and singleton navigations reset the path
//! to a new root.

use std::fmt;

use serde_json::Value;

/// One segment of an OData path
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    EntitySet(String),
    Singleton(String),
    /// Key predicate; single-part keys render positionally
    Key(Vec<(String, Value)>),
    /// Type cast to a derived type
    TypeCast(String),
    /// Navigation property traversal
    Navigation(String),
    /// Structural property traversal
    Property(String),
}

impl PathSegment {
    fn render(&self, out: &mut String) {
        match self {
            PathSegment::EntitySet(name)
            | PathSegment::Singleton(name)
            | PathSegment::TypeCast(name)
            | PathSegment::Navigation(name)
            | PathSegment::Property(name) => {
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str(name);
            }
            PathSegment::Key(parts) => {
                out.push('(');
                if let [(_, only)] = parts.as_slice() {
                    out.push_str(&render_key_value(only));
                } else {
                    for (index, (name, value)) in parts.iter().enumerate() {
                        if index > 0 {
                            out.push(',');
                        }
                        out.push_str(name);
                        out.push('=');
                        out.push_str(&render_key_value(value));
                    }
                }
                out.push(')');
            }
        }
    }
}

fn render_key_value(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{}'", text.replace('\'', "''")),
        other => other.to_string(),
    }
}

/// An OData path mirroring the scope chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ODataPath {
    segments: Vec<PathSegment>,
}

impl ODataPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_root(segment: PathSegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Replace the whole path with a new root segment.
    pub fn reset_to(&mut self, segment: PathSegment) {
        self.segments.clear();
        self.segments.push(segment);
    }

    /// Name of the root entity set or singleton, if the path has one.
    #[must_use]
    pub fn root_source(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::EntitySet(name) | PathSegment::Singleton(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ODataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for segment in &self.segments {
            segment.render(&mut out);
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_keys_casts_and_navigations() {
        let mut path = ODataPath::from_root(PathSegment::EntitySet("Customers".into()));
        path.push(PathSegment::Key(vec![("Id".into(), json!(1))]));
        path.push(PathSegment::Navigation("Orders".into()));
        path.push(PathSegment::Key(vec![("Id".into(), json!(10))]));
        assert_eq!(path.to_string(), "Customers(1)/Orders(10)");

        let mut cast = ODataPath::from_root(PathSegment::EntitySet("People".into()));
        cast.push(PathSegment::Key(vec![("Id".into(), json!("ab'c"))]));
        cast.push(PathSegment::TypeCast("NS.Employee".into()));
        assert_eq!(cast.to_string(), "People('ab''c')/NS.Employee");
    }

    #[test]
    fn composite_keys_render_named_parts() {
        let mut path = ODataPath::from_root(PathSegment::EntitySet("Rates".into()));
        path.push(PathSegment::Key(vec![
            ("From".into(), json!("EUR")),
            ("To".into(), json!("USD")),
        ]));
        assert_eq!(path.to_string(), "Rates(From='EUR',To='USD')");
    }

    #[test]
    fn reset_discards_prior_segments() {
        let mut path = ODataPath::from_root(PathSegment::EntitySet("Customers".into()));
        path.push(PathSegment::Key(vec![("Id".into(), json!(1))]));
        path.reset_to(PathSegment::EntitySet("Orders".into()));
        assert_eq!(path.to_string(), "Orders");
        assert_eq!(path.root_source(), Some("Orders"));
    }
}
