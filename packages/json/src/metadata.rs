//! Context URL composition
//!
//! Builds the `@odata.context` values for top-level payloads from the
//! service root and the scope's navigation source. Without a configured
//! service root the fragment is emitted relative to `$metadata`.

use url::Url;

/// Builds context URLs for top-level payload items
#[derive(Debug, Clone, Default)]
pub struct ContextUrlBuilder {
    service_root: Option<Url>,
}

impl ContextUrlBuilder {
    #[must_use]
    pub fn new(service_root: Option<Url>) -> Self {
        Self { service_root }
    }

    fn with_fragment(&self, fragment: &str) -> String {
        match &self.service_root {
            Some(root) => {
                let base = root.as_str().trim_end_matches('/');
                format!("{base}/$metadata#{fragment}")
            }
            None => format!("$metadata#{fragment}"),
        }
    }

    #[must_use]
    pub fn for_resource_set(&self, source: &str) -> String {
        self.with_fragment(source)
    }

    #[must_use]
    pub fn for_resource(&self, source: &str) -> String {
        self.with_fragment(&format!("{source}/$entity"))
    }

    #[must_use]
    pub fn for_delta(&self, source: &str) -> String {
        self.with_fragment(&format!("{source}/$delta"))
    }

    #[must_use]
    pub fn for_delta_link(&self, source: &str, deleted: bool) -> String {
        let suffix = if deleted { "$deletedLink" } else { "$link" };
        self.with_fragment(&format!("{source}/{suffix}"))
    }
}
