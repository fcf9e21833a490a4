//! Writer settings
//!
//! Immutable configuration fixed at construction: protocol version,
//! request/response direction, and the nesting budget. Settings are
//! shareable across writers.

use thiserror::Error;

/// Protocol version the payload targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ODataVersion {
    #[default]
    V4,
    V401,
}

/// Invalid writer settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("max_nesting_depth must be at least 1")]
    ZeroNestingDepth,
}

/// Configuration for one writer
#[derive(Debug, Clone)]
pub struct WriterSettings {
    pub version: ODataVersion,
    /// Request payloads reject response-only metadata (count, paging links)
    pub is_request: bool,
    /// Maximum resource nesting depth
    pub max_nesting_depth: usize,
    /// Accepted for compatibility and ignored; slated for removal
    pub writing_delta: bool,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            version: ODataVersion::default(),
            is_request: false,
            max_nesting_depth: 100,
            writing_delta: false,
        }
    }
}

impl WriterSettings {
    /// Settings for a response payload.
    #[must_use]
    pub fn response() -> Self {
        Self::default()
    }

    /// Settings for a request payload.
    #[must_use]
    pub fn request() -> Self {
        Self {
            is_request: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: ODataVersion) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Validate the settings combination.
    ///
    /// # Errors
    ///
    /// Returns a `SettingsError` if the nesting budget is zero; a writer
    /// built from such settings could never accept a resource.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_nesting_depth == 0 {
            return Err(SettingsError::ZeroNestingDepth);
        }
        Ok(())
    }
}
