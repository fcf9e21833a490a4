//! Serialization-info path parsing
//!
//! A serialization hint names its navigation source as a relative path,
//! e.g. `Customers` or `Customers(1)/Orders`. Only the leading segment
//! matters for source resolution; everything else is validated and
//! discarded. Parse failures are reported to the caller, which swallows
//! them for compatibility with older payload producers.

use thiserror::Error;

/// Failure to parse a navigation source hint path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HintPathError {
    #[error("navigation source path is empty")]
    Empty,
    #[error("navigation source path segment '{0}' contains invalid characters")]
    InvalidSegment(String),
}

/// Extract the navigation source name from a hint path.
pub fn parse_navigation_source(raw: &str) -> Result<String, HintPathError> {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(HintPathError::Empty);
    }
    let first = match trimmed.split('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => return Err(HintPathError::Empty),
    };
    // Strip a key predicate: Customers(1) names the set Customers.
    let name = match first.find('(') {
        Some(open) => {
            if !first.ends_with(')') {
                return Err(HintPathError::InvalidSegment(first.to_owned()));
            }
            &first[..open]
        }
        None => first,
    };
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
    {
        return Err(HintPathError::InvalidSegment(first.to_owned()));
    }
    Ok(name.to_owned())
}
