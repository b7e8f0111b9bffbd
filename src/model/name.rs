//! Dot-separated name helpers shared by package keys and qualified names.
//!
//! Package separators and member separators are the same character, so a
//! qualified name cannot be split without knowing which packages exist.
//! These helpers only check syntax; splitting lives in the query layer.

use crate::error::{IndexError, Result};

/// Segments of a dotted name. The empty string has zero segments.
pub fn split_segments(name: &str) -> impl Iterator<Item = &str> {
    name.split('.').filter(move |_| !name.is_empty())
}

/// Package keys: root (`""`) or one or more non-empty segments.
pub fn is_valid_package_name(name: &str) -> bool {
    name.is_empty() || name.split('.').all(|seg| !seg.is_empty())
}

/// Qualified names must have at least one segment and no empty segments.
pub fn validate_qualified_name(name: &str) -> Result<()> {
    if name.is_empty() || name.split('.').any(|seg| seg.is_empty()) {
        return Err(IndexError::InvalidName(name.to_string()));
    }
    Ok(())
}
