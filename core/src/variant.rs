//! Variant keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The (size, color) pair identifying one sellable configuration of a
/// product.
///
/// `None` is a real key, not a wildcard: a record stored with no color only
/// matches a lookup that also carries no color. Empty and whitespace-only
/// strings normalize to `None`, so `""` and absent name the same variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    pub size: Option<String>,
    pub color: Option<String>,
}

impl VariantKey {
    pub fn new(size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            size: normalize(size),
            color: normalize(color),
        }
    }

    /// The key with neither size nor color, a product's base variant.
    pub fn bare() -> Self {
        Self::default()
    }

    /// Literal equality against a stored record's fields, `None` matching
    /// only `None`.
    pub fn matches(&self, size: Option<&str>, color: Option<&str>) -> bool {
        self.size.as_deref() == size && self.color.as_deref() == color
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.color, &self.size) {
            (Some(color), Some(size)) => write!(f, "{color}/{size}"),
            (Some(color), None) => write!(f, "{color}/-"),
            (None, Some(size)) => write!(f, "-/{size}"),
            (None, None) => f.write_str("base"),
        }
    }
}
