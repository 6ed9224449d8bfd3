//! Template identities.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Name of an enrolled visual template.
///
/// Identities are compared by value; the danger target and every
/// confirmation candidate refer to templates through this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    /// Create from an existing string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive the identity from a resource path: the file name up to the
    /// first dot (`"0.pgm"` -> `"0"`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name.split('.').next()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self(stem.to_string()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
