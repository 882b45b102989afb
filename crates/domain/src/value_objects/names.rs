//! Validated name newtypes for catalog content
//!
//! These newtypes ensure that names are valid by construction:
//! - Non-empty
//! - Within length limits
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for display names
const MAX_NAME_LENGTH: usize = 200;

/// Maximum length for category tags
const MAX_TAG_LENGTH: usize = 64;

// ============================================================================
// DisplayName
// ============================================================================

/// A validated display name (non-empty, <=200 chars, trimmed).
///
/// The display name of a quiz item doubles as its correct answer, so it is
/// preserved verbatim apart from outer whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a new validated display name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The name is empty after trimming
    /// - The name exceeds 200 characters after trimming
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Display name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Display name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DisplayName> for String {
    fn from(name: DisplayName) -> String {
        name.0
    }
}

// ============================================================================
// CategoryTag
// ============================================================================

/// A validated category tag (lowercase, non-empty, <=64 chars).
///
/// Tags are normalized to lowercase so that `"Animals"` and `"animals"`
/// select the same strategy and count as the same category for diversity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryTag(String);

impl CategoryTag {
    pub fn new(tag: impl Into<String>) -> Result<Self, DomainError> {
        let tag = tag.into();
        let normalized = tag.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("Category tag cannot be empty"));
        }
        if normalized.len() > MAX_TAG_LENGTH {
            return Err(DomainError::validation(format!(
                "Category tag cannot exceed {} characters",
                MAX_TAG_LENGTH
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CategoryTag {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CategoryTag> for String {
    fn from(tag: CategoryTag) -> String {
        tag.0
    }
}
