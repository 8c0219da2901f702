//! # Validation Errors
//!
//! Field-level validation failures raised when constructing or updating
//! domain records. Callers render these as 422-class responses; they are
//! never fatal and no partial write happens when one is returned.

use thiserror::Error;

/// A write was rejected because an input field failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace only.
    #[error("{field} must not be empty")]
    Required {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeded its maximum length.
    #[error("{field} must not exceed {max} characters (got {actual})")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum accepted length in characters.
        max: usize,
        /// Actual length in characters.
        actual: usize,
    },
}

/// Check that a required text field is non-blank and within `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    limit_text(field, value, max)
}

/// Check that a text field does not exceed `max` characters.
pub fn limit_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

/// Like [`limit_text`] for optional fields; `None` always passes.
pub fn limit_optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => limit_text(field, v, max),
        None => Ok(()),
    }
}
