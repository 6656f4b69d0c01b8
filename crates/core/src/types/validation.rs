//! Field-level validation errors.

use thiserror::Error;

/// A request field failed validation.
///
/// The `field` is the wire (camelCase) name so the message can be returned to
/// clients verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// The field was present but empty.
    #[must_use]
    pub fn empty(field: &'static str) -> Self {
        Self::new(field, "must not be empty")
    }
}

/// Require a non-empty string value.
///
/// # Errors
///
/// Returns [`ValidationError::empty`] if `value` is empty.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty(field));
    }
    Ok(())
}
