//! Field-level validation errors and the helpers that produce them.
//!
//! Record inputs derive [`garde::Validate`]; [`validate`] runs the rules and
//! flattens a [`garde::Report`] into a list of [`FieldError`]s that can be
//! sent to the client as-is.

use garde::Validate;
use serde::{Deserialize, Serialize};

/// A single failed rule on a named input field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Run the `garde` rules of `value` and collect every failure.
pub fn validate<T>(value: &T) -> Result<(), Vec<FieldError>>
where
    T: Validate,
    T::Context: Default,
{
    value.validate().map_err(|report| from_report(&report))
}

/// Flatten a `garde` report into field errors.
pub fn from_report(report: &garde::Report) -> Vec<FieldError> {
    report
        .iter()
        .map(|(path, error)| {
            let field = path.to_string();
            let field = if field.is_empty() {
                "value".to_string()
            } else {
                field
            };
            FieldError::new(field, error.message())
        })
        .collect()
}

/// Rejects values made only of whitespace.
pub(crate) fn not_blank(value: &str, _context: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}
