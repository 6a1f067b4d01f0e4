use serde::{Deserialize, Serialize};

use crate::validation::FieldError;

/// Failure category carried by every non-2xx API response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input failed the record field rules.
    Validation,
    /// The email is already used by another record.
    Conflict,
    /// No record with the requested id.
    NotFound,
    /// The request could not be parsed (malformed JSON, bad path or query).
    BadRequest,
    /// Anything else. The message never carries internals.
    Internal,
}

/// JSON body of an error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind,
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldError>) -> Self {
        self.fields = fields;
        self
    }
}
