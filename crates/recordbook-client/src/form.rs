//! The record form and its client-side checks.
//!
//! These rules only short-circuit obviously invalid submissions before the
//! network round-trip. The server validates again and is authoritative.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use recordbook_shared::constants::{MESSAGE_MIN_CHARS, NAME_MIN_CHARS};
use recordbook_shared::{FieldError, NewRecord};

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Message,
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "message" => Ok(Self::Message),
            other => Err(format!("unknown form field: {other}")),
        }
    }
}

/// Raw, untrimmed form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl RecordForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Email => self.email = value,
            FormField::Message => self.message = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The values that are actually submitted.
    pub fn to_input(&self) -> NewRecord {
        NewRecord {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    pub fn validate(&self) -> FormErrors {
        let input = self.to_input();
        let mut errors = FormErrors::default();

        if input.name.is_empty() {
            errors.name = Some("Name is required".into());
        } else if input.name.chars().count() < NAME_MIN_CHARS {
            errors.name = Some(format!("Name must be at least {NAME_MIN_CHARS} characters"));
        }

        if input.email.is_empty() {
            errors.email = Some("E-mail is required".into());
        } else if !EMAIL_SHAPE.is_match(&input.email) {
            errors.email = Some("E-mail must be valid".into());
        }

        if input.message.is_empty() {
            errors.message = Some("Message is required".into());
        } else if input.message.chars().count() < MESSAGE_MIN_CHARS {
            errors.message = Some(format!(
                "Message must be at least {MESSAGE_MIN_CHARS} characters"
            ));
        }

        errors
    }
}

/// Per-field messages shown next to the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.message.is_none()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => self.name.as_deref(),
            FormField::Email => self.email.as_deref(),
            FormField::Message => self.message.as_deref(),
        }
    }

    pub fn set(&mut self, field: FormField, message: impl Into<String>) {
        let message = Some(message.into());
        match field {
            FormField::Name => self.name = message,
            FormField::Email => self.email = message,
            FormField::Message => self.message = message,
        }
    }

    pub fn clear(&mut self, field: FormField) {
        match field {
            FormField::Name => self.name = None,
            FormField::Email => self.email = None,
            FormField::Message => self.message = None,
        }
    }

    /// Place server-reported errors on their fields. Errors that do not
    /// belong to a form field are returned.
    pub fn absorb(&mut self, fields: Vec<FieldError>) -> Vec<FieldError> {
        let mut rest = Vec::new();
        for error in fields {
            match error.field.parse::<FormField>() {
                // first message per field wins
                Ok(field) if self.get(field).is_none() => self.set(field, error.message),
                Ok(_) => {}
                Err(_) => rest.push(error),
            }
        }
        rest
    }
}
