//! Record entity, inputs and listing types as they travel over HTTP.
//!
//! Every struct serializes with camelCase keys.

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, EMAIL_MAX_CHARS, MESSAGE_MIN_CHARS, NAME_MAX_CHARS,
    NAME_MIN_CHARS,
};
use crate::validation::{not_blank, FieldError};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A stored record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Generated by the store, never reused.
    pub id: i64,
    pub name: String,
    /// Unique across all records.
    pub email: String,
    pub message: String,
    /// Set once at insertion.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Body of a create request. Also the shape every update is re-validated in.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NewRecord {
    #[garde(length(chars, min = NAME_MIN_CHARS, max = NAME_MAX_CHARS), custom(not_blank))]
    pub name: String,
    #[garde(email, length(chars, max = EMAIL_MAX_CHARS))]
    pub email: String,
    #[garde(length(chars, min = MESSAGE_MIN_CHARS), custom(not_blank))]
    pub message: String,
}

/// Body of an update request. Only the present fields are replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordPatch {
    /// Merge the patch over an existing record's fields.
    pub fn apply_to(&self, record: &Record) -> NewRecord {
        NewRecord {
            name: self.name.clone().unwrap_or_else(|| record.name.clone()),
            email: self.email.clone().unwrap_or_else(|| record.email.clone()),
            message: self
                .message
                .clone()
                .unwrap_or_else(|| record.message.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Pagination and search parameters of a listing request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, limit: u32, search: Option<String>) -> Self {
        Self {
            page,
            limit,
            search,
        }
    }

    /// The search term with surrounding whitespace removed, or `None` when
    /// there is nothing left to search for.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// `page >= 1` and `limit > 0`.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.page < 1 {
            errors.push(FieldError::new("page", "must be at least 1"));
        }
        if self.limit < 1 {
            errors.push(FieldError::new("limit", "must be greater than 0"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    pub data: Vec<Record>,
    /// Records matching the search, across all pages.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl RecordPage {
    pub fn new(data: Vec<Record>, total: u64, page: u32, limit: u32) -> Self {
        Self {
            data,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        }
    }
}

/// `ceil(total / limit)`, zero when `limit` is zero.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// Body of `GET /records/count`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    pub total: u64,
}
