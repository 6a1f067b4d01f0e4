//! # recordbook-store
//!
//! SQLite storage for recordbook records.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection`, runs schema migrations on open, and provides the
//! record operations: create, paginated search, fetch, partial update, delete
//! and count. Input validation and unique-email enforcement happen here, so
//! every caller gets the same guarantees.

pub mod database;
pub mod migrations;
pub mod records;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use recordbook_shared::{ListQuery, NewRecord, Record, RecordPage, RecordPatch};
