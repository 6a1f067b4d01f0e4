use recordbook_shared::FieldError;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input rejected before touching storage.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The unique constraint on `email` rejected the write.
    #[error("E-mail already in use")]
    DuplicateEmail(String),

    /// No record with this id.
    #[error("Record {0} not found")]
    NotFound(i64),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
