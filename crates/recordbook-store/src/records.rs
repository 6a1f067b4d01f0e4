//! Record operations: create, list/search, get, update, delete and count.
//!
//! Inputs are validated before any SQL runs. Unique-constraint failures on
//! `email` come back as [`StoreError::DuplicateEmail`], never as a raw
//! SQLite error.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use recordbook_shared::validation::validate;
use recordbook_shared::{FieldError, ListQuery, NewRecord, Record, RecordPage, RecordPatch};
use rusqlite::{params, ErrorCode};

use crate::database::Database;
use crate::error::{Result, StoreError};

const SELECT_RECORD: &str = "SELECT id, name, email, message, created_at, updated_at FROM records";

/// Shared by the count and page queries of a search. `?1` is the search
/// term already passed through [`fold_term`]; `instr` matches it literally.
const SEARCH_FILTER: &str = "WHERE instr(fold(name), ?1) > 0
    OR instr(fold(email), ?1) > 0
    OR instr(fold(message), ?1) > 0";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Validate and insert a new record. `created_at` and `updated_at` are
    /// set to the same instant.
    pub fn create_record(&self, input: &NewRecord) -> Result<Record> {
        validate(input).map_err(StoreError::Validation)?;

        let now = now();
        self.conn()
            .execute(
                "INSERT INTO records (name, email, message, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![input.name, input.email, input.message, timestamp(now)],
            )
            .map_err(|e| unique_violation(e, &input.email))?;

        let id = self.conn().last_insert_rowid();
        tracing::debug!(id, "record created");

        Ok(Record {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            message: input.message.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single record by id.
    pub fn get_record(&self, id: i64) -> Result<Record> {
        self.conn()
            .query_row(
                &format!("{SELECT_RECORD} WHERE id = ?1"),
                params![id],
                row_to_record,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(id),
                other => StoreError::Sqlite(other),
            })
    }

    /// One page of records, newest first, optionally filtered by a
    /// case-insensitive substring match on name, email or message.
    pub fn list_records(&self, query: &ListQuery) -> Result<RecordPage> {
        query.validate().map_err(StoreError::Validation)?;

        let limit = i64::from(query.limit);
        let offset = i64::try_from(query.offset()).map_err(|_| {
            StoreError::Validation(vec![FieldError::new("page", "is out of range")])
        })?;

        let (total, data) = match query.search_term() {
            Some(term) => {
                let folded = fold_term(term);
                let total: i64 = self.conn().query_row(
                    &format!("SELECT COUNT(*) FROM records {SEARCH_FILTER}"),
                    params![folded],
                    |row| row.get(0),
                )?;

                let mut stmt = self.conn().prepare(&format!(
                    "{SELECT_RECORD} {SEARCH_FILTER}
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2 OFFSET ?3"
                ))?;
                let rows = stmt.query_map(params![folded, limit, offset], row_to_record)?;
                (total, rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
            None => {
                let total: i64 =
                    self.conn()
                        .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;

                let mut stmt = self.conn().prepare(&format!(
                    "{SELECT_RECORD}
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?1 OFFSET ?2"
                ))?;
                let rows = stmt.query_map(params![limit, offset], row_to_record)?;
                (total, rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
        };

        Ok(RecordPage::new(
            data,
            u64::try_from(total).unwrap_or_default(),
            query.page,
            query.limit,
        ))
    }

    /// Total number of stored records, ignoring any search.
    pub fn count_records(&self) -> Result<u64> {
        let total: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Replace the fields present in `patch`, re-validate the merged record
    /// and refresh `updated_at`. `created_at` is left untouched.
    pub fn update_record(&self, id: i64, patch: &RecordPatch) -> Result<Record> {
        let tx = self.conn().unchecked_transaction()?;

        let existing = self.get_record(id)?;
        let merged = patch.apply_to(&existing);
        validate(&merged).map_err(StoreError::Validation)?;

        let now = now().max(existing.updated_at);
        let affected = tx
            .execute(
                "UPDATE records
                 SET name = ?1, email = ?2, message = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![merged.name, merged.email, merged.message, timestamp(now), id],
            )
            .map_err(|e| unique_violation(e, &merged.email))?;
        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        tx.commit()?;

        tracing::debug!(id, "record updated");

        Ok(Record {
            id,
            name: merged.name,
            email: merged.email,
            message: merged.message,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Permanently remove a record. Deleting an id that does not exist
    /// (including one deleted before) is [`StoreError::NotFound`].
    pub fn delete_record(&self, id: i64) -> Result<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM records WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(id, "record deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current time truncated to the precision stored in the database, so a
/// returned record equals the one read back later.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that text order is chronological order.
fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The search term folded the same way as the `fold()` SQL function.
fn fold_term(term: &str) -> String {
    term.to_lowercase()
}

/// Translate a unique-constraint failure into [`StoreError::DuplicateEmail`].
fn unique_violation(err: rusqlite::Error, email: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            tracing::debug!(email, "duplicate email rejected");
            StoreError::DuplicateEmail(email.to_string())
        }
        _ => StoreError::Sqlite(err),
    }
}

/// Map a `rusqlite::Row` to a [`Record`].
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;

    Ok(Record {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        message: row.get(3)?,
        created_at: parse_timestamp(4, &created_str)?,
        updated_at: parse_timestamp(5, &updated_str)?,
    })
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
