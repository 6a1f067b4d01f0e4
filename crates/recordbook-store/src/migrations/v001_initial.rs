//! v001 -- Initial schema creation.
//!
//! Creates the `records` table.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Records
-- ----------------------------------------------------------------
-- AUTOINCREMENT keeps SQLite from handing out the id of a deleted row again.
CREATE TABLE IF NOT EXISTS records (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    email      TEXT NOT NULL UNIQUE,
    message    TEXT NOT NULL,
    created_at TEXT NOT NULL,                 -- RFC-3339, UTC, microseconds
    updated_at TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
