//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order. A
//! `schema_migrations` table tracks which versions have been applied.

use ph_core::{Error, Result};
use rusqlite::Connection;

/// V1: users, categories, and image metadata.
const V1_INITIAL: &str = r#"
CREATE TABLE users (
    id            TEXT PRIMARY KEY,
    username      TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE categories (
    id         TEXT PRIMARY KEY,
    name       TEXT UNIQUE NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE images (
    id          TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(id),
    category_id TEXT NOT NULL REFERENCES categories(id),
    byte_len    INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE INDEX idx_images_category_owner ON images(category_id, owner_id);
CREATE INDEX idx_images_owner ON images(owner_id);
"#;

/// V2: image payloads, split into ordered chunks.
const V2_IMAGE_CHUNKS: &str = r#"
CREATE TABLE image_chunks (
    image_id TEXT NOT NULL REFERENCES images(id) ON DELETE CASCADE,
    seq      INTEGER NOT NULL,
    data     BLOB NOT NULL,
    PRIMARY KEY (image_id, seq)
);
"#;

/// V3: contact email and optional personal details for photographers.
///
/// Rows created before V3 get an empty email, which the partial index
/// leaves out of the uniqueness check.
const V3_USER_DETAILS: &str = r#"
ALTER TABLE users ADD COLUMN email TEXT NOT NULL DEFAULT '';
ALTER TABLE users ADD COLUMN first_name TEXT;
ALTER TABLE users ADD COLUMN middle_name TEXT;
ALTER TABLE users ADD COLUMN surname TEXT;
ALTER TABLE users ADD COLUMN gender TEXT;
ALTER TABLE users ADD COLUMN date_of_birth TEXT;
ALTER TABLE users ADD COLUMN location TEXT;

CREATE UNIQUE INDEX idx_users_email ON users(email) WHERE email <> '';
"#;

const MIGRATIONS: &[(i64, &str)] = &[
    (1, V1_INITIAL),
    (2, V2_IMAGE_CHUNKS),
    (3, V3_USER_DETAILS),
];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    let mut applied = 0;
    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(crate::map_sqlite_error)?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(crate::map_sqlite_error)?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(crate::map_sqlite_error)?;

        tx.commit().map_err(crate::map_sqlite_error)?;

        tracing::info!(version, "Applied migration");
        applied += 1;
    }

    Ok(applied)
}

/// Highest schema version recorded in `schema_migrations`, or 0.
pub fn current_version(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(crate::map_sqlite_error)
}

/// Latest migration version embedded in this build.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|&(v, _)| v).unwrap_or(0)
}
