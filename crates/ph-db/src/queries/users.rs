//! User CRUD operations.

use chrono::Utc;
use ph_core::{Error, Result, UserId};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{PersonalDetails, User};
use crate::{is_unique_violation, map_sqlite_error};

const COLS: &str = "id, username, email, password_hash, first_name, middle_name, surname, \
                    gender, date_of_birth, location, created_at";

/// Create a new user with no personal details.
///
/// Fails with [`Error::Conflict`] if the username or email is already taken.
pub fn create_user(conn: &Connection, username: &str, email: &str, password_hash: &str) -> Result<User> {
    create_user_with_details(conn, username, email, password_hash, &PersonalDetails::default())
}

/// Create a new user, storing the given personal details alongside.
pub fn create_user_with_details(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    details: &PersonalDetails,
) -> Result<User> {
    let id = UserId::new();
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, first_name, middle_name,
                            surname, gender, date_of_birth, location, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            id.to_string(),
            username,
            email,
            password_hash,
            details.first_name,
            details.middle_name,
            details.surname,
            details.gender,
            details.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            details.location,
            created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::Conflict(format!("Username '{username}' or email '{email}' already exists"))
        } else {
            map_sqlite_error(e)
        }
    })?;

    Ok(User {
        id,
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        details: details.clone(),
        created_at,
    })
}

/// Get a user by ID.
pub fn get_user(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE id = ?1");
    conn.query_row(&q, [id.to_string()], User::from_row)
        .optional()
        .map_err(map_sqlite_error)
}

/// Get a user by username.
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE username = ?1");
    conn.query_row(&q, [username], User::from_row)
        .optional()
        .map_err(map_sqlite_error)
}

/// Get a user by email address.
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE email = ?1 AND email <> ''");
    conn.query_row(&q, [email], User::from_row)
        .optional()
        .map_err(map_sqlite_error)
}

/// List all users ordered by username.
pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let q = format!("SELECT {COLS} FROM users ORDER BY username");
    let mut stmt = conn.prepare(&q).map_err(map_sqlite_error)?;
    let rows = stmt
        .query_map([], User::from_row)
        .map_err(map_sqlite_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_sqlite_error)?;
    Ok(rows)
}

/// Whether a user with this ID exists.
pub fn user_exists(conn: &Connection, id: UserId) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        [id.to_string()],
        |row| row.get(0),
    )
    .map_err(map_sqlite_error)
}

/// Replace a user's password hash.
pub fn update_password(conn: &Connection, id: UserId, password_hash: &str) -> Result<()> {
    let n = conn
        .execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            rusqlite::params![password_hash, id.to_string()],
        )
        .map_err(map_sqlite_error)?;

    if n == 0 {
        return Err(Error::not_found("user", id));
    }
    Ok(())
}
