//! Photographer accounts: signup, login, and credential rotation.
//!
//! Passwords are hashed with bcrypt. A user row is never mutated except to
//! replace its password hash.

use chrono::Utc;
use ph_core::config::AuthConfig;
use ph_core::{Error, Result, UserId};
use ph_db::models::{PersonalDetails, User};
use ph_db::pool::{get_conn, DbPool};
use ph_db::queries::users;
use serde::Deserialize;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 50;
/// Longest accepted email address, in characters.
pub const MAX_EMAIL_LEN: usize = 256;

const MAX_NAME_LEN: usize = 50;
const MAX_GENDER_LEN: usize = 10;
const MAX_LOCATION_LEN: usize = 100;

const BAD_CREDENTIALS: &str = "Invalid credentials";

/// Signup form payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub details: PersonalDetails,
}

#[derive(Clone)]
pub struct Accounts {
    pool: DbPool,
    config: AuthConfig,
}

impl Accounts {
    pub fn new(pool: DbPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    /// Register a new photographer.
    ///
    /// The username is trimmed and must be 1..=50 characters. The email is
    /// trimmed and lowercased. Blank personal details are stored as absent.
    /// Fails with [`Error::Conflict`] if the username or email is taken.
    pub fn signup(&self, request: &SignupRequest) -> Result<User> {
        let username = normalize_username(&request.username)?;
        let email = normalize_email(&request.email)?;
        let details = normalize_details(&request.details)?;
        self.check_password(&request.password)?;

        let conn = get_conn(&self.pool)?;
        if users::get_user_by_username(&conn, username)?.is_some() {
            return Err(Error::Conflict(format!("Username '{username}' already exists")));
        }
        if users::get_user_by_email(&conn, &email)?.is_some() {
            return Err(Error::Conflict(format!("Email '{email}' is already registered")));
        }

        let hash = self.hash(&request.password)?;
        // A concurrent signup may still win the race; create_user maps the
        // unique violation to the same Conflict.
        let user = users::create_user_with_details(&conn, username, &email, &hash, &details)?;

        tracing::info!(user_id = %user.id, username = %user.username, "Created account");
        Ok(user)
    }

    /// Check a username and password, returning the matching user.
    ///
    /// Unknown users and wrong passwords fail identically with
    /// [`Error::Unauthorized`].
    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        let conn = get_conn(&self.pool)?;
        let Some(user) = users::get_user_by_username(&conn, username.trim())? else {
            tracing::warn!(username = %username.trim(), "Login for unknown user");
            return Err(Error::Unauthorized(BAD_CREDENTIALS.into()));
        };

        if !verify(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "Login with wrong password");
            return Err(Error::Unauthorized(BAD_CREDENTIALS.into()));
        }

        tracing::debug!(user_id = %user.id, "Login succeeded");
        Ok(user)
    }

    /// Replace a user's password after confirming the current one.
    pub fn rotate_credential(&self, user_id: UserId, current: &str, new: &str) -> Result<()> {
        self.check_password(new)?;

        let conn = get_conn(&self.pool)?;
        let user = users::get_user(&conn, user_id)?.ok_or_else(|| Error::not_found("user", user_id))?;

        if !verify(current, &user.password_hash) {
            tracing::warn!(user_id = %user_id, "Credential rotation with wrong password");
            return Err(Error::Unauthorized(BAD_CREDENTIALS.into()));
        }

        let hash = self.hash(new)?;
        users::update_password(&conn, user_id, &hash)?;

        tracing::info!(user_id = %user_id, "Rotated credential");
        Ok(())
    }

    fn check_password(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.config.min_password_len.max(1) {
            return Err(Error::invalid_input(format!(
                "password must be at least {} characters",
                self.config.min_password_len.max(1)
            )));
        }
        Ok(())
    }

    fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.config.bcrypt_cost)
            .map_err(|e| Error::Internal(format!("password hashing failed: {e}")))
    }
}

fn normalize_username(username: &str) -> Result<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::invalid_input("username must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(Error::invalid_input(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(username)
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(Error::invalid_input(format!("'{email}' is not a valid email address")));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(Error::invalid_input(format!(
            "email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }
    Ok(email)
}

/// Trim every text field, dropping blanks, and check lengths and the birth date.
fn normalize_details(details: &PersonalDetails) -> Result<PersonalDetails> {
    fn field(value: &Option<String>, name: &str, max: usize) -> Result<Option<String>> {
        let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        if value.chars().count() > max {
            return Err(Error::invalid_input(format!("{name} must be at most {max} characters")));
        }
        Ok(Some(value.to_string()))
    }

    if let Some(dob) = details.date_of_birth {
        if dob > Utc::now().date_naive() {
            return Err(Error::invalid_input("date of birth is in the future"));
        }
    }

    Ok(PersonalDetails {
        first_name: field(&details.first_name, "first name", MAX_NAME_LEN)?,
        middle_name: field(&details.middle_name, "middle name", MAX_NAME_LEN)?,
        surname: field(&details.surname, "surname", MAX_NAME_LEN)?,
        gender: field(&details.gender, "gender", MAX_GENDER_LEN)?,
        date_of_birth: details.date_of_birth,
        location: field(&details.location, "location", MAX_LOCATION_LEN)?,
    })
}

/// A malformed stored hash counts as a mismatch.
fn verify(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
