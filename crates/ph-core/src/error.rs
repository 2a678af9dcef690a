//! Unified error type for photohub.
//!
//! All crates funnel their failures into [`Error`]. Every failure is reported
//! per call; nothing here carries global state. A gateway in front of the
//! store derives a status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes of the content store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing input on a write (e.g. an empty payload).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A write referenced an owner or category that does not exist.
    #[error("Unresolved reference to {entity}: {id}")]
    Reference {
        /// The kind of entity referenced (e.g. "user", "category").
        entity: String,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "image", "user").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The persistence layer is unreachable, locked, or timed out.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A unique constraint would be violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Credentials did not match.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Stored bytes do not match any known image signature.
    #[error("Unknown image type for image {id}")]
    UnknownFormat {
        /// The image whose payload could not be classified.
        id: String,
    },

    /// A database operation failed for a reason other than availability.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::Reference { .. } => 422,
            Error::NotFound { .. } => 404,
            Error::StorageUnavailable(_) => 503,
            Error::Conflict(_) => 409,
            Error::Unauthorized(_) => 401,
            Error::UnknownFormat { .. } => 415,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Whether a caller may reasonably retry the same call later.
    ///
    /// The store never retries on its own; backoff belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_))
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Reference`].
    pub fn reference(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::Reference {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Convenience constructor for [`Error::StorageUnavailable`].
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Error::StorageUnavailable(msg.into())
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
