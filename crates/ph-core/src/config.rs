//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries the
//! database, store, aggregation, and auth sections. Every section defaults
//! sensibly so a completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Largest chunk a single SQLite value may reasonably hold.
const MAX_CHUNK_SIZE: usize = 512 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub aggregation: AggregationConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from a TOML file, failing if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.database.pool_size == 0 {
            warnings.push("database.pool_size is 0; the pool cannot hand out connections".into());
        }

        if self.store.chunk_size == 0 {
            warnings.push("store.chunk_size is 0; uploads will be rejected".into());
        } else if self.store.chunk_size > MAX_CHUNK_SIZE {
            warnings.push(format!(
                "store.chunk_size {} exceeds the {} byte limit",
                self.store.chunk_size, MAX_CHUNK_SIZE
            ));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            warnings.push(format!(
                "auth.bcrypt_cost {} is outside the supported range 4..=31",
                self.auth.bcrypt_cost
            ));
        }

        if self.auth.min_password_len == 0 {
            warnings.push("auth.min_password_len is 0; empty passwords are accepted".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// SQLite connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("photohub.db"),
            pool_size: 4,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Payload persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Payloads are split into chunks of at most this many bytes.
    pub chunk_size: usize,
}

impl StoreConfig {
    /// Check that the chunk size is usable, returning it.
    pub fn checked_chunk_size(&self) -> Result<usize> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::Config(format!(
                "store.chunk_size must be between 1 and {MAX_CHUNK_SIZE}, got {}",
                self.chunk_size
            )));
        }
        Ok(self.chunk_size)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16 * 1024 * 1024,
        }
    }
}

/// Category aggregation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Include unknown-type images as `application/octet-stream` instead of
    /// dropping them from the grouped views.
    pub surface_unknown: bool,
}

/// Account and credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 12,
            min_password_len: 8,
        }
    }
}
