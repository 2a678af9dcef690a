//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a
//! [`ContentStore`] and an [`AggregationService`] over it, plus helpers for
//! seeding photographers and categories.

#![allow(dead_code)]

use std::path::Path;

use ph_core::config::{AggregationConfig, DatabaseConfig, StoreConfig};
use ph_core::{CategoryId, ImageId, UserId};
use ph_db::pool::{init_memory_pool, init_pool, DbPool};
use ph_db::queries::{categories, users};
use photohub::{AggregationService, ContentStore};

pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
pub const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00";
pub const NOT_AN_IMAGE: &[u8] = b"not an image";

/// Test harness wrapping a store backed by an in-memory database.
pub struct TestHarness {
    pub db: DbPool,
    pub store: ContentStore,
}

impl TestHarness {
    /// Create a new harness with default store settings and an in-memory DB.
    pub fn new() -> Self {
        Self::with_store_config(StoreConfig::default())
    }

    pub fn with_store_config(config: StoreConfig) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let store = ContentStore::new(db.clone(), &config).expect("invalid store config");
        Self { db, store }
    }

    /// Open (or reopen) a file-backed database under `dir`.
    pub fn on_disk(dir: &Path) -> Self {
        let config = DatabaseConfig {
            path: dir.join("photohub.db"),
            pool_size: 8,
            busy_timeout_ms: 10_000,
        };
        let db = init_pool(&config).expect("failed to open database");
        let store = ContentStore::new(db.clone(), &StoreConfig::default()).expect("invalid store config");
        Self { db, store }
    }

    pub fn aggregation(&self) -> AggregationService {
        AggregationService::new(self.store.clone(), AggregationConfig::default())
    }

    pub fn aggregation_surfacing_unknown(&self) -> AggregationService {
        AggregationService::new(
            self.store.clone(),
            AggregationConfig {
                surface_unknown: true,
            },
        )
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> ph_db::pool::PooledConnection {
        ph_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn create_user(&self, username: &str) -> UserId {
        let email = format!("{username}@example.com");
        users::create_user(&self.conn(), username, &email, "not-a-real-hash")
            .expect("failed to create user")
            .id
    }

    pub fn create_category(&self, name: &str) -> CategoryId {
        categories::create_category(&self.conn(), name)
            .expect("failed to create category")
            .id
    }

    pub fn put(&self, payload: &[u8], owner: UserId, category: CategoryId) -> ImageId {
        self.store
            .put(payload, owner, category)
            .expect("failed to store image")
    }

    /// Number of rows in `table`.
    pub fn count(&self, table: &str) -> i64 {
        self.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query failed")
    }
}
