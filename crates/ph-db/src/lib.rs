//! ph-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with r2d2 connection pooling,
//! embedded migrations, typed models, and query modules for users,
//! categories, and images.
//!
//! # Example
//!
//! ```
//! use ph_db::pool::{init_memory_pool, get_conn};
//! use ph_db::queries::{categories, users};
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let user = users::create_user(&conn, "ansel", "ansel@example.com", "hash").unwrap();
//! let landscapes = categories::create_category(&conn, "Landscapes").unwrap();
//! assert_eq!(user.username, "ansel");
//! assert_eq!(landscapes.name, "Landscapes");
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
mod sqlite_error;

pub use sqlite_error::{is_foreign_key_violation, is_unique_violation, map_sqlite_error};
