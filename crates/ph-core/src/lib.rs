//! ph-core: shared ids, errors, and configuration.
//!
//! This crate is the foundational dependency for the other ph-* crates,
//! providing type-safe identifiers, a unified error type covering the
//! content store's failure taxonomy, and the TOML application configuration.

pub mod config;
pub mod error;
pub mod ids;

// Re-export the most commonly used items at the crate root.
pub use config::Config;
pub use error::{Error, Result};
pub use ids::*;
