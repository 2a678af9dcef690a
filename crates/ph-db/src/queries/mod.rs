//! Database query modules.
//!
//! Every function borrows a `rusqlite::Connection`, so callers decide the
//! transaction boundary:
//! - users: accounts and credential hashes
//! - categories: category reference data
//! - images: image metadata and chunked payloads

pub mod categories;
pub mod images;
pub mod users;
