//! PhotoHub - image storage and retrieval for a photographer portfolio site.
//!
//! The library wires the persistence crates into the services a gateway
//! calls: [`store::ContentStore`] for payloads, [`aggregate::AggregationService`]
//! for grouped views, [`retrieval::fetch_image`] for typed delivery, and
//! [`accounts::Accounts`] for photographer credentials.

pub mod accounts;
pub mod aggregate;
pub mod config;
pub mod retrieval;
pub mod store;

pub use accounts::{Accounts, SignupRequest};
pub use aggregate::AggregationService;
pub use retrieval::{fetch_image, TypedImage};
pub use store::ContentStore;
