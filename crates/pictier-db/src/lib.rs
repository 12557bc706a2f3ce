//! Persistence for Pictier.
//!
//! Postgres repositories implement the registry traits from `pictier-core`.
//! The in-memory implementations in [`memory`] back tests and local tooling.

pub mod memory;
pub mod photo;
pub mod tier;
pub mod user;

pub use memory::{InMemoryPhotoCatalog, InMemoryTierRegistry, InMemoryUserDirectory};
pub use photo::PgPhotoCatalog;
pub use tier::PgTierRegistry;
pub use user::{hash_api_key, PgUserDirectory};
