//! Repository traits implemented by the persistence layer.
//!
//! The link engine only depends on these traits, so handlers and services can
//! run against Postgres in production and in-memory stores in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{AccessTier, NewPhoto, Photo, ThumbnailSpec, User};

/// Read-only lookup of capability tiers and their thumbnail specs.
#[async_trait]
pub trait TierRegistry: Send + Sync {
    /// Tier assigned to `user`.
    ///
    /// Fails with [`AppError::TierNotAssigned`] when the user has no tier and
    /// with [`AppError::Config`] when the stored tier breaks its invariant.
    async fn capabilities_for(&self, user: &User) -> Result<AccessTier, AppError>;

    /// Thumbnail specs of `tier`, ordered by name.
    async fn thumbnail_specs_for(&self, tier: &AccessTier) -> Result<Vec<ThumbnailSpec>, AppError>;
}

/// Photo records, always scoped to their owner.
#[async_trait]
pub trait PhotoCatalog: Send + Sync {
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Photo>, AppError>;

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Photo>, AppError>;

    async fn create(&self, photo: NewPhoto) -> Result<Photo, AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, AppError>;
}

/// Resolves API keys to accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `key_hash` is the lowercase hex SHA-256 digest of the presented key.
    async fn find_by_api_key_hash(&self, key_hash: &str) -> Result<Option<User>, AppError>;
}
