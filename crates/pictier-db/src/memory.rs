//! In-memory repositories.
//!
//! Same contracts as the Postgres implementations, including tier validation
//! and owner scoping, without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use pictier_core::{
    AccessTier, AppError, NewPhoto, Photo, PhotoCatalog, ThumbnailSpec, TierRegistry, User,
    UserDirectory,
};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::user::hash_api_key;

#[derive(Default)]
pub struct InMemoryTierRegistry {
    tiers: RwLock<HashMap<Uuid, (AccessTier, Vec<ThumbnailSpec>)>>,
}

impl InMemoryTierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a tier and its specs. Invalid tiers or specs are refused.
    pub async fn upsert_tier(
        &self,
        tier: AccessTier,
        mut specs: Vec<ThumbnailSpec>,
    ) -> Result<(), AppError> {
        tier.ensure_consistent()?;
        for spec in &specs {
            spec.ensure_consistent()?;
            if spec.tier_id != tier.id {
                return Err(AppError::Config(format!(
                    "thumbnail spec '{}' belongs to another tier",
                    spec.name
                )));
            }
        }
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        self.tiers.write().await.insert(tier.id, (tier, specs));
        Ok(())
    }
}

#[async_trait]
impl TierRegistry for InMemoryTierRegistry {
    async fn capabilities_for(&self, user: &User) -> Result<AccessTier, AppError> {
        let tier_id = user
            .tier_id
            .ok_or_else(|| AppError::TierNotAssigned(user.username.clone()))?;

        self.tiers
            .read()
            .await
            .get(&tier_id)
            .map(|(tier, _)| tier.clone())
            .ok_or_else(|| AppError::TierNotAssigned(user.username.clone()))
    }

    async fn thumbnail_specs_for(&self, tier: &AccessTier) -> Result<Vec<ThumbnailSpec>, AppError> {
        Ok(self
            .tiers
            .read()
            .await
            .get(&tier.id)
            .map(|(_, specs)| specs.clone())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryPhotoCatalog {
    photos: RwLock<Vec<Photo>>,
}

impl InMemoryPhotoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed record, keeping its id and timestamp.
    pub async fn insert(&self, photo: Photo) {
        self.photos.write().await.push(photo);
    }
}

#[async_trait]
impl PhotoCatalog for InMemoryPhotoCatalog {
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Photo>, AppError> {
        let mut photos: Vec<Photo> = self
            .photos
            .read()
            .await
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect();
        photos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(photos)
    }

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Photo>, AppError> {
        Ok(self
            .photos
            .read()
            .await
            .iter()
            .find(|p| p.owner == owner && p.id == id)
            .cloned())
    }

    async fn create(&self, photo: NewPhoto) -> Result<Photo, AppError> {
        let photo = Photo {
            id: Uuid::new_v4(),
            name: photo.name,
            owner: photo.owner,
            storage_path: photo.storage_path,
            created_at: Utc::now(),
        };
        self.photos.write().await.push(photo.clone());
        Ok(photo)
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, AppError> {
        let mut photos = self.photos.write().await;
        let before = photos.len();
        photos.retain(|p| !(p.owner == owner && p.id == id));
        Ok(photos.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<(String, User)>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` under the plaintext `api_key`. Only the digest is kept.
    pub async fn add_user(&self, api_key: &str, user: User) {
        self.users.write().await.push((hash_api_key(api_key), user));
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_api_key_hash(&self, key_hash: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|(hash, _)| bool::from(hash.as_bytes().ct_eq(key_hash.as_bytes())))
            .map(|(_, user)| user.clone()))
    }
}
