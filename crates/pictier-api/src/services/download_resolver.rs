//! Download Resolver: token in, storage location out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pictier_core::{AccessTier, TokenCodec, TokenError};
use pictier_storage::Storage;

#[derive(Clone)]
pub struct DownloadResolver {
    codec: TokenCodec,
    storage: Arc<dyn Storage>,
}

impl DownloadResolver {
    pub fn new(codec: TokenCodec, storage: Arc<dyn Storage>) -> Self {
        Self { codec, storage }
    }

    /// Validate `token` against the caller's current tier TTL and return the storage path.
    ///
    /// Tiers without an expiration time resolve nothing. Failures are not
    /// distinguished from each other.
    pub fn resolve(
        &self,
        token: &str,
        tier: &AccessTier,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = tier.ttl().ok_or_else(TokenError::no_ttl)?;
        self.codec.open(token, ttl, now)
    }

    /// Public URL the client is redirected to for a resolved storage path.
    pub fn redirect_url(&self, storage_path: &str) -> String {
        self.storage.public_url(storage_path)
    }
}
