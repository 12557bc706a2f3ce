//! Link Issuer
//!
//! Turns a photo, the caller's tier and that tier's thumbnail specs into a link
//! set. Every spec is generated first, then the tier decides what kind of link
//! (if any) the caller gets for it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use pictier_core::{AccessTier, LinkMode, LinkResult, Photo, PhotoLinks, ThumbnailSpec, TokenCodec};
use pictier_processing::{ArtifactRef, GenerationError, ThumbnailGenerator};
use pictier_storage::Storage;

use crate::constants::PHOTO_CONCURRENCY;

#[derive(Clone)]
pub struct LinkIssuer {
    generator: ThumbnailGenerator,
    storage: Arc<dyn Storage>,
    codec: TokenCodec,
    public_base_url: String,
}

impl LinkIssuer {
    pub fn new(
        generator: ThumbnailGenerator,
        storage: Arc<dyn Storage>,
        codec: TokenCodec,
        public_base_url: String,
    ) -> Self {
        Self {
            generator,
            storage,
            codec,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the link set for a single photo.
    ///
    /// Specs are generated concurrently. A failed spec becomes
    /// [`LinkResult::Unavailable`] and never aborts the others. `source_keys`
    /// are the owner's photo storage paths (see [`source_keys`]); a thumbnail
    /// that would land on one of them is reported unavailable.
    pub async fn issue_links(
        &self,
        photo: &Photo,
        tier: &AccessTier,
        specs: &[ThumbnailSpec],
        mode: LinkMode,
        source_keys: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> PhotoLinks {
        let generated = join_all(
            specs
                .iter()
                .map(|spec| self.generator.generate(photo, spec, source_keys)),
        )
        .await;

        let thumbnail_links = specs
            .iter()
            .zip(generated)
            .map(|(spec, outcome)| {
                let link = self.decide(photo, spec, tier, mode, outcome, now);
                (spec.name.clone(), link)
            })
            .collect();

        let original_link = tier
            .original_links
            .then(|| self.storage.public_url(&photo.storage_path));

        PhotoLinks {
            photo: photo.clone(),
            original_link,
            thumbnail_links,
        }
    }

    /// Build link sets for all of one owner's photos, a bounded number at a
    /// time, keeping input order.
    pub async fn issue_for_photos(
        &self,
        photos: Vec<Photo>,
        tier: &AccessTier,
        specs: &[ThumbnailSpec],
        mode: LinkMode,
        now: DateTime<Utc>,
    ) -> Vec<PhotoLinks> {
        let sources = &source_keys(&photos);
        stream::iter(photos)
            .map(|photo| async move {
                self.issue_links(&photo, tier, specs, mode, sources, now)
                    .await
            })
            .buffered(PHOTO_CONCURRENCY)
            .collect()
            .await
    }

    fn decide(
        &self,
        photo: &Photo,
        spec: &ThumbnailSpec,
        tier: &AccessTier,
        mode: LinkMode,
        outcome: Result<ArtifactRef, GenerationError>,
        now: DateTime<Utc>,
    ) -> LinkResult {
        if mode == LinkMode::Expiring && !tier.expiring_links {
            return LinkResult::DenialMessage;
        }

        let artifact = match outcome {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!(
                    photo_id = %photo.id,
                    spec = %spec.name,
                    error = %e,
                    "Thumbnail unavailable"
                );
                return LinkResult::Unavailable;
            }
        };

        match mode {
            LinkMode::Plain => LinkResult::PublicUrl(artifact.url),
            LinkMode::Expiring => match self.codec.seal(&artifact.key, now) {
                Ok(token) => LinkResult::TokenUrl(self.download_url(&token)),
                Err(e) => {
                    tracing::error!(
                        photo_id = %photo.id,
                        spec = %spec.name,
                        error = %e,
                        "Failed to seal download token"
                    );
                    LinkResult::Unavailable
                }
            },
        }
    }

    fn download_url(&self, token: &str) -> String {
        format!("{}/download/{}", self.public_base_url, token)
    }
}

/// Storage paths of `photos`, which thumbnails must never overwrite.
pub fn source_keys(photos: &[Photo]) -> HashSet<String> {
    photos.iter().map(|p| p.storage_path.clone()).collect()
}
