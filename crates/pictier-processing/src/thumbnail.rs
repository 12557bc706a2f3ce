//! Thumbnail derivation.
//!
//! A thumbnail is a pure function of the source bytes and the spec's bounding
//! box, written to a deterministic key. Regenerating it yields identical bytes,
//! and the storage layer replaces files atomically, so concurrent requests for
//! the same artifact need no coordination.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::ImageFormat;
use pictier_core::{Photo, ThumbnailSpec};
use pictier_storage::{keys, Storage, StorageError};

use crate::resize::ImageResize;

/// Failure to produce one `(photo, spec)` artifact.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Source image not found: {0}")]
    SourceMissing(String),

    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Thumbnail generation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Thumbnail worker failed: {0}")]
    Join(String),

    #[error("Thumbnail key {0} is the source file of another photo")]
    KeyConflict(String),
}

/// Location of a generated thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub key: String,
    pub url: String,
}

/// Derives PNG thumbnails from stored source photos.
#[derive(Clone)]
pub struct ThumbnailGenerator {
    storage: Arc<dyn Storage>,
    timeout: Duration,
}

impl ThumbnailGenerator {
    pub fn new(storage: Arc<dyn Storage>, timeout: Duration) -> Self {
        Self { storage, timeout }
    }

    /// Generate the artifact for `spec` from `photo`, bounded by the configured timeout.
    ///
    /// `source_keys` holds the storage paths of the owner's photos. An artifact
    /// whose key is one of them is never written.
    pub async fn generate(
        &self,
        photo: &Photo,
        spec: &ThumbnailSpec,
        source_keys: &HashSet<String>,
    ) -> Result<ArtifactRef, GenerationError> {
        let key = keys::artifact_key(&photo.owner, &photo.name, &spec.name);
        if source_keys.contains(&key) {
            return Err(GenerationError::KeyConflict(key));
        }

        match tokio::time::timeout(self.timeout, self.generate_inner(photo, spec, key)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::TimedOut(self.timeout)),
        }
    }

    async fn generate_inner(
        &self,
        photo: &Photo,
        spec: &ThumbnailSpec,
        key: String,
    ) -> Result<ArtifactRef, GenerationError> {
        let start = std::time::Instant::now();

        let source = match self.storage.get(&photo.storage_path).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(key)) => return Err(GenerationError::SourceMissing(key)),
            Err(e) => return Err(e.into()),
        };

        let (max_width, max_height) = spec.bounds();
        let png = tokio::task::spawn_blocking(move || render_png(&source, max_width, max_height))
            .await
            .map_err(|e| GenerationError::Join(e.to_string()))??;

        let url = self.storage.put(&key, png).await?;

        tracing::debug!(
            photo_id = %photo.id,
            spec = %spec.name,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail generated"
        );

        Ok(ArtifactRef { key, url })
    }
}

/// Decode, shrink to fit and encode as PNG. CPU bound.
fn render_png(source: &[u8], max_width: u32, max_height: u32) -> Result<Vec<u8>, GenerationError> {
    let img = image::load_from_memory(source).map_err(|e| GenerationError::Decode(e.to_string()))?;
    let thumbnail = ImageResize::resize_to_fit(&img, max_width, max_height);

    let mut encoded = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|e| GenerationError::Encode(e.to_string()))?;
    Ok(encoded.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
    use pictier_storage::LocalStorage;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn photo(storage_path: &str) -> Photo {
        Photo {
            id: Uuid::new_v4(),
            name: "cat".to_string(),
            owner: "alice".to_string(),
            storage_path: storage_path.to_string(),
            created_at: Utc::now(),
        }
    }

    fn spec(name: &str, max_width: i32, max_height: i32) -> ThumbnailSpec {
        ThumbnailSpec {
            id: Uuid::new_v4(),
            tier_id: Uuid::new_v4(),
            name: name.to_string(),
            max_width,
            max_height,
        }
    }

    async fn generator(dir: &std::path::Path) -> (Arc<LocalStorage>, ThumbnailGenerator) {
        let storage = Arc::new(
            LocalStorage::new(dir, "http://localhost:4000/media".to_string())
                .await
                .unwrap(),
        );
        let generator = ThumbnailGenerator::new(storage.clone(), Duration::from_secs(30));
        (storage, generator)
    }

    #[tokio::test]
    async fn generates_png_fitting_the_box() {
        let dir = tempdir().unwrap();
        let (storage, generator) = generator(dir.path()).await;
        storage
            .put("user_alice/cat.png", png_fixture(1000, 500))
            .await
            .unwrap();

        let artifact = generator
            .generate(&photo("user_alice/cat.png"), &spec("small", 200, 200), &HashSet::new())
            .await
            .unwrap();

        assert_eq!(artifact.key, "user_alice/cat_small.png");
        assert_eq!(
            artifact.url,
            "http://localhost:4000/media/user_alice/cat_small.png"
        );
        let bytes = storage.get(&artifact.key).await.unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        let thumb = image::load_from_memory(&bytes).unwrap();
        assert_eq!(thumb.dimensions(), (200, 100));
    }

    #[tokio::test]
    async fn regeneration_is_byte_identical() {
        let dir = tempdir().unwrap();
        let (storage, generator) = generator(dir.path()).await;
        storage
            .put("user_alice/cat.png", png_fixture(640, 480))
            .await
            .unwrap();
        let photo = photo("user_alice/cat.png");
        let spec = spec("medium", 320, 320);

        let first = generator.generate(&photo, &spec, &HashSet::new()).await.unwrap();
        let first_bytes = storage.get(&first.key).await.unwrap();
        let second = generator.generate(&photo, &spec, &HashSet::new()).await.unwrap();
        let second_bytes = storage.get(&second.key).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[tokio::test]
    async fn missing_source_is_reported() {
        let dir = tempdir().unwrap();
        let (_, generator) = generator(dir.path()).await;

        let result = generator
            .generate(&photo("user_alice/gone.png"), &spec("small", 100, 100), &HashSet::new())
            .await;
        assert!(matches!(result, Err(GenerationError::SourceMissing(_))));
    }

    #[tokio::test]
    async fn corrupt_source_fails_to_decode() {
        let dir = tempdir().unwrap();
        let (storage, generator) = generator(dir.path()).await;
        storage
            .put("user_alice/cat.png", b"definitely not a png".to_vec())
            .await
            .unwrap();

        let result = generator
            .generate(&photo("user_alice/cat.png"), &spec("small", 100, 100), &HashSet::new())
            .await;
        assert!(matches!(result, Err(GenerationError::Decode(_))));
        assert!(!storage.exists("user_alice/cat_small.png").await.unwrap());
    }

    #[tokio::test]
    async fn never_overwrites_another_photos_source() {
        let dir = tempdir().unwrap();
        let (storage, generator) = generator(dir.path()).await;
        storage
            .put("user_alice/cat.png", png_fixture(400, 400))
            .await
            .unwrap();
        let original = png_fixture(1000, 800);
        storage
            .put("user_alice/cat_small.png", original.clone())
            .await
            .unwrap();
        let source_keys: HashSet<String> = ["user_alice/cat.png", "user_alice/cat_small.png"]
            .into_iter()
            .map(String::from)
            .collect();

        let result = generator
            .generate(&photo("user_alice/cat.png"), &spec("small", 100, 100), &source_keys)
            .await;

        assert!(matches!(result, Err(GenerationError::KeyConflict(ref key)) if key == "user_alice/cat_small.png"));
        assert_eq!(storage.get("user_alice/cat_small.png").await.unwrap(), original);
    }
}
