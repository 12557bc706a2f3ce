//! Photo lifecycle operations: removing a photo's files from storage.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use pictier_core::{Photo, ThumbnailSpec};
use pictier_storage::{keys, Storage};

const DELETE_CONCURRENCY: usize = 8;

pub struct PhotoLifecycleService;

impl PhotoLifecycleService {
    /// Delete the source file and every thumbnail derived for `specs`.
    /// Keys in `kept_sources` belong to other photos and are left alone.
    /// Best-effort: failures are logged, never returned.
    pub async fn delete_photo_files(
        storage: &Arc<dyn Storage>,
        photo: &Photo,
        specs: &[ThumbnailSpec],
        kept_sources: &HashSet<String>,
    ) {
        let mut storage_keys = vec![photo.storage_path.clone()];
        storage_keys.extend(
            specs
                .iter()
                .map(|spec| keys::artifact_key(&photo.owner, &photo.name, &spec.name)),
        );
        storage_keys.retain(|key| !kept_sources.contains(key));

        stream::iter(storage_keys)
            .for_each_concurrent(DELETE_CONCURRENCY, |key| async move {
                if let Err(e) = storage.delete(&key).await {
                    tracing::warn!(
                        error = %e,
                        photo_id = %photo.id,
                        storage_key = %key,
                        "Failed to delete photo file from storage"
                    );
                }
            })
            .await;
    }
}
