//! Application state shared by every handler.
//!
//! Built once at startup and handed to the router as `Arc<AppState>`. Nothing in
//! here changes while the server runs.

use std::sync::Arc;

use pictier_core::{AppError, Config, PhotoCatalog, TierRegistry, TokenCodec, UserDirectory};
use pictier_processing::{ThumbnailGenerator, UploadValidator};
use pictier_storage::Storage;

use crate::services::download_resolver::DownloadResolver;
use crate::services::link_issuer::LinkIssuer;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tiers: Arc<dyn TierRegistry>,
    pub photos: Arc<dyn PhotoCatalog>,
    pub users: Arc<dyn UserDirectory>,
    pub storage: Arc<dyn Storage>,
    pub upload_validator: UploadValidator,
    pub link_issuer: LinkIssuer,
    pub download_resolver: DownloadResolver,
}

impl AppState {
    /// Wire the services around the given repositories and storage.
    ///
    /// Fails when the link token key in `config` is not a valid 32-byte key.
    pub fn new(
        config: Config,
        tiers: Arc<dyn TierRegistry>,
        photos: Arc<dyn PhotoCatalog>,
        users: Arc<dyn UserDirectory>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, AppError> {
        let codec = TokenCodec::from_base64_key(&config.link_token_key)?;
        let generator = ThumbnailGenerator::new(storage.clone(), config.generation_timeout());

        let link_issuer = LinkIssuer::new(
            generator,
            storage.clone(),
            codec.clone(),
            config.public_base_url.clone(),
        );
        let download_resolver = DownloadResolver::new(codec, storage.clone());
        let upload_validator = UploadValidator::new(config.max_file_size_bytes);

        Ok(Self {
            config,
            tiers,
            photos,
            users,
            storage,
            upload_validator,
            link_issuer,
            download_resolver,
        })
    }
}
