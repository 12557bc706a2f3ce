//! Pictier Core Library
//!
//! Domain models, error types, configuration, the link token codec and the
//! repository traits shared by every Pictier crate.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod token;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AccessTier, LinkMode, LinkResult, NewPhoto, Photo, PhotoLinks, ThumbnailSpec, User,
    EXPIRING_LINKS_DENIED,
};
pub use repository::{PhotoCatalog, TierRegistry, UserDirectory};
pub use token::{TokenCodec, TokenError};
