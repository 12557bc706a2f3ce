//! Storage abstraction for Pictier.
//!
//! Keys are relative paths under the media root. Source photos live at
//! `user_{owner}/{file}` and derived thumbnails at
//! `user_{owner}/{photo}_{spec}.png`; see [`keys`].

pub mod keys;
pub mod local;
pub mod traits;

pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};

use pictier_core::AppError;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}
