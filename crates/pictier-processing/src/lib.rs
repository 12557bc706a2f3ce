//! Image processing for Pictier: fit-within resizing, thumbnail generation
//! and upload validation.

pub mod resize;
pub mod thumbnail;
pub mod validator;

pub use resize::ImageResize;
pub use thumbnail::{ArtifactRef, GenerationError, ThumbnailGenerator};
pub use validator::{UploadValidationError, UploadValidator, ALLOWED_EXTENSIONS};
