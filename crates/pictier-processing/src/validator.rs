use std::path::Path;

/// Extensions accepted for uploaded photos.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Problems with an uploaded image file.
///
/// `Display` is the message shown to the client for the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadValidationError {
    #[error("Only JPG and PNG files are allowed.")]
    InvalidExtension { extension: Option<String> },

    #[error("The submitted file is empty.")]
    EmptyFile,

    #[error("Ensure this file is no larger than {max} bytes (it is {size} bytes).")]
    FileTooLarge { size: usize, max: usize },

    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    NotAnImage,
}

/// Validates uploaded photos before they are stored.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
}

impl UploadValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Validate file extension against [`ALLOWED_EXTENSIONS`], case-insensitively.
    pub fn validate_extension(&self, filename: &str) -> Result<(), UploadValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            extension => Err(UploadValidationError::InvalidExtension { extension }),
        }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), UploadValidationError> {
        if size == 0 {
            return Err(UploadValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(UploadValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Fully decode `data` to make sure it is a readable JPEG or PNG. CPU bound.
    pub fn validate_image(&self, data: &[u8]) -> Result<(), UploadValidationError> {
        let format = image::guess_format(data).map_err(|_| UploadValidationError::NotAnImage)?;
        if !matches!(format, image::ImageFormat::Jpeg | image::ImageFormat::Png) {
            return Err(UploadValidationError::NotAnImage);
        }
        image::load_from_memory_with_format(data, format)
            .map(|_| ())
            .map_err(|_| UploadValidationError::NotAnImage)
    }
}
