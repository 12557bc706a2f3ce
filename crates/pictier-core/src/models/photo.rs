use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const MAX_PHOTO_NAME_LEN: u64 = 50;

/// An uploaded source image owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Photo {
    pub id: Uuid,
    pub name: String,
    /// Username of the owning account.
    pub owner: String,
    /// Storage key of the source file, relative to the media root.
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

/// Request to record a freshly stored photo.
#[derive(Debug, Clone, Validate)]
pub struct NewPhoto {
    #[validate(
        length(
            min = 1,
            max = 50,
            message = "Ensure this field has no more than 50 characters."
        ),
        custom(function = "validate_path_segment")
    )]
    pub name: String,
    pub owner: String,
    pub storage_path: String,
}

/// Names end up inside storage keys, so they must stay a single path segment.
pub(crate) fn validate_path_segment(value: &str) -> Result<(), ValidationError> {
    let unsafe_segment = value.contains('/')
        || value.contains('\\')
        || value.contains('\0')
        || value.contains("..");
    if unsafe_segment {
        return Err(ValidationError::new("path_segment")
            .with_message(Cow::from("Ensure this field contains no path separators.")));
    }
    Ok(())
}
