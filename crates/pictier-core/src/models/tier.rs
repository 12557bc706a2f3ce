use std::borrow::Cow;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::models::photo::validate_path_segment;

pub const MIN_EXPIRATION_SECS: i32 = 300;
pub const MAX_EXPIRATION_SECS: i32 = 30_000;
pub const MAX_TIER_NAME_LEN: u64 = 20;

/// Capability tier assigned to a user.
///
/// `expiration_time` (seconds) is present and within
/// [`MIN_EXPIRATION_SECS`, `MAX_EXPIRATION_SECS`] exactly when `expiring_links` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[validate(schema(function = "validate_expiration"))]
pub struct AccessTier {
    pub id: Uuid,
    #[validate(length(
        min = 1,
        max = 20,
        message = "Ensure this field has no more than 20 characters."
    ))]
    pub name: String,
    pub original_links: bool,
    pub expiring_links: bool,
    pub expiration_time: Option<i32>,
}

impl AccessTier {
    /// Validity window for expiring links, if this tier has one.
    pub fn ttl(&self) -> Option<Duration> {
        self.expiration_time
            .and_then(|secs| u64::try_from(secs).ok())
            .map(Duration::from_secs)
    }

    /// Rejects tiers that break the expiration invariant. Used when loading rows.
    pub fn ensure_consistent(&self) -> Result<(), AppError> {
        self.validate().map_err(|e| {
            AppError::Config(format!("access tier '{}' is invalid: {}", self.name, e))
        })
    }
}

fn validate_expiration(tier: &AccessTier) -> Result<(), ValidationError> {
    match (tier.expiring_links, tier.expiration_time) {
        (true, None) => Err(ValidationError::new("expiration_required")
            .with_message(Cow::from("Expiring links require an expiration time."))),
        (false, Some(_)) => Err(ValidationError::new("expiration_not_allowed").with_message(
            Cow::from("Expiration time is only allowed when expiring links are enabled."),
        )),
        (true, Some(secs)) if secs < MIN_EXPIRATION_SECS => {
            Err(ValidationError::new("expiration_too_short")
                .with_message(Cow::from("Expiration time must be at least 300 seconds.")))
        }
        (true, Some(secs)) if secs > MAX_EXPIRATION_SECS => {
            Err(ValidationError::new("expiration_too_long")
                .with_message(Cow::from("Expiration time must be at most 30000 seconds.")))
        }
        _ => Ok(()),
    }
}

/// A named bounding box for derived thumbnails, owned by one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ThumbnailSpec {
    pub id: Uuid,
    pub tier_id: Uuid,
    #[validate(
        length(
            min = 1,
            max = 20,
            message = "Ensure this field has no more than 20 characters."
        ),
        custom(function = "validate_path_segment")
    )]
    pub name: String,
    #[validate(range(min = 1, message = "Width must be a positive number of pixels"))]
    pub max_width: i32,
    #[validate(range(min = 1, message = "Height must be a positive number of pixels"))]
    pub max_height: i32,
}

impl ThumbnailSpec {
    /// Bounding box as unsigned pixel dimensions.
    pub fn bounds(&self) -> (u32, u32) {
        (
            u32::try_from(self.max_width).unwrap_or(1).max(1),
            u32::try_from(self.max_height).unwrap_or(1).max(1),
        )
    }

    pub fn ensure_consistent(&self) -> Result<(), AppError> {
        self.validate().map_err(|e| {
            AppError::Config(format!("thumbnail spec '{}' is invalid: {}", self.name, e))
        })
    }
}
