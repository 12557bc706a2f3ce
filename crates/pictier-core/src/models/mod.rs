pub mod links;
pub mod photo;
pub mod tier;
pub mod user;

pub use links::{LinkMode, LinkResult, PhotoLinks, EXPIRING_LINKS_DENIED};
pub use photo::{NewPhoto, Photo, MAX_PHOTO_NAME_LEN};
pub use tier::{
    AccessTier, ThumbnailSpec, MAX_EXPIRATION_SECS, MAX_TIER_NAME_LEN, MIN_EXPIRATION_SECS,
};
pub use user::User;
