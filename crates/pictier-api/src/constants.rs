//! API-wide constants.

pub const SERVICE_NAME: &str = "pictier-api";

/// Public prefix under which stored files are served.
pub const MEDIA_PREFIX: &str = "/media";

/// Photos whose links are built concurrently within one request.
pub const PHOTO_CONCURRENCY: usize = 4;

/// Server-wide cap on requests handled at once.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;
