use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pictier_core::{AppError, User};

use crate::error::HttpAppError;

/// The account behind the request's API key, stored in request extensions by
/// [`auth_middleware`](super::middleware::auth_middleware).
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

// Extension cannot be combined with Multipart, so read straight from the parts.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Missing user context".to_string())))
    }
}
