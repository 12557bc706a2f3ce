use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use pictier_core::{AppError, UserDirectory};
use pictier_db::hash_api_key;

use crate::auth::models::AuthUser;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserDirectory>,
}

fn unauthorized(reason: &str) -> Response {
    HttpAppError(AppError::Unauthorized(reason.to_string())).into_response()
}

/// Resolve `Authorization: Bearer <api key>` to a user, or answer 401.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            tracing::debug!("Request without authorization header");
            return unauthorized("Missing authorization header");
        }
    };

    let api_key = match auth_header.strip_prefix("Bearer ") {
        Some(key) if !key.trim().is_empty() => key.trim(),
        _ => return unauthorized("Invalid authorization header format"),
    };

    let user = match auth_state
        .users
        .find_by_api_key_hash(&hash_api_key(api_key))
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!("Rejected unknown API key");
            return unauthorized("Invalid API key");
        }
        Err(e) => return HttpAppError(e).into_response(),
    };

    request.extensions_mut().insert(AuthUser(user));

    next.run(request).await
}
