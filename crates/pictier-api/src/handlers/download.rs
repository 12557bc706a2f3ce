use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use pictier_core::AppError;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/download/{token}",
    tag = "download",
    params(
        ("token" = String, Path, description = "Token from an expiring link")
    ),
    responses(
        (status = 302, description = "Redirect to the thumbnail"),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 403, description = "No access tier assigned", body = ErrorResponse),
        (status = 404, description = "Token is malformed, tampered with or expired", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(
    skip(state, user, token),
    fields(username = %user.0.username, operation = "download")
)]
pub async fn download(
    Path(token): Path<String>,
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let tier = state.tiers.capabilities_for(&user.0).await?;

    let storage_path = state
        .download_resolver
        .resolve(&token, &tier, Utc::now())
        .map_err(|e| {
            tracing::debug!(reason = e.reason(), "Download token rejected");
            AppError::from(e)
        })?;

    let location = state.download_resolver.redirect_url(&storage_path);
    Ok((StatusCode::FOUND, [(LOCATION, location)]))
}
