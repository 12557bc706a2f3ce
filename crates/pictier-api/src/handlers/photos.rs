//! Photo listing, link generation, upload and deletion.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use pictier_core::{AppError, LinkMode, Photo, PhotoLinks, User};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::{link_issuer, upload, PhotoLifecycleService};
use crate::state::AppState;

/// Entry of the photo listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoSummary {
    pub id: Uuid,
    pub name: String,
    /// Upload date, `YYYY-MM-DD`.
    pub created_at: NaiveDate,
}

impl From<&Photo> for PhotoSummary {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            name: photo.name.clone(),
            created_at: photo.created_at.date_naive(),
        }
    }
}

/// A photo with the links the caller's tier allows.
#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoLinksResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: NaiveDate,
    /// Present only when the tier grants original links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_link: Option<String>,
    /// Spec name to URL, denial message, or `null` when the thumbnail could not be produced.
    pub thumbnail_links: BTreeMap<String, Option<String>>,
}

impl From<PhotoLinks> for PhotoLinksResponse {
    fn from(links: PhotoLinks) -> Self {
        Self {
            id: links.photo.id,
            name: links.photo.name,
            created_at: links.photo.created_at.date_naive(),
            original_link: links.original_link,
            thumbnail_links: links
                .thumbnail_links
                .into_iter()
                .map(|(name, link)| (name, link.as_str().map(String::from)))
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/photos/",
    tag = "photos",
    responses(
        (status = 200, description = "Photos owned by the caller", body = Vec<PhotoSummary>),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(
    skip(state, user),
    fields(username = %user.0.username, operation = "list_photos")
)]
pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let photos = state.photos.list_for_owner(&user.0.username).await?;
    let summaries: Vec<PhotoSummary> = photos.iter().map(PhotoSummary::from).collect();
    Ok(Json(summaries))
}

#[utoipa::path(
    get,
    path = "/photos/generate",
    tag = "photos",
    responses(
        (status = 200, description = "Public thumbnail links for every photo", body = Vec<PhotoLinksResponse>),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 403, description = "No access tier assigned", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(
    skip(state, user),
    fields(username = %user.0.username, operation = "generate_links")
)]
pub async fn generate_links(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let links = links_for_all_photos(&state, &user.0, LinkMode::Plain).await?;
    Ok(Json(links))
}

#[utoipa::path(
    get,
    path = "/photos/generateExpired",
    tag = "photos",
    responses(
        (status = 200, description = "Expiring download links for every photo, or the denial message per thumbnail", body = Vec<PhotoLinksResponse>),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 403, description = "No access tier assigned", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(
    skip(state, user),
    fields(username = %user.0.username, operation = "generate_expiring_links")
)]
pub async fn generate_expiring_links(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let links = links_for_all_photos(&state, &user.0, LinkMode::Expiring).await?;
    Ok(Json(links))
}

async fn links_for_all_photos(
    state: &AppState,
    user: &User,
    mode: LinkMode,
) -> Result<Vec<PhotoLinksResponse>, AppError> {
    let tier = state.tiers.capabilities_for(user).await?;
    let specs = state.tiers.thumbnail_specs_for(&tier).await?;
    let photos = state.photos.list_for_owner(&user.username).await?;

    let links = state
        .link_issuer
        .issue_for_photos(photos, &tier, &specs, mode, Utc::now())
        .await;

    tracing::debug!(
        photos = links.len(),
        specs = specs.len(),
        tier = %tier.name,
        "Links issued"
    );

    Ok(links.into_iter().map(PhotoLinksResponse::from).collect())
}

#[utoipa::path(
    post,
    path = "/photos/add",
    tag = "photos",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields `name`, `image` (JPG or PNG) and optional `expiring_links`"
    ),
    responses(
        (status = 201, description = "Photo stored; links for it", body = Vec<PhotoLinksResponse>),
        (status = 400, description = "Field errors", body = BTreeMap<String, Vec<String>>),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 403, description = "No access tier assigned", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(
    skip(state, user, multipart),
    fields(username = %user.0.username, operation = "add_photo")
)]
pub async fn add_photo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let tier = state.tiers.capabilities_for(&user.0).await?;
    let specs = state.tiers.thumbnail_specs_for(&tier).await?;

    let form = upload::read_upload_form(multipart).await?;
    let mode = LinkMode::from_expiring_flag(form.expiring_links);
    let photo = upload::store_upload(&state, &user.0, &specs, form).await?;

    let owned = state.photos.list_for_owner(&user.0.username).await?;
    let links = state
        .link_issuer
        .issue_links(
            &photo,
            &tier,
            &specs,
            mode,
            &link_issuer::source_keys(&owned),
            Utc::now(),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(vec![PhotoLinksResponse::from(links)]),
    ))
}

#[utoipa::path(
    delete,
    path = "/photos/delete/{id}",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Photo ID")
    ),
    responses(
        (status = 204, description = "Photo deleted"),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Photo not found", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(
    skip(state, user),
    fields(username = %user.0.username, photo_id = %id, operation = "delete_photo")
)]
pub async fn delete_photo(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let owner = &user.0.username;
    let photo = state
        .photos
        .get(owner, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

    // Thumbnails only exist for specs of the caller's tier.
    let specs = match state.tiers.capabilities_for(&user.0).await {
        Ok(tier) => state
            .tiers
            .thumbnail_specs_for(&tier)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Could not load thumbnail specs for cleanup");
                Vec::new()
            }),
        Err(_) => Vec::new(),
    };

    if !state.photos.delete(owner, id).await? {
        return Err(AppError::NotFound("Photo not found".to_string()).into());
    }

    // Without the remaining photos we cannot tell which keys are still sources.
    match state.photos.list_for_owner(owner).await {
        Ok(remaining) => {
            PhotoLifecycleService::delete_photo_files(
                &state.storage,
                &photo,
                &specs,
                &link_issuer::source_keys(&remaining),
            )
            .await
        }
        Err(e) => tracing::warn!(error = %e, "Skipping file cleanup, photo listing failed"),
    }
    tracing::info!(photo_id = %id, "Photo deleted");

    Ok(StatusCode::NO_CONTENT)
}
