//! OpenAPI documentation, served at `/api/openapi.json` and browsable under `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Account API key"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pictier API",
        version = "0.1.0",
        description = "Photo uploads with tier-controlled thumbnail links. Plain links point at public thumbnails; expiring links carry an encrypted token that stays valid for the caller's tier expiration time."
    ),
    paths(
        handlers::photos::list_photos,
        handlers::photos::generate_links,
        handlers::photos::generate_expiring_links,
        handlers::photos::add_photo,
        handlers::photos::delete_photo,
        handlers::download::download,
        handlers::health::health_check,
    ),
    components(
        schemas(
            error::ErrorResponse,
            handlers::photos::PhotoSummary,
            handlers::photos::PhotoLinksResponse,
            handlers::health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "photos", description = "Photo listing, upload, deletion and link generation"),
        (name = "download", description = "Resolution of expiring download links"),
        (name = "config", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
