//! OpenAPI documentation.
//! API version is in `crate::constants::API_VERSION`.
//! Paths in handler annotations use placeholder /api/v0; they are transformed at runtime to the actual version.

use utoipa::OpenApi;

use crate::constants::API_VERSION;
use crate::error;
use crate::handlers;
use mediadrop_core::{error as core_error, models};

/// Placeholder version used in handler path annotations (utoipa requires compile-time literals).
const OPENAPI_PATH_PLACEHOLDER: &str = "/api/v0";

/// Transforms path keys in the OpenAPI spec from placeholder to actual API version.
fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, version: &str) {
    let replacement = format!("/api/{}", version);
    if OPENAPI_PATH_PLACEHOLDER == replacement {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = key.replacen(OPENAPI_PATH_PLACEHOLDER, &replacement, 1);
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with path placeholders replaced by the current API version.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, API_VERSION);
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediadrop API",
        version = "0.1.0",
        description = "Batch media upload into object storage with asset metadata in PostgreSQL. Uploads are paced, classified per file, and short-circuit on storage rate limits. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::batch::upload_batch,
        handlers::assets::list_assets,
        handlers::assets::get_asset,
        handlers::assets::delete_asset,
        handlers::assets::delete_assets,
        handlers::health::health_check,
    ),
    components(schemas(
        models::UploadOutcome,
        models::OutcomeStatus,
        models::BatchUploadResult,
        models::AssetRecord,
        core_error::UploadError,
        core_error::UploadErrorKind,
        error::ErrorResponse,
        handlers::assets::DeleteAssetsResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "uploads", description = "Single and batch file uploads"),
        (name = "assets", description = "Asset listing and deletion"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
