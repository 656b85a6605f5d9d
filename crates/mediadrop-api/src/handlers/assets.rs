use crate::error::{ErrorResponse, HttpAppError, ValidatedQuery};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mediadrop_core::models::{AssetFilter, AssetRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteAssetsQuery {
    /// Only delete assets owned by this user; omit to delete every asset
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteAssetsResponse {
    pub deleted: u64,
}

#[utoipa::path(
    get,
    path = "/api/v0/assets",
    tag = "assets",
    params(AssetFilter),
    responses(
        (status = 200, description = "Assets, newest first", body = Vec<AssetRecord>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_assets"))]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(filter): ValidatedQuery<AssetFilter>,
) -> Result<Json<Vec<AssetRecord>>, HttpAppError> {
    filter.validate()?;

    let records = state.asset_service.list(&filter).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/v0/assets/{id}",
    tag = "assets",
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset record", body = AssetRecord),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(asset_id = %id))]
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssetRecord>, HttpAppError> {
    let record = state.asset_service.get(id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/v0/assets/{id}",
    tag = "assets",
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(asset_id = %id, operation = "delete_asset"))]
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.asset_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v0/assets",
    tag = "assets",
    params(DeleteAssetsQuery),
    responses(
        (status = 200, description = "Assets deleted", body = DeleteAssetsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_assets"))]
pub async fn delete_assets(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<DeleteAssetsQuery>,
) -> Result<Json<DeleteAssetsResponse>, HttpAppError> {
    let deleted = state.asset_service.delete_all(query.user_id).await?;
    Ok(Json(DeleteAssetsResponse { deleted }))
}
