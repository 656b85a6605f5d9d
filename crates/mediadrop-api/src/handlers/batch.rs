use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::multipart::read_upload_form;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use mediadrop_core::models::BatchUploadResult;
use std::sync::Arc;

/// Upload many files in one request. The response always carries one outcome per file,
/// in submission order.
#[utoipa::path(
    post,
    path = "/api/v0/uploads/batch",
    tag = "uploads",
    request_body(content = String, description = "Multipart form with repeated `files` (or `file`) fields and optional `folder` and `user_id` fields", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch processed", body = BatchUploadResult),
        (status = 400, description = "Empty batch or too many files", body = ErrorResponse),
        (status = 413, description = "One or more files exceed the size limit", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_batch"))]
pub async fn upload_batch(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<BatchUploadResult>, HttpAppError> {
    let form = read_upload_form(multipart).await?;

    let result = state
        .batch_uploader
        .upload_batch(form.files, form.folder.as_deref(), form.user_id)
        .await?;

    Ok(Json(result))
}
