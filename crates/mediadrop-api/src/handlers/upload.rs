use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::multipart::read_upload_form;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use mediadrop_core::models::UploadOutcome;
use mediadrop_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v0/uploads",
    tag = "uploads",
    request_body(content = String, description = "Multipart form with one `file` field and optional `folder` and `user_id` fields", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File uploaded (possibly degraded)", body = UploadOutcome),
        (status = 400, description = "Malformed form or missing file", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 422, description = "Upload failed", body = UploadOutcome)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadOutcome>), HttpAppError> {
    let form = read_upload_form(multipart).await?;

    if form.files.len() > 1 {
        return Err(HttpAppError::from(AppError::BadRequest(
            "Multiple files provided; use /uploads/batch".to_string(),
        )));
    }
    let file = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let outcome = state
        .upload_service
        .upload(file, form.folder.as_deref(), form.user_id)
        .await;

    let status = if outcome.success {
        StatusCode::CREATED
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(outcome)))
}
