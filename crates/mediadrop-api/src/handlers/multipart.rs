//! Multipart form extraction shared by the upload handlers.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use mediadrop_core::models::UploadFile;
use mediadrop_core::AppError;
use uuid::Uuid;

/// Field names accepted as file parts.
const FILE_FIELDS: [&str; 3] = ["file", "files", "files[]"];

/// Parsed upload form: files in submission order plus the optional text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadFile>,
    pub folder: Option<String>,
    pub user_id: Option<Uuid>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Normalize the folder field: blank means none; traversal and absolute paths are refused.
fn parse_folder(raw: &str) -> Result<Option<String>, AppError> {
    let folder = raw.trim().trim_end_matches('/');
    if folder.is_empty() {
        return Ok(None);
    }
    if folder.starts_with('/') || folder.split('/').any(|segment| segment == "..") {
        return Err(AppError::InvalidInput(format!(
            "Invalid folder path: {}",
            raw
        )));
    }
    Ok(Some(folder.to_string()))
}

fn parse_user_id(raw: &str) -> Result<Option<Uuid>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("Invalid user_id: {}", raw)))
}

/// Read every part of an upload form into memory.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            name if FILE_FIELDS.contains(&name) => {
                let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;
                form.files
                    .push(UploadFile::new(filename, content_type, data.to_vec()));
            }
            "folder" => {
                let value = field.text().await.map_err(multipart_error)?;
                form.folder = parse_folder(&value)?;
            }
            "user_id" => {
                let value = field.text().await.map_err(multipart_error)?;
                form.user_id = parse_user_id(&value)?;
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder() {
        assert_eq!(parse_folder("").unwrap(), None);
        assert_eq!(parse_folder("  ").unwrap(), None);
        assert_eq!(
            parse_folder("uploads/batch/").unwrap(),
            Some("uploads/batch".to_string())
        );
        assert!(parse_folder("../etc").is_err());
        assert!(parse_folder("a/../b").is_err());
        assert!(parse_folder("/abs").is_err());
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("").unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), Some(id));
        assert!(matches!(
            parse_user_id("not-a-uuid"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
