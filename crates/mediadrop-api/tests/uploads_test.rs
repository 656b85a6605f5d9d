//! Upload API integration tests.
//!
//! Run with: `cargo test -p mediadrop-api --test uploads_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{create_minimal_png, png_part};
use helpers::{api_path, setup_test_app, setup_test_app_with};
use mediadrop_api::test_helpers::MockFailure;
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn test_single_upload_sanitizes_key() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(create_minimal_png())
                .file_name("My Photo #1.JPG")
                .mime_type("image/jpeg"),
        )
        .add_text("folder", "uploads/single");

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "uploaded");
    assert_eq!(body["record"]["file_type"], "image/jpeg");
    assert_eq!(body["record"]["filename"], "My Photo #1.JPG");

    let key = body["storagePath"].as_str().unwrap();
    assert!(key.starts_with("uploads/single/my-photo-1-"), "key {}", key);
    assert!(key.ends_with(".JPG"));
    assert!(app.storage.contains("images", key));
    assert_eq!(app.assets.len(), 1);
}

#[tokio::test]
async fn test_single_upload_without_file_is_bad_request() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_text("folder", "uploads");
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_single_upload_disallowed_type_is_unprocessable() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"plain text".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "ValidationError");
    assert!(app.storage.put_calls().is_empty());
}

#[tokio::test]
async fn test_single_upload_degraded_when_record_fails() {
    let app = setup_test_app();
    app.assets.fail_inserts(true);

    let form = MultipartForm::new().add_part("file", png_part("a.png"));
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["warning"], "File uploaded but metadata was not saved");
    assert_eq!(body["error"]["kind"], "MetadataWriteFailed");
    assert!(body["publicUrl"].as_str().is_some());
    assert!(body.get("record").is_none());
}

#[tokio::test]
async fn test_upload_associates_known_user() {
    let app = setup_test_app();
    let user_id = Uuid::new_v4();
    app.users.add_user(user_id);

    let form = MultipartForm::new()
        .add_part("file", png_part("a.png"))
        .add_text("user_id", user_id.to_string());
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["record"]["user_id"], user_id.to_string());
}

#[tokio::test]
async fn test_malformed_user_id_is_rejected() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_part("file", png_part("a.png"))
        .add_text("user_id", "not-a-uuid");
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_batch_upload_rate_limit_short_circuit() {
    let app = setup_test_app();
    app.storage
        .fail_put_at(1, MockFailure::Status(429, "Too Many Requests".to_string()));

    let form = MultipartForm::new()
        .add_part("files", png_part("one.png"))
        .add_part("files", png_part("two.png"))
        .add_part("files", png_part("three.png"))
        .add_text("folder", "uploads/batch");
    let response = app
        .client()
        .post(&api_path("/uploads/batch"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["totalFiles"], 3);
    assert_eq!(body["successfulUploads"], 1);
    assert_eq!(body["rateLimitHit"], true);

    let outcomes = body["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["success"], true);
    assert_eq!(outcomes[1]["error"]["kind"], "RateLimited");
    assert_eq!(outcomes[1]["skipped"], false);
    assert_eq!(outcomes[2]["filename"], "three.png");
    assert_eq!(outcomes[2]["skipped"], true);
    assert_eq!(outcomes[2]["error"]["message"], "Skipped due to rate limiting");
}

#[tokio::test]
async fn test_batch_upload_rejects_empty_batch() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_text("folder", "uploads");
    let response = app
        .client()
        .post(&api_path("/uploads/batch"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_upload_rejects_too_many_files() {
    let app = setup_test_app_with(&[("MAX_BATCH_FILES", "2")]);

    let form = MultipartForm::new()
        .add_part("files[]", png_part("a.png"))
        .add_part("files[]", png_part("b.png"))
        .add_part("files[]", png_part("c.png"));
    let response = app
        .client()
        .post(&api_path("/uploads/batch"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.storage.put_calls().is_empty());
}

#[tokio::test]
async fn test_batch_upload_rejects_oversized_files() {
    let app = setup_test_app_with(&[("MAX_FILE_SIZE_MB", "1")]);

    let form = MultipartForm::new()
        .add_part("files", png_part("small.png"))
        .add_part(
            "files",
            Part::bytes(vec![0u8; 2 * 1024 * 1024])
                .file_name("large.png")
                .mime_type("image/png"),
        );
    let response = app
        .client()
        .post(&api_path("/uploads/batch"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("large.png"));
    assert!(app.storage.put_calls().is_empty());
}

#[tokio::test]
async fn test_health_reports_backend() {
    let app = setup_test_app();

    let response = app.client().get(&api_path("/health")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "local");

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
