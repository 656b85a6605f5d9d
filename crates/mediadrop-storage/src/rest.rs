//! Object-storage REST API backend.
//!
//! Talks to a bucket/object HTTP API authenticated with a service key:
//!
//! - `POST   {api}/object/{bucket}/{key}` stores an object
//! - `DELETE {api}/object/{bucket}` with `{"prefixes": [...]}` removes objects
//! - `GET    {api}/bucket/{name}`, `POST {api}/bucket`, `PUT {api}/bucket/{name}` manage buckets
//! - `{api}/object/public/{bucket}/{key}` serves public objects
//!
//! Error bodies are JSON of the form `{"statusCode": "413", "error": "...", "message": "..."}`.
//! The embedded `statusCode` takes precedence over the HTTP status, which some deployments
//! flatten to 400.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::traits::{encode_key, validate_key, BucketConfig, Storage, StorageError, StorageResult};
use crate::StorageBackend;

const MAX_ERROR_SNIPPET: usize = 200;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "statusCode")]
    status_code: Option<JsonValue>,
    error: Option<String>,
    message: Option<String>,
}

impl ApiErrorBody {
    fn embedded_status(&self) -> Option<u16> {
        match self.status_code.as_ref()? {
            JsonValue::String(s) => s.parse().ok(),
            JsonValue::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        }
    }

    fn text(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
struct BucketPayload<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_mime_types: Option<&'a [String]>,
}

impl<'a> BucketPayload<'a> {
    fn new(name: &'a str, config: &'a BucketConfig) -> Self {
        Self {
            id: name,
            name,
            public: config.public,
            file_size_limit: config.max_file_size,
            allowed_mime_types: config.allowed_mime_types.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct RemovePayload<'a> {
    prefixes: &'a [String],
}

/// REST object storage implementation
#[derive(Clone)]
pub struct RestStorage {
    client: Client,
    api_url: String,
    service_key: String,
}

impl RestStorage {
    /// Create a new RestStorage instance
    ///
    /// # Arguments
    /// * `api_url` - Storage API root (e.g., "https://project.example.co/storage/v1")
    /// * `service_key` - Key sent as bearer token and `apikey` header
    pub fn new(api_url: impl Into<String>, service_key: impl Into<String>) -> StorageResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(RestStorage {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/object/{}/{}", self.api_url, bucket, encode_key(key))
    }

    /// Convert a non-success response into a typed error.
    async fn error_from_response(response: Response) -> StorageError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => StorageError::Rejected {
                status: parsed.embedded_status().unwrap_or(status),
                message: parsed.text(),
            },
            Err(_) if status == 413 || status == 429 => StorageError::Rejected {
                status,
                message: snippet(&body),
            },
            Err(_) => StorageError::MalformedResponse(format!(
                "HTTP {}: response body is not valid JSON: {}",
                status,
                snippet(&body)
            )),
        }
    }

    async fn send(&self, request: RequestBuilder) -> StorageResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn create_bucket(&self, name: &str, config: &BucketConfig) -> StorageResult<()> {
        let url = format!("{}/bucket", self.api_url);
        self.send(self.client.post(url).json(&BucketPayload::new(name, config)))
            .await?;
        tracing::info!(bucket = %name, public = config.public, "Storage bucket created");
        Ok(())
    }

    async fn update_bucket(&self, name: &str, config: &BucketConfig) -> StorageResult<()> {
        let url = format!("{}/bucket/{}", self.api_url, name);
        self.send(self.client.put(url).json(&BucketPayload::new(name, config)))
            .await?;
        tracing::debug!(bucket = %name, "Storage bucket settings reconciled");
        Ok(())
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(MAX_ERROR_SNIPPET).collect()
}

#[async_trait]
impl Storage for RestStorage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let size = data.len();
        let start = Instant::now();

        let request = self
            .client
            .post(self.object_url(bucket, key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(data);

        let response = self.send(request).await.inspect_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "REST storage upload failed"
            );
        })?;

        // A success status with an undecodable body is treated like any other malformed reply.
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        if !body.trim().is_empty() && serde_json::from_str::<JsonValue>(&body).is_err() {
            return Err(StorageError::MalformedResponse(format!(
                "upload response is not valid JSON: {}",
                snippet(&body)
            )));
        }

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "REST storage upload successful"
        );

        Ok(self.public_url(bucket, key))
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> StorageResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let start = Instant::now();
        let url = format!("{}/object/{}", self.api_url, bucket);

        self.send(
            self.client
                .delete(url)
                .json(&RemovePayload { prefixes: keys }),
        )
        .await
        .inspect_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key_count = keys.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "REST storage remove failed"
            );
        })?;

        tracing::info!(
            bucket = %bucket,
            key_count = keys.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "REST storage remove successful"
        );

        Ok(())
    }

    async fn ensure_bucket(&self, name: &str, config: &BucketConfig) -> StorageResult<()> {
        let url = format!("{}/bucket/{}", self.api_url, name);
        match self.send(self.client.get(url)).await {
            Ok(_) => self.update_bucket(name, config).await,
            Err(e) if e.status() == Some(404) => self.create_bucket(name, config).await,
            Err(e) => Err(e),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.api_url,
            bucket,
            encode_key(key)
        )
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    async fn storage(server: &mockito::Server) -> RestStorage {
        RestStorage::new(format!("{}/", server.url()), "service-key").unwrap()
    }

    #[tokio::test]
    async fn put_returns_public_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/object/images/uploads/a-1.png")
            .match_header("authorization", "Bearer service-key")
            .match_header("apikey", "service-key")
            .match_header("content-type", "image/png")
            .with_status(200)
            .with_body(r#"{"Key":"images/uploads/a-1.png"}"#)
            .create_async()
            .await;

        let storage = storage(&server).await;
        let url = storage
            .put("images", "uploads/a-1.png", b"png".to_vec(), "image/png")
            .await
            .unwrap();

        assert_eq!(
            url,
            format!("{}/object/public/images/uploads/a-1.png", server.url())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn embedded_status_code_is_preferred() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/object/images/big.mp4")
            .with_status(400)
            .with_body(
                r#"{"statusCode":"413","error":"Payload too large","message":"The object exceeded the maximum allowed size"}"#,
            )
            .create_async()
            .await;

        let err = storage(&server)
            .await
            .put("images", "big.mp4", vec![0; 4], "video/mp4")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(413));
    }

    #[tokio::test]
    async fn html_error_body_is_malformed_unless_status_is_typed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/object/images/a.png")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;
        server
            .mock("POST", "/object/images/b.png")
            .with_status(429)
            .with_body("<html>Too Many Requests</html>")
            .create_async()
            .await;

        let storage = storage(&server).await;
        let err = storage
            .put("images", "a.png", vec![1], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MalformedResponse(_)));

        let err = storage
            .put("images", "b.png", vec![1], "image/png")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(429));
    }

    #[tokio::test]
    async fn remove_sends_prefixes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/object/images")
            .match_body(Matcher::Json(json!({"prefixes": ["a.png", "b.png"]})))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        storage(&server)
            .await
            .remove("images", &["a.png".to_string(), "b.png".to_string()])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ensure_bucket_creates_missing_bucket() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bucket/images")
            .with_status(400)
            .with_body(r#"{"statusCode":"404","error":"Bucket not found","message":"Bucket not found"}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/bucket")
            .match_body(Matcher::PartialJson(json!({
                "name": "images",
                "public": true,
                "file_size_limit": 52428800
            })))
            .with_status(200)
            .with_body(r#"{"name":"images"}"#)
            .create_async()
            .await;

        let config = BucketConfig::public(52_428_800, vec!["image/png".to_string()]);
        storage(&server)
            .await
            .ensure_bucket("images", &config)
            .await
            .unwrap();
        create.assert_async().await;
    }
}
