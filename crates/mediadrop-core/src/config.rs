//! Configuration module
//!
//! This module provides the environment-driven configuration for the API: server, database,
//! storage backend selection and the upload limits applied by the batch orchestrator.

use std::env;
use std::time::Duration;

use crate::constants::{
    ALLOWED_CONTENT_TYPES, DEFAULT_BUCKET, DEFAULT_MAX_BATCH_FILES, DEFAULT_UPLOAD_PACING_MS,
};
use crate::storage_types::StorageBackend;
use crate::validation::UploadLimits;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 50;
const MAX_REQUEST_BODY_MB: usize = 1024;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Server and database settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub max_request_body_bytes: usize,
    pub http_concurrency_limit: usize,
}

#[derive(Clone, Debug)]
pub struct MediadropConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub storage_bucket: String,
    pub storage_api_url: Option<String>,
    pub storage_service_key: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // MinIO and other S3-compatible providers
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub ensure_bucket_on_startup: bool,
    // Upload configuration
    pub max_file_size_bytes: usize,
    pub max_batch_files: usize,
    pub upload_pacing_ms: u64,
    pub allowed_content_types: Vec<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediadropConfig>);

impl Config {
    fn inner(&self) -> &MediadropConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = MediadropConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.inner().base.max_request_body_bytes
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().base.http_concurrency_limit
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn storage_bucket(&self) -> &str {
        &self.inner().storage_bucket
    }

    pub fn storage_api_url(&self) -> Option<&str> {
        self.inner().storage_api_url.as_deref()
    }

    pub fn storage_service_key(&self) -> Option<&str> {
        self.inner().storage_service_key.as_deref()
    }

    /// S3 region, preferring `S3_REGION` over `AWS_REGION`
    pub fn s3_region(&self) -> Option<&str> {
        self.inner()
            .s3_region
            .as_deref()
            .or(self.inner().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn ensure_bucket_on_startup(&self) -> bool {
        self.inner().ensure_bucket_on_startup
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn max_batch_files(&self) -> usize {
        self.inner().max_batch_files
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.inner().allowed_content_types
    }

    /// Delay inserted between consecutive files of a batch
    pub fn upload_pacing(&self) -> Duration {
        Duration::from_millis(self.inner().upload_pacing_ms)
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size: self.inner().max_file_size_bytes,
            max_batch_files: self.inner().max_batch_files,
            allowed_content_types: self.inner().allowed_content_types.clone(),
        }
    }

    /// Body limit for the HTTP layer: a full batch at the per-file cap, bounded by
    /// `MAX_REQUEST_BODY_MB`.
    pub fn request_body_limit(&self) -> usize {
        self.max_file_size_bytes()
            .saturating_mul(self.max_batch_files())
            .min(self.max_request_body_bytes())
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl MediadropConfig {
    /// Build configuration from a variable lookup (the process environment in production).
    pub fn from_lookup<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = var("MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB);

        let max_request_body_mb = var("MAX_REQUEST_BODY_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_REQUEST_BODY_MB);

        let allowed_content_types = var("ALLOWED_CONTENT_TYPES")
            .map(|s| split_list(&s))
            .unwrap_or_else(|| ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect());

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::Rest,
        };

        let base = BaseConfig {
            server_port: var("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SERVER_PORT),
            cors_origins,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: var("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            max_request_body_bytes: max_request_body_mb * 1024 * 1024,
            http_concurrency_limit: var("HTTP_CONCURRENCY_LIMIT")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
        };

        Ok(MediadropConfig {
            base,
            database_url: var("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            storage_bucket: var("STORAGE_BUCKET")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            storage_api_url: var("STORAGE_API_URL").map(|s| s.trim_end_matches('/').to_string()),
            storage_service_key: var("STORAGE_SERVICE_KEY"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            ensure_bucket_on_startup: var("ENSURE_BUCKET_ON_STARTUP")
                .map(|s| parse_bool(&s))
                .unwrap_or(true),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_batch_files: var("MAX_BATCH_FILES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BATCH_FILES),
            upload_pacing_ms: var("UPLOAD_PACING_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_PACING_MS),
            allowed_content_types,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.max_batch_files == 0 {
            return Err(anyhow::anyhow!("MAX_BATCH_FILES must be greater than 0"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES must not be empty"));
        }

        match self.storage_backend {
            StorageBackend::Rest => {
                if self.storage_api_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "STORAGE_API_URL must be set when using the rest storage backend"
                    ));
                }
                if self.storage_service_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "STORAGE_SERVICE_KEY must be set when using the rest storage backend"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
