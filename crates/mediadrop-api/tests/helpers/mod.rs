//! Test helpers: build AppState and router over in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p mediadrop-api`. No database or network is
//! needed; storage and both stores are the mocks from `mediadrop_api::test_helpers`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use mediadrop_api::constants;
use mediadrop_api::setup::routes;
use mediadrop_api::test_helpers::{MockAssetStore, MockStorage, MockUserDirectory};
use mediadrop_api::AppState;
use mediadrop_core::config::MediadropConfig;
use mediadrop_core::Config;
use std::collections::HashMap;
use std::sync::Arc;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus handles on the mocks behind it.
pub struct TestApp {
    pub server: TestServer,
    pub storage: MockStorage,
    pub assets: MockAssetStore,
    pub users: MockUserDirectory,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgresql://localhost/mediadrop_test"),
        ("STORAGE_BACKEND", "local"),
        ("LOCAL_STORAGE_PATH", "/tmp/mediadrop-test"),
        ("LOCAL_STORAGE_BASE_URL", "http://localhost:4000/media"),
        ("UPLOAD_PACING_MS", "0"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }

    let inner = MediadropConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("test configuration should parse");
    Config(Box::new(inner))
}

/// Setup test app with default limits.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(&[])
}

/// Setup test app with configuration overrides (e.g. `("MAX_BATCH_FILES", "2")`).
pub fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let config = test_config(overrides);
    let storage = MockStorage::new();
    let assets = MockAssetStore::new();
    let users = MockUserDirectory::new();

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(storage.clone()),
        Arc::new(assets.clone()),
        Arc::new(users.clone()),
    ));
    let router = routes::setup_routes(&config, state).expect("routes should build");
    let server = TestServer::new(router).expect("test server should start");

    TestApp {
        server,
        storage,
        assets,
        users,
    }
}
