//! API constants
//!
//! All routes are versioned under `API_PREFIX`.

/// Current API version segment
pub const API_VERSION: &str = "v0";

/// Versioned prefix for every route (`/api/v0`)
pub const API_PREFIX: &str = "/api/v0";

/// Path serving the OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";
