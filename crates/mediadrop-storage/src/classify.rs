//! Mapping of storage failures onto the per-file upload error taxonomy.
//!
//! Typed status codes are used when the backend exposes them. Otherwise the error text is
//! matched against known phrasings, which is the only place such string matching happens.
//! Error text usually embeds the storage key or request URL, so path-like tokens are dropped
//! before matching and bare digits never count as a status.

use std::sync::LazyLock;

use mediadrop_core::UploadError;
use regex::Regex;

use crate::traits::StorageError;

const OVERSIZED_PHRASES: [&str; 4] = [
    "payload too large",
    "entity too large",
    "maximum allowed size",
    "file too large",
];

const RATE_LIMIT_PHRASES: [&str; 3] = ["too many requests", "rate limit", "not valid json"];

/// `HTTP 429`, `HTTP/1.1 413`, `status 429`, `status code: 503`, `"statusCode":"413"`
static STATUS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:status(?:[ _]?code)?|http(?:/\d(?:\.\d)?)?)"?\s*[:=]?\s*"?(\d{3})\b"#)
        .expect("valid status pattern")
});

static HTTP_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^http/\d").expect("valid HTTP version pattern"));

/// Classify a storage failure as `OversizedFile`, `RateLimited` or `Unknown`.
pub fn classify_storage_error(err: &StorageError) -> UploadError {
    match err.status() {
        Some(413) => return UploadError::oversized(err.to_string()),
        Some(429) => return UploadError::rate_limited(err.to_string()),
        _ => {}
    }

    if let StorageError::MalformedResponse(body) = err {
        tracing::warn!(
            error = %body,
            "Treating malformed storage response as rate limiting (best-effort inference)"
        );
        return UploadError::rate_limited(err.to_string());
    }

    classify_message(&err.to_string())
}

/// Phrase fallback over an error message, case-insensitive. The returned error keeps the
/// raw message.
pub fn classify_message(message: &str) -> UploadError {
    let scrubbed = without_locations(message).to_lowercase();

    match status_code_in(&scrubbed) {
        Some(413) => return UploadError::oversized(message),
        Some(429) => return UploadError::rate_limited(message),
        _ => {}
    }

    if OVERSIZED_PHRASES.iter().any(|p| scrubbed.contains(p)) {
        return UploadError::oversized(message);
    }

    if RATE_LIMIT_PHRASES.iter().any(|p| scrubbed.contains(p)) {
        if scrubbed.contains("not valid json") {
            tracing::warn!(
                error = %message,
                "Treating invalid JSON response as rate limiting (best-effort inference)"
            );
        }
        return UploadError::rate_limited(message);
    }

    UploadError::unknown(message)
}

/// HTTP status named by a status-shaped phrase in `message`, ignoring keys, paths and URLs.
pub fn status_code_in(message: &str) -> Option<u16> {
    let scrubbed = without_locations(message);
    STATUS_PATTERN
        .captures(&scrubbed)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Drop whitespace-separated tokens that carry a path or URL (anything with a `/`, other
/// than an `HTTP/x.y` version).
fn without_locations(message: &str) -> String {
    message
        .split_whitespace()
        .filter(|token| !token.contains('/') || HTTP_VERSION.is_match(token))
        .collect::<Vec<_>>()
        .join(" ")
}
