//! Storage key construction and content-type resolution.
//!
//! Keys have the shape `{folder/}{base}-{timestamp_ms}-{token}.{ext}` where `base` is the
//! sanitized filename stem, `timestamp_ms` is epoch milliseconds and `token` is a short
//! base-36 random string. The original extension is appended verbatim.

use chrono::Utc;
use rand::Rng;

use crate::constants::{FALLBACK_CONTENT_TYPE, MAX_BASE_NAME_LENGTH, RANDOM_TOKEN_LENGTH};

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Split a filename at its last `.` into `(stem, extension)`.
///
/// A name without a dot has no extension.
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(idx) => (&filename[..idx], Some(&filename[idx + 1..])),
        None => (filename, None),
    }
}

/// Reduce a filename to a URL-safe base: extension dropped, lowercase, runs of anything
/// outside `[a-z0-9]` collapsed into one `-`, no leading or trailing dash, at most
/// `MAX_BASE_NAME_LENGTH` characters. May return an empty string.
pub fn sanitize_base(filename: &str) -> String {
    let (stem, _) = split_extension(filename);

    let mut out = String::with_capacity(stem.len());
    let mut pending_dash = false;
    for ch in stem.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }

    // Output is ASCII, so byte truncation is char-safe.
    out.truncate(MAX_BASE_NAME_LENGTH);
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Random token of `RANDOM_TOKEN_LENGTH` base-36 characters.
pub fn random_token() -> String {
    let mut rng = rand::rng();
    (0..RANDOM_TOKEN_LENGTH)
        .map(|_| BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())] as char)
        .collect()
}

/// Deterministic key construction from explicit timestamp and token.
pub fn build_storage_key_at(
    filename: &str,
    folder_path: Option<&str>,
    timestamp_ms: i64,
    token: &str,
) -> String {
    let base = sanitize_base(filename);
    let (_, extension) = split_extension(filename);

    let mut key = String::new();
    if let Some(folder) = folder_path.map(|f| f.trim_end_matches('/')) {
        if !folder.is_empty() {
            key.push_str(folder);
            key.push('/');
        }
    }
    if !base.is_empty() {
        key.push_str(&base);
        key.push('-');
    }
    key.push_str(&timestamp_ms.to_string());
    key.push('-');
    key.push_str(token);
    if let Some(ext) = extension.filter(|e| !e.is_empty()) {
        key.push('.');
        key.push_str(ext);
    }
    key
}

/// Build a collision-resistant storage key using the current time and a fresh random token.
pub fn build_storage_key(filename: &str, folder_path: Option<&str>) -> String {
    build_storage_key_at(
        filename,
        folder_path,
        Utc::now().timestamp_millis(),
        &random_token(),
    )
}

fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        _ => return None,
    };
    Some(content_type)
}

/// Resolve the MIME type to store: the extension map wins, then the declared type
/// without parameters, then `application/octet-stream`.
pub fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    if let Some(content_type) = split_extension(filename)
        .1
        .and_then(content_type_for_extension)
    {
        return content_type.to_string();
    }

    declared
        .and_then(|d| d.split(';').next())
        .map(|d| d.trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sanitize_collapses_and_lowercases() {
        assert_eq!(sanitize_base("My Photo #1.JPG"), "my-photo-1");
        assert_eq!(sanitize_base("--Hello__World--.png"), "hello-world");
        assert_eq!(sanitize_base("archive.tar.gz"), "archive-tar");
        assert_eq!(sanitize_base("README"), "readme");
        assert_eq!(sanitize_base("###.png"), "");
        assert_eq!(sanitize_base("Café au lait.jpg"), "caf-au-lait");
    }

    #[test]
    fn sanitize_truncates_without_trailing_dash() {
        let name = format!("{}-{}.png", "a".repeat(49), "b".repeat(10));
        let base = sanitize_base(&name);
        assert_eq!(base, "a".repeat(49));
        assert!(base.len() <= MAX_BASE_NAME_LENGTH);
    }

    #[test]
    fn sanitize_output_is_idempotent_and_url_safe() {
        for name in [
            "My Photo #1.JPG",
            " weird  name (copy) .mp4",
            "ÄÖÜ.wav",
            "x",
            "",
            ".hidden",
            "trailing-dash-.gif",
        ] {
            let once = sanitize_base(name);
            assert!(once
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            assert!(!once.starts_with('-') && !once.ends_with('-'));
            assert_eq!(sanitize_base(&once), once);
        }
    }

    fn assert_clean_base(name: &str, base: &str) {
        assert!(
            base.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "{:?} -> {:?}",
            name,
            base
        );
        assert!(base.len() <= MAX_BASE_NAME_LENGTH, "{:?} -> {:?}", name, base);
        assert!(!base.starts_with('-') && !base.ends_with('-'), "{:?}", base);
        assert!(!base.contains("--"), "{:?}", base);
        assert_eq!(sanitize_base(base), base, "not idempotent for {:?}", name);
    }

    #[test]
    fn sanitize_holds_for_generated_names() {
        let pieces = [
            "a", "Z", "7", "-", "_", " ", ".", "/", "\\", "#", "%", "é", "ß", "İ", "\u{212A}",
            "日本", "😀", "\u{0301}", "\t", "--", "..", "\u{00A0}",
        ];
        let mut rng = rand::rng();
        for _ in 0..2000 {
            let len = rng.random_range(0..80);
            let name: String = (0..len)
                .map(|_| pieces[rng.random_range(0..pieces.len())])
                .collect();
            assert_clean_base(&name, &sanitize_base(&name));
        }
    }

    #[test]
    fn sanitize_truncation_around_separator_boundaries() {
        for head in 45..=55 {
            for sep in ["-", "__", " . ", "😀", "-!-"] {
                let name = format!("{}{}{}.png", "a".repeat(head), sep, "b".repeat(20));
                let base = sanitize_base(&name);
                assert_clean_base(&name, &base);
                assert!(base.starts_with(&"a".repeat(head.min(MAX_BASE_NAME_LENGTH))));
            }
        }

        for name in ["", "---", "___", "   ", "😀😀", ".png", "-.-", "日本語.jpg"] {
            assert_eq!(sanitize_base(name), "", "{:?}", name);
        }
    }

    #[test]
    fn keys_for_the_same_name_are_distinct() {
        let fixed: HashSet<String> = (0..500)
            .map(|_| {
                build_storage_key_at(
                    "photo.png",
                    Some("uploads"),
                    1_700_000_000_000,
                    &random_token(),
                )
            })
            .collect();
        assert_eq!(fixed.len(), 500);

        let live: HashSet<String> = (0..500)
            .map(|_| build_storage_key("photo.png", Some("uploads")))
            .collect();
        assert_eq!(live.len(), 500);
    }

    #[test]
    fn key_layout_with_folder() {
        let key = build_storage_key_at(
            "My Photo #1.JPG",
            Some("uploads/single/"),
            1_700_000_000_000,
            "abc12345",
        );
        assert_eq!(key, "uploads/single/my-photo-1-1700000000000-abc12345.JPG");
    }

    #[test]
    fn key_without_extension_or_base() {
        assert_eq!(
            build_storage_key_at("README", None, 1_700_000_000_000, "tok00000"),
            "readme-1700000000000-tok00000"
        );
        assert_eq!(
            build_storage_key_at("!!!.png", Some(""), 1_700_000_000_000, "tok00000"),
            "1700000000000-tok00000.png"
        );
    }

    #[test]
    fn generated_key_has_timestamp_and_token() {
        let key = build_storage_key("clip.mp4", Some("videos"));
        let rest = key.strip_prefix("videos/clip-").unwrap();
        let rest = rest.strip_suffix(".mp4").unwrap();
        let (ts, token) = rest.split_once('-').unwrap();
        assert_eq!(ts.len(), 13);
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(token.len(), RANDOM_TOKEN_LENGTH);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn content_type_prefers_extension_map() {
        assert_eq!(resolve_content_type(Some("text/plain"), "a.JPG"), "image/jpeg");
        assert_eq!(resolve_content_type(None, "song.m4a"), "audio/mp4");
        assert_eq!(resolve_content_type(None, "clip.MOV"), "video/quicktime");
    }

    #[test]
    fn content_type_falls_back_to_declared_then_octet_stream() {
        assert_eq!(
            resolve_content_type(Some("image/PNG; charset=binary"), "blob"),
            "image/png"
        );
        assert_eq!(resolve_content_type(None, "blob.bin"), FALLBACK_CONTENT_TYPE);
        assert_eq!(resolve_content_type(Some("  "), "blob"), FALLBACK_CONTENT_TYPE);
    }
}
