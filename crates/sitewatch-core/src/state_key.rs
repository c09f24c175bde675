//! Filesystem-safe state keys
//!
//! A state key names the per-target directory under the snapshot root. It
//! is built from the URL's host and path so that the snapshot tree stays
//! browsable, and falls back to a digest of the whole URL when the readable
//! form would be too long.

use crate::digest::content_hash;

/// Longest readable key kept before falling back to the URL digest
pub const MAX_KEY_LEN: usize = 100;

/// Derive the state key for a canonical URL
///
/// Host (with port) followed by the path with `/` mapped to `_`, filtered
/// to ASCII alphanumerics and `-_.`. Query and fragment are not part of the
/// readable form; URLs that differ only there collide unless the digest
/// fallback applies.
pub fn key_for(canonical_url: &str) -> String {
    let readable = match split_host_path(canonical_url) {
        Some((host, path)) => sanitize(&format!("{}{}", host, path.replace('/', "_"))),
        None => String::new(),
    };

    if readable.is_empty() || readable.len() > MAX_KEY_LEN || readable.chars().all(|c| c == '.')
    {
        return content_hash(canonical_url.as_bytes());
    }
    readable
}

/// Split `scheme://host/path?query#frag` into `(host, path)`
fn split_host_path(url: &str) -> Option<(&str, &str)> {
    let (_, rest) = url.split_once("://")?;
    let rest = rest
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    match rest.find('/') {
        Some(idx) => Some((&rest[..idx], &rest[idx..])),
        None => Some((rest, "")),
    }
}

fn sanitize(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    kept.trim_end().to_string()
}
