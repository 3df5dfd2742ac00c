//! Normalization of user-supplied folder paths.

use std::path::PathBuf;

/// Turns a typed path or a drop payload into a path.
///
/// Surrounding whitespace is trimmed. Tk-style payloads wrap paths containing
/// spaces in braces (`{/my project}`) and URI-style payloads use `file://`; one
/// layer of either is removed.
pub fn normalize_drop_payload(payload: &str) -> PathBuf {
    let mut path = payload.trim();

    if let Some(inner) = path.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        path = inner.trim();
    }

    if let Some(stripped) = path.strip_prefix("file://") {
        path = stripped;
    }

    PathBuf::from(path)
}
