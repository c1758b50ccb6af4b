//! Storage keys, content types and digests for profile images.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

use crate::constants::{DEFAULT_IMAGE_CONTENT_TYPE, DEFAULT_IMAGE_EXTENSION};

/// Parenthesised or bracketed segments, e.g. nicknames: `Robert (Bob) Smith`.
static BRACKETED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").ok());

/// Collapse a display name into a key-safe stem.
///
/// Bracketed segments are removed first, then every whitespace character.
///
/// ```
/// use rosterd::media::normalize_name;
///
/// assert_eq!(normalize_name("Robert (Bob) Smith"), "RobertSmith");
/// assert_eq!(normalize_name(" Ada  [she/her] Lovelace "), "AdaLovelace");
/// ```
#[must_use]
pub fn normalize_name(display_name: &str) -> String {
    let stripped = match BRACKETED.as_ref() {
        Some(re) => re.replace_all(display_name, ""),
        None => display_name.into(),
    };
    stripped.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Pick the content type to store an image under.
///
/// The reported type wins when it is an `image/*` type, then the hint, then
/// [`DEFAULT_IMAGE_CONTENT_TYPE`]. Parameters such as `; charset=` are dropped.
#[must_use]
pub fn effective_content_type(reported: Option<&str>, hint: Option<&str>) -> String {
    [reported, hint]
        .into_iter()
        .flatten()
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .find(|ct| ct.starts_with("image/") && ct.len() > "image/".len())
        .unwrap_or_else(|| DEFAULT_IMAGE_CONTENT_TYPE.to_string())
}

/// File extension for an image content type: the subtype without any `+suffix`.
#[must_use]
pub fn extension_for(content_type: &str) -> String {
    content_type
        .split_once('/')
        .map(|(_, subtype)| subtype.split('+').next().unwrap_or_default())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_IMAGE_EXTENSION)
        .to_string()
}

/// Deterministic key for a profile image: `{prefix}/{normalized name}.{ext}`.
///
/// `fallback` (the profile id) is used when the name normalizes to nothing.
#[must_use]
pub fn storage_key(prefix: &str, display_name: &str, fallback: &str, content_type: &str) -> String {
    let mut stem = normalize_name(display_name);
    if stem.is_empty() {
        stem = fallback.to_string();
    }
    let file = format!("{stem}.{}", extension_for(content_type));
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() { file } else { format!("{prefix}/{file}") }
}

/// Content digest in `sha256:<hex>` form.
#[must_use]
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
