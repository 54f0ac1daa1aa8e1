//! Source fingerprints used as publish cache keys.
//!
//! The default fingerprint is a blake3 hash of the absolute source path, so
//! republishing the same path is a cache hit while two identical directories
//! at different paths publish to different destinations.

use std::path::{Path, PathBuf};

use super::Fingerprinter;
use crate::error::ConfigurationError;
use crate::utils::path::normalize_path;

/// Shortest and longest accepted hex fingerprint.
pub const MIN_HASH_LENGTH: usize = 4;
pub const MAX_HASH_LENGTH: usize = 64;

/// Hash an absolute path, returning the first `len` hex chars.
pub fn path_hash(path: &Path, len: usize) -> String {
    let len = len.clamp(MIN_HASH_LENGTH, MAX_HASH_LENGTH);
    let hash = blake3::hash(path.as_os_str().as_encoded_bytes());
    let mut hex = hex::encode(hash.as_bytes());
    hex.truncate(len);
    hex
}

/// Directory a source is fingerprinted by: itself, or its parent for files.
pub fn fingerprint_root(source: &Path) -> PathBuf {
    let abs = normalize_path(source);
    if abs.is_file() {
        abs.parent().map(Path::to_path_buf).unwrap_or(abs)
    } else {
        abs
    }
}

/// Fingerprint a source, preferring a custom function when configured.
///
/// Custom output is trimmed of `/` and must stay inside the publish root:
/// empty output and `.`/`..` segments are rejected.
pub fn fingerprint(
    source: &Path,
    len: usize,
    custom: Option<&Fingerprinter>,
) -> Result<String, ConfigurationError> {
    let root = fingerprint_root(source);
    let Some(f) = custom else {
        return Ok(path_hash(&root, len));
    };
    let raw = f.fingerprint(&root);
    let fp = raw.trim_matches('/');
    let escapes = fp
        .split(['/', '\\'])
        .any(|seg| seg.is_empty() || seg == "." || seg == ".." || seg.contains(':'));
    if fp.is_empty() || escapes {
        return Err(ConfigurationError::InvalidFingerprint(raw));
    }
    Ok(fp.to_string())
}
