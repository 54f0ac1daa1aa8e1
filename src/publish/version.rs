//! Timestamped URLs for cache busting.
//!
//! The published file's modification time is appended as a query:
//! `/assets/1a2b3c4d/app.js?v=1718000000`. Only URLs change; the destination
//! on disk never does.

use std::path::Path;
use std::time::UNIX_EPOCH;

/// Modification time of `path` in seconds since the epoch.
pub fn timestamp(path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// Append `v=<mtime>` to `url`. Unreadable files leave the URL unchanged.
pub fn versioned_url(url: &str, path: &Path) -> String {
    match timestamp(path) {
        Some(v) => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{url}{sep}v={v}")
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_versioned_url() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("style.css");
        fs::write(&file, "body {}").unwrap();

        let stamp = timestamp(&file).unwrap();
        assert_eq!(
            versioned_url("/assets/x/style.css", &file),
            format!("/assets/x/style.css?v={stamp}")
        );
        assert_eq!(
            versioned_url("/style.css?theme=dark", &file),
            format!("/style.css?theme=dark&v={stamp}")
        );
    }

    #[test]
    fn test_missing_file_keeps_url() {
        assert_eq!(
            versioned_url("/style.css", Path::new("/definitely/not/here.css")),
            "/style.css"
        );
    }
}
