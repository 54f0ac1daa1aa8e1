//! Path normalization utilities.
//!
//! - `normalize_path` - absolute form of a filesystem path (canonicalize + fallback)
//! - `resolve_path` - relative paths against a base directory

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve `path` against `base` unless it is already absolute.
///
/// Leading `~` is expanded to the home directory.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) if s.starts_with('~') => PathBuf::from(shellexpand::tilde(s).as_ref()),
        _ => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert!(normalize_path(Path::new("/absolute/path/file.txt")).is_absolute());
        assert!(normalize_path(Path::new("relative/path/file.txt")).is_absolute());
    }

    #[test]
    fn test_normalize_resolves_dots() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        let dotted = dir.path().join("a/../a");
        assert_eq!(normalize_path(&dotted), normalize_path(&dir.path().join("a")));
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            resolve_path(Path::new("/absolute"), Path::new("/base")),
            PathBuf::from("/absolute")
        );
        assert_eq!(
            resolve_path(Path::new("vendor/jquery"), Path::new("/site")),
            PathBuf::from("/site/vendor/jquery")
        );
        assert!(resolve_path(Path::new("~/assets"), Path::new("/site")).is_absolute());
    }
}
