//! Symlink publishing.
//!
//! The destination becomes a link to the source. Creation is
//! create-if-absent: a link that already exists (made by us or a concurrent
//! writer) counts as success.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{FilesystemError, IoContext};

/// Whether anything exists at `path`, without following links.
pub(super) fn exists_any(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Remove a file, link, or directory tree at `path`.
pub(super) fn remove_any(path: &Path) -> Result<(), FilesystemError> {
    let meta = fs::symlink_metadata(path).at(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path).at(path)
    } else {
        remove_link_or_file(path)
    }
}

#[cfg(not(windows))]
fn remove_link_or_file(path: &Path) -> Result<(), FilesystemError> {
    fs::remove_file(path).at(path)
}

#[cfg(windows)]
fn remove_link_or_file(path: &Path) -> Result<(), FilesystemError> {
    // Directory symlinks are removed with remove_dir on Windows.
    fs::remove_file(path).or_else(|_| fs::remove_dir(path)).at(path)
}

/// Link `link` to `target`. Returns false if something was already there.
pub(super) fn link(target: &Path, link: &Path, force: bool) -> Result<bool, FilesystemError> {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    if force && exists_any(link) {
        remove_any(link)?;
    }

    match symlink(target, link) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(source) => Err(FilesystemError::Symlink {
            link: link.to_path_buf(),
            target: target.to_path_buf(),
            source,
        }),
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
