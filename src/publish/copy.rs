//! Staged copy into the publish tree.
//!
//! Files are copied into a hidden sibling of the destination and the sibling
//! is renamed into place once complete:
//!
//! ```text
//! assets/.1a2b3c4d.4242.0.tmp/   ← written here
//! assets/1a2b3c4d/               ← appears atomically on rename
//! ```
//!
//! A failed copy removes its staging directory, so a destination that exists
//! is always complete. Concurrent writers of the same destination each stage
//! privately; the first rename wins and the others discard their copy.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::filter::PathFilter;
use super::hooks::{AfterCopy, BeforeCopy, skip_hidden};
use super::link::{exists_any, remove_any};
use crate::error::{FilesystemError, IoContext};

static STAGING_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Filters and hooks for one copy.
pub(super) struct CopyPlan<'a> {
    pub filter: &'a PathFilter,
    pub before: Option<&'a BeforeCopy>,
    pub after: Option<&'a AfterCopy>,
    pub force: bool,
}

/// What a copy did to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CopyOutcome {
    /// Destination committed with this many files.
    Copied(usize),
    /// Another writer committed first; its copy is kept.
    Raced,
    /// The root `before_copy` call refused; nothing was created.
    Vetoed,
}

/// Copy directory `src` to `dst`.
pub(super) fn copy_dir(src: &Path, dst: &Path, plan: &CopyPlan<'_>) -> Result<CopyOutcome, FilesystemError> {
    if let Some(hook) = plan.before
        && !hook.allows(src, dst)
    {
        return Ok(CopyOutcome::Vetoed);
    }

    let staging = staging_path(dst)?;
    let mut copied = Vec::new();
    let staged = fs::create_dir(&staging)
        .at(&staging)
        .and_then(|()| copy_entries(src, &staging, dst, Path::new(""), plan, &mut copied));
    if let Err(e) = staged {
        fs::remove_dir_all(&staging).ok();
        return Err(e);
    }

    if !commit(&staging, dst, plan.force)? {
        return Ok(CopyOutcome::Raced);
    }
    if let Some(after) = plan.after {
        for (from, to) in &copied {
            after.call(from, to);
        }
    }
    Ok(CopyOutcome::Copied(copied.len()))
}

/// Copy a single file `src` into directory `dst_dir`, keeping its name.
pub(super) fn copy_file(src: &Path, dst_dir: &Path, plan: &CopyPlan<'_>) -> Result<CopyOutcome, FilesystemError> {
    let name = src
        .file_name()
        .ok_or_else(|| FilesystemError::MissingSource(src.to_path_buf()))?;
    let to = dst_dir.join(name);

    let allowed = match plan.before {
        Some(hook) => hook.allows(src, &to),
        None => true,
    };
    if !allowed {
        return Ok(CopyOutcome::Vetoed);
    }
    if !plan.force && exists_any(&to) {
        return Ok(CopyOutcome::Raced);
    }

    let staging = staging_path(&to)?;
    if let Err(e) = fs::copy(src, &staging).at(&staging) {
        fs::remove_file(&staging).ok();
        return Err(e);
    }
    // Renaming a file over a file replaces it atomically.
    fs::rename(&staging, &to).at(&to).inspect_err(|_| {
        fs::remove_file(&staging).ok();
    })?;

    if let Some(after) = plan.after {
        after.call(src, &to);
    }
    Ok(CopyOutcome::Copied(1))
}

/// Recursively copy entries of `src_dir` into `stage_dir`.
///
/// `final_dir` mirrors `stage_dir` at its committed location; hooks see
/// final paths. Subdirectories are created only when a file lands in them.
fn copy_entries(
    src_dir: &Path,
    stage_dir: &Path,
    final_dir: &Path,
    rel: &Path,
    plan: &CopyPlan<'_>,
    copied: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<(), FilesystemError> {
    let mut entries = fs::read_dir(src_dir)
        .at(src_dir)?
        .collect::<Result<Vec<_>, _>>()
        .at(src_dir)?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let from = entry.path();
        let to = final_dir.join(&name);
        let rel = rel.join(&name);
        let is_dir = from.is_dir();

        if !plan.filter.allows(&rel, is_dir) {
            continue;
        }
        let allowed = match plan.before {
            Some(hook) => hook.allows(&from, &to),
            None => skip_hidden(&from),
        };
        if !allowed {
            continue;
        }

        let staged = stage_dir.join(&name);
        if is_dir {
            copy_entries(&from, &staged, &to, &rel, plan, copied)?;
        } else {
            if let Some(parent) = staged.parent() {
                fs::create_dir_all(parent).at(parent)?;
            }
            fs::copy(&from, &staged).at(&staged)?;
            copied.push((from, to));
        }
    }
    Ok(())
}

/// Move the staging directory into place. Returns false if another writer won.
fn commit(staging: &Path, dst: &Path, force: bool) -> Result<bool, FilesystemError> {
    if force && exists_any(dst) {
        if let Err(e) = remove_any(dst) {
            fs::remove_dir_all(staging).ok();
            return Err(e);
        }
    }
    match fs::rename(staging, dst) {
        Ok(()) => Ok(true),
        Err(_) if exists_any(dst) => {
            fs::remove_dir_all(staging).ok();
            Ok(false)
        }
        Err(e) => {
            fs::remove_dir_all(staging).ok();
            Err(FilesystemError::io(dst, e))
        }
    }
}

/// Unique hidden sibling of `dst`. Creates `dst`'s parent.
fn staging_path(dst: &Path) -> Result<PathBuf, FilesystemError> {
    let parent = dst
        .parent()
        .ok_or_else(|| FilesystemError::io(dst, std::io::ErrorKind::InvalidInput.into()))?;
    fs::create_dir_all(parent).at(parent)?;

    let name = dst.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let n = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
    Ok(parent.join(format!(".{name}.{}.{n}.tmp", std::process::id())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn source(dir: &TempDir) -> PathBuf {
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("js")).unwrap();
        fs::create_dir_all(src.join("css")).unwrap();
        fs::write(src.join("js/jquery.js"), "jq").unwrap();
        fs::write(src.join("css/stub.css"), "body {}").unwrap();
        fs::write(src.join(".hidden"), "secret").unwrap();
        src
    }

    fn plan(filter: &PathFilter) -> CopyPlan<'_> {
        CopyPlan {
            filter,
            before: None,
            after: None,
            force: false,
        }
    }

    #[test]
    fn test_copy_dir_full() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);
        let dst = dir.path().join("assets/abc");
        let filter = PathFilter::default();

        let outcome = copy_dir(&src, &dst, &plan(&filter)).unwrap();
        assert_eq!(outcome, CopyOutcome::Copied(2));
        assert_eq!(fs::read_to_string(dst.join("js/jquery.js")).unwrap(), "jq");
        assert!(dst.join("css/stub.css").exists());
        // default filter skips dotfiles
        assert!(!dst.join(".hidden").exists());
        // no staging leftovers
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("assets")).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_copy_dir_only_skips_other_dirs() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);
        let dst = dir.path().join("assets/abc");
        let filter = PathFilter::new(&["js/*".into()], &[]).unwrap();

        copy_dir(&src, &dst, &plan(&filter)).unwrap();
        assert!(dst.join("js/jquery.js").exists());
        assert!(!dst.join("css").exists());
    }

    #[test]
    fn test_copy_dir_empty_match_still_creates_root() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);
        let dst = dir.path().join("assets/abc");
        let filter = PathFilter::new(&["nothing/*".into()], &[]).unwrap();

        assert_eq!(copy_dir(&src, &dst, &plan(&filter)).unwrap(), CopyOutcome::Copied(0));
        assert!(dst.is_dir());
        assert_eq!(fs::read_dir(&dst).unwrap().count(), 0);
    }

    #[test]
    fn test_root_veto_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);
        let dst = dir.path().join("assets/abc");
        let filter = PathFilter::default();
        let deny = BeforeCopy::new(|_, _| false);
        let plan = CopyPlan {
            before: Some(&deny),
            ..plan(&filter)
        };

        assert_eq!(copy_dir(&src, &dst, &plan).unwrap(), CopyOutcome::Vetoed);
        assert!(!dst.exists());
        assert!(!dir.path().join("assets").exists());
    }

    #[test]
    fn test_hooks_see_final_paths() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);
        let dst = dir.path().join("assets/abc");
        let filter = PathFilter::default();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_hook = Arc::clone(&seen);
        let after = AfterCopy::new(move |_, to| {
            assert!(to.exists());
            seen_hook.lock().unwrap().push(to.to_path_buf());
        });
        let skip_css = BeforeCopy::new(|from, _| from.extension().is_none_or(|e| e != "css"));
        let plan = CopyPlan {
            before: Some(&skip_css),
            after: Some(&after),
            ..plan(&filter)
        };

        assert_eq!(copy_dir(&src, &dst, &plan).unwrap(), CopyOutcome::Copied(2));
        // custom hook replaces the dotfile default
        assert!(dst.join(".hidden").exists());
        assert!(!dst.join("css/stub.css").exists());
        let seen = seen.lock().unwrap();
        assert!(seen.contains(&dst.join("js/jquery.js")));
    }

    #[test]
    fn test_existing_destination_is_kept_without_force() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);
        let dst = dir.path().join("assets/abc");
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("marker"), "winner").unwrap();
        let filter = PathFilter::default();

        assert_eq!(copy_dir(&src, &dst, &plan(&filter)).unwrap(), CopyOutcome::Raced);
        assert!(dst.join("marker").exists());
        assert!(!dst.join("js").exists());

        let forced = CopyPlan {
            force: true,
            ..plan(&filter)
        };
        assert_eq!(copy_dir(&src, &dst, &forced).unwrap(), CopyOutcome::Copied(2));
        assert!(!dst.join("marker").exists());
    }

    #[test]
    fn test_missing_source_leaves_no_destination() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("assets/abc");
        let filter = PathFilter::default();

        let err = copy_dir(&dir.path().join("nope"), &dst, &plan(&filter)).unwrap_err();
        assert!(matches!(err, FilesystemError::Io(..)));
        assert!(!dst.exists());
        assert_eq!(fs::read_dir(dir.path().join("assets")).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_file() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);
        let dst = dir.path().join("assets/abc");
        let filter = PathFilter::default();

        let file = src.join("js/jquery.js");
        assert_eq!(copy_file(&file, &dst, &plan(&filter)).unwrap(), CopyOutcome::Copied(1));
        assert_eq!(fs::read_to_string(dst.join("jquery.js")).unwrap(), "jq");
        assert_eq!(copy_file(&file, &dst, &plan(&filter)).unwrap(), CopyOutcome::Raced);
    }
}
