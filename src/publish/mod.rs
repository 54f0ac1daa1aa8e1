//! Asset publishing.
//!
//! Materializes a bundle's source directory under the public publish root,
//! exactly once per fingerprint:
//!
//! ```text
//! vendor/jquery/          publish      public/assets/1a2b3c4d/
//!   jquery.js      ─────────────────▶    jquery.js
//!   .gitignore        (copy or link)     (dotfiles skipped)
//! ```
//!
//! # Idempotence
//!
//! Each publish is looked up in the in-process [`PublishCache`] first, then
//! on disk. An existing destination is reused without invoking hooks unless
//! `force_copy` is set; forcing applies once per [`Publisher`], since later
//! calls hit the cache.
//!
//! # Concurrency
//!
//! A `Publisher` is `Send + Sync`. Publishes of one fingerprint are serialized
//! in-process; across processes, staged copies and create-if-absent links
//! make concurrent writers converge on a single complete destination.

mod cache;
mod copy;
mod filter;
mod fingerprint;
mod hooks;
mod link;
mod version;

pub use cache::PublishCache;
pub use filter::PathFilter;
pub use fingerprint::{MAX_HASH_LENGTH, MIN_HASH_LENGTH, fingerprint, path_hash};
pub use hooks::{AfterCopy, BeforeCopy, Fingerprinter};
pub use version::{timestamp, versioned_url};

use std::fs;
use std::path::{Path, PathBuf};

use crate::bundle::{BundleSpec, PublishOptions};
use crate::error::{ConfigurationError, FilesystemError, IoContext, Result};
use crate::utils::{path::normalize_path, url};
use copy::{CopyOutcome, CopyPlan};

/// Default number of hex chars in a fingerprint.
pub const DEFAULT_HASH_LENGTH: usize = 8;

// ============================================================================
// Options
// ============================================================================

/// Publisher-wide settings (`[publish]` in `assetry.toml`, plus hooks).
#[derive(Debug, Clone)]
pub struct PublisherOptions {
    /// Directory published bundles are written into.
    pub base_path: PathBuf,
    /// URL serving `base_path`.
    pub base_url: String,
    /// Symlink sources instead of copying them.
    pub link_assets: bool,
    /// Republish existing destinations (once per publisher).
    pub force_copy: bool,
    /// Append `?v=<mtime>` to asset URLs.
    pub append_timestamp: bool,
    pub hash_length: usize,
    /// Used when a bundle sets no `before_copy` of its own.
    pub before_copy: Option<BeforeCopy>,
    /// Used when a bundle sets no `after_copy` of its own.
    pub after_copy: Option<AfterCopy>,
    /// Replaces the default path hash.
    pub fingerprint: Option<Fingerprinter>,
}

impl Default for PublisherOptions {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("assets"),
            base_url: "/assets".to_string(),
            link_assets: false,
            force_copy: false,
            append_timestamp: false,
            hash_length: DEFAULT_HASH_LENGTH,
            before_copy: None,
            after_copy: None,
            fingerprint: None,
        }
    }
}

impl PublisherOptions {
    pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// What a publish call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Files were copied.
    Published,
    /// A symlink was created.
    Linked,
    /// The destination already existed (disk or cache) and was reused.
    Existing,
    /// `before_copy` refused the bundle root; nothing exists at the destination.
    Vetoed,
    /// Nothing to publish; the bundle's own location is used.
    Unpublished,
}

impl PublishOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Linked => "linked",
            Self::Existing => "existing",
            Self::Vetoed => "vetoed",
            Self::Unpublished => "unpublished",
        }
    }
}

/// Location of a bundle after publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAsset {
    /// Absolute source path, `None` for unpublished bundles.
    pub source: Option<PathBuf>,
    pub base_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub outcome: PublishOutcome,
}

impl PublishedAsset {
    /// Whether the bundle's files can be served from `base_path`.
    pub fn is_available(&self) -> bool {
        self.outcome != PublishOutcome::Vetoed
    }

    /// Whether this call wrote to disk.
    pub fn wrote(&self) -> bool {
        matches!(self.outcome, PublishOutcome::Published | PublishOutcome::Linked)
    }

    fn with_outcome(mut self, outcome: PublishOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

// ============================================================================
// Publisher
// ============================================================================

/// Shared publisher. Cheap to share through `Arc` across sessions.
#[derive(Debug, Default)]
pub struct Publisher {
    options: PublisherOptions,
    cache: PublishCache,
}

impl Publisher {
    pub fn new(options: PublisherOptions) -> Self {
        Self {
            options,
            cache: PublishCache::new(),
        }
    }

    pub fn options(&self) -> &PublisherOptions {
        &self.options
    }

    pub fn cache(&self) -> &PublishCache {
        &self.cache
    }

    /// Publish a bundle.
    ///
    /// Only a source path with `base_path` or `base_url` missing is
    /// published, and only the missing location is taken from the result.
    /// Everything else is returned as-is.
    pub fn publish(&self, spec: &BundleSpec) -> Result<PublishedAsset> {
        let source = match spec.source_path() {
            Some(source) if spec.base_path.is_none() || spec.base_url.is_none() => source,
            _ => {
                return Ok(PublishedAsset {
                    source: None,
                    base_path: spec.base_path.clone(),
                    base_url: spec.base_url.clone(),
                    outcome: PublishOutcome::Unpublished,
                });
            }
        };
        let published = self.publish_path(source, &spec.publish_options)?;
        Ok(PublishedAsset {
            base_path: spec.base_path.clone().or(published.base_path),
            base_url: spec.base_url.clone().or(published.base_url),
            ..published
        })
    }

    /// Publish a directory or single file.
    ///
    /// Directories land at `<base_path>/<fingerprint>`, files at
    /// `<base_path>/<fingerprint>/<file name>`.
    pub fn publish_path(&self, source: &Path, options: &PublishOptions) -> Result<PublishedAsset> {
        let source = normalize_path(source);
        if !source.exists() {
            return Err(FilesystemError::MissingSource(source).into());
        }

        let fp = fingerprint(&source, self.options.hash_length, self.options.fingerprint.as_ref())?;
        let key = match (source.is_file(), source.file_name()) {
            (true, Some(name)) => format!("{fp}/{}", name.to_string_lossy()),
            _ => fp.clone(),
        };

        if let Some(hit) = self.cache.get(&key) {
            return Ok(existing(hit));
        }
        let lock = self.cache.lock(&key);
        let _guard = lock.lock();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(existing(hit));
        }

        let asset = self.materialize(&source, &fp, &key, options)?;
        self.cache.insert(&key, asset.clone());
        Ok(asset)
    }

    fn materialize(
        &self,
        source: &Path,
        fp: &str,
        key: &str,
        options: &PublishOptions,
    ) -> Result<PublishedAsset> {
        let dst_dir = self.options.base_path.join(fp);
        let dst = self.options.base_path.join(key);
        let asset = PublishedAsset {
            source: Some(source.to_path_buf()),
            base_path: Some(dst.clone()),
            base_url: Some(url::join(&self.options.base_url, key)),
            outcome: PublishOutcome::Existing,
        };

        let force = options.force_copy.unwrap_or(self.options.force_copy);
        if !force && link::exists_any(&dst) {
            crate::debug!("publish"; "exists {}", dst.display());
            return Ok(asset);
        }

        let before = options.before_copy.as_ref().or(self.options.before_copy.as_ref());
        let outcome = if self.options.link_assets {
            if before.is_some_and(|hook| !hook.allows(source, &dst)) {
                PublishOutcome::Vetoed
            } else if link::link(source, &dst, force)? {
                PublishOutcome::Linked
            } else {
                PublishOutcome::Existing
            }
        } else {
            let filter = PathFilter::new(&options.only, &options.except)
                .map_err(|e| ConfigurationError::InvalidPattern(e.to_string()))?;
            let plan = CopyPlan {
                filter: &filter,
                before,
                after: options.after_copy.as_ref().or(self.options.after_copy.as_ref()),
                force,
            };
            let copied = if source.is_file() {
                copy::copy_file(source, &dst_dir, &plan)?
            } else {
                copy::copy_dir(source, &dst, &plan)?
            };
            match copied {
                CopyOutcome::Copied(_) => PublishOutcome::Published,
                CopyOutcome::Raced => PublishOutcome::Existing,
                CopyOutcome::Vetoed => PublishOutcome::Vetoed,
            }
        };

        crate::debug!("publish"; "{} -> {} ({:?})", source.display(), dst.display(), outcome);
        Ok(asset.with_outcome(outcome))
    }

    /// Where `source` was published by this publisher, if it was.
    pub fn published_path(&self, source: &Path) -> Option<PathBuf> {
        self.cache
            .find_source(&normalize_path(source))
            .filter(PublishedAsset::is_available)
            .and_then(|a| a.base_path)
    }

    /// URL of `source` as published by this publisher, if it was.
    pub fn published_url(&self, source: &Path) -> Option<String> {
        self.cache
            .find_source(&normalize_path(source))
            .filter(PublishedAsset::is_available)
            .and_then(|a| a.base_url)
    }

    /// URL of `file` under a published location, with timestamp if enabled.
    ///
    /// Non-relative URLs are returned verbatim and never timestamped.
    pub fn file_url(&self, base_path: Option<&Path>, base_url: &str, file: &str) -> String {
        if !url::is_relative(file) {
            return file.to_string();
        }
        let joined = url::join(base_url, file);
        match base_path {
            Some(dir) if self.options.append_timestamp => versioned_url(&joined, &dir.join(file)),
            _ => joined,
        }
    }

    /// Remove the publish root and forget everything published.
    pub fn clean(&self) -> std::result::Result<bool, FilesystemError> {
        self.cache.clear();
        let root = &self.options.base_path;
        if !root.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(root).at(root)?;
        Ok(true)
    }
}

fn existing(hit: PublishedAsset) -> PublishedAsset {
    match hit.outcome {
        PublishOutcome::Vetoed => hit,
        _ => hit.with_outcome(PublishOutcome::Existing),
    }
}
