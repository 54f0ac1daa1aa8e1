//! Error types for resolution and publishing.
//!
//! Two failure families exist:
//! - [`ConfigurationError`]: the bundle graph itself is wrong (unknown
//!   identity, cycle, contradictory positions). Never retried.
//! - [`FilesystemError`]: a publish could not materialize files on disk.
//!
//! Files skipped by `only`/`except`/`before_copy` are not errors.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::alias::AliasError;
use crate::bundle::{AssetKind, BundleId, Position};

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Main error type for registration and publishing.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    #[error(transparent)]
    Alias(#[from] AliasError),
}

impl AssetError {
    /// Whether this is a configuration error (bad bundle graph).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

// ============================================================================
// ConfigurationError
// ============================================================================

/// Bundle graph errors. Always fatal to the current registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown asset bundle `{missing}` required by `{required_by}`")]
    UnknownBundle {
        missing: BundleId,
        required_by: BundleId,
    },

    #[error("unknown asset bundle `{0}`")]
    UnknownRoot(BundleId),

    #[error("circular dependency detected: {}", CyclePath(.0))]
    Cycle(Vec<BundleId>),

    #[error(
        "`{dependent}` places {kind} at {dependent_position} but depends on `{dependency}` \
         which is placed later at {dependency_position}"
    )]
    PositionConflict {
        dependent: BundleId,
        dependent_position: Position,
        dependency: BundleId,
        dependency_position: Position,
        kind: AssetKind,
    },

    #[error("invalid publish filter: {0}")]
    InvalidPattern(String),

    #[error("fingerprint `{0}` is not a relative path under the publish directory")]
    InvalidFingerprint(String),
}

/// Formats a cycle as `a -> b -> a`.
struct CyclePath<'a>(&'a [BundleId]);

impl fmt::Display for CyclePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

// ============================================================================
// FilesystemError
// ============================================================================

/// Publish failures. Fatal to the current publish call, not retried.
#[derive(Debug, Error)]
pub enum FilesystemError {
    #[error("source path `{0}` does not exist")]
    MissingSource(PathBuf),

    #[error("IO error at `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("cannot link `{link}` to `{target}`")]
    Symlink {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FilesystemError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io(path.into(), err)
    }
}

/// Extension for attaching the offending path to `io::Result`.
pub(crate) trait IoContext<T> {
    fn at(self, path: &std::path::Path) -> std::result::Result<T, FilesystemError>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    #[inline]
    fn at(self, path: &std::path::Path) -> std::result::Result<T, FilesystemError> {
        self.map_err(|e| FilesystemError::io(path, e))
    }
}
