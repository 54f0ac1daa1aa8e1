//! `only` / `except` publish filters.
//!
//! Patterns are globs matched against the path relative to the source root:
//!
//! | Pattern      | Matches                                          |
//! |--------------|--------------------------------------------------|
//! | `*.map`      | basename anywhere in the tree                    |
//! | `js/*`       | relative path (`*` does not cross `/`)           |
//! | `/js/*`      | same, leading slash is ignored                   |
//! | `tests/`     | directories only                                 |
//!
//! `except` applies to files and directories (an excluded directory prunes
//! its subtree). `only` applies to files; directories are always traversed.

use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

#[derive(Debug, Clone)]
struct Pattern {
    matcher: GlobMatcher,
    /// Pattern contains `/`: match the relative path, else the basename.
    on_path: bool,
    /// Pattern ends with `/`: only directories match.
    dir_only: bool,
}

impl Pattern {
    fn compile(raw: &str) -> Result<Self, globset::Error> {
        let dir_only = raw.ends_with('/');
        let trimmed = raw.trim_start_matches('/').trim_end_matches('/');
        let matcher = GlobBuilder::new(trimmed)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        Ok(Self {
            matcher,
            on_path: trimmed.contains('/'),
            dir_only,
        })
    }

    fn matches(&self, rel: &Path, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        if self.on_path {
            self.matcher.is_match(rel)
        } else {
            rel.file_name().is_some_and(|n| self.matcher.is_match(n))
        }
    }
}

/// Compiled `only` and `except` sets for one publish.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    only: Vec<Pattern>,
    except: Vec<Pattern>,
}

impl PathFilter {
    pub fn new(only: &[String], except: &[String]) -> Result<Self, globset::Error> {
        Ok(Self {
            only: only.iter().map(|p| Pattern::compile(p)).collect::<Result<_, _>>()?,
            except: except.iter().map(|p| Pattern::compile(p)).collect::<Result<_, _>>()?,
        })
    }

    /// Validate patterns without keeping them (config checks).
    pub fn check(pattern: &str) -> Result<(), globset::Error> {
        Pattern::compile(pattern).map(|_| ())
    }

    /// Whether the entry at `rel` (relative to the source root) is published.
    pub fn allows(&self, rel: &Path, is_dir: bool) -> bool {
        if self.except.iter().any(|p| p.matches(rel, is_dir)) {
            return false;
        }
        if is_dir || self.only.is_empty() {
            return true;
        }
        self.only.iter().any(|p| p.matches(rel, is_dir))
    }

    pub fn is_empty(&self) -> bool {
        self.only.is_empty() && self.except.is_empty()
    }
}
