//! Injectable publish hooks.
//!
//! Hooks are plain function values with fixed signatures, invoked
//! synchronously on the publishing thread:
//!
//! | Hook          | Signature                      | Effect                        |
//! |---------------|--------------------------------|-------------------------------|
//! | `BeforeCopy`  | `(from, to) -> bool`           | `false` skips the entry       |
//! | `AfterCopy`   | `(from, to)`                   | side effects only             |
//! | `Fingerprint` | `(source) -> String`           | replaces the path hash        |

use std::fmt;
use std::path::Path;
use std::sync::Arc;

type BeforeFn = dyn Fn(&Path, &Path) -> bool + Send + Sync;
type AfterFn = dyn Fn(&Path, &Path) + Send + Sync;
type FingerprintFn = dyn Fn(&Path) -> String + Send + Sync;

/// Veto hook called before each entry is copied, and once for the bundle root.
#[derive(Clone)]
pub struct BeforeCopy(Arc<BeforeFn>);

impl BeforeCopy {
    pub fn new(f: impl Fn(&Path, &Path) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn allows(&self, from: &Path, to: &Path) -> bool {
        (self.0)(from, to)
    }
}

impl fmt::Debug for BeforeCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BeforeCopy(..)")
    }
}

/// Hook called after each file landed at its final destination.
#[derive(Clone)]
pub struct AfterCopy(Arc<AfterFn>);

impl AfterCopy {
    pub fn new(f: impl Fn(&Path, &Path) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, from: &Path, to: &Path) {
        (self.0)(from, to)
    }
}

impl fmt::Debug for AfterCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AfterCopy(..)")
    }
}

/// Custom fingerprint for a source path. May return nested segments (`a/b`).
#[derive(Clone)]
pub struct Fingerprinter(Arc<FingerprintFn>);

impl Fingerprinter {
    pub fn new(f: impl Fn(&Path) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn fingerprint(&self, source: &Path) -> String {
        (self.0)(source)
    }
}

impl fmt::Debug for Fingerprinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fingerprinter(..)")
    }
}

/// Skip dotfiles. Used when no `BeforeCopy` hook is configured.
pub(super) fn skip_hidden(from: &Path) -> bool {
    from.file_name()
        .and_then(|n| n.to_str())
        .is_none_or(|n| !n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_hidden() {
        assert!(skip_hidden(Path::new("assets/app.js")));
        assert!(!skip_hidden(Path::new("assets/.gitignore")));
        assert!(!skip_hidden(Path::new("assets/.git")));
    }

    #[test]
    fn test_hooks_are_cloneable_values() {
        let deny_maps = BeforeCopy::new(|from, _| from.extension().is_none_or(|e| e != "map"));
        let copy = deny_maps.clone();
        assert!(copy.allows(Path::new("a.js"), Path::new("b.js")));
        assert!(!copy.allows(Path::new("a.js.map"), Path::new("b.js.map")));
        assert_eq!(format!("{deny_maps:?}"), "BeforeCopy(..)");

        let fp = Fingerprinter::new(|p| format!("x/{}", p.display()));
        assert_eq!(fp.fingerprint(Path::new("src")), "x/src");
    }
}
