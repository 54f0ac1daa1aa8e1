//! Config field path used in diagnostics.

use owo_colors::OwoColorize;
use std::borrow::Cow;
use std::fmt;

/// Dotted path of a config field, e.g. `publish.hash_length` or
/// `bundles.app.depends`.
///
/// Static sections use the constants on each section type; per-bundle paths
/// are built with [`FieldPath::bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Cow<'static, str>);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(Cow::Borrowed(path))
    }

    /// `bundles.<id>.<field>`
    pub fn bundle(id: &str, field: &str) -> Self {
        Self(Cow::Owned(format!("bundles.{id}.{field}")))
    }

    /// `overrides.<id>`
    pub fn override_of(id: &str) -> Self {
        Self(Cow::Owned(format!("overrides.{id}")))
    }

    /// `aliases.<name>`
    pub fn alias(name: &str) -> Self {
        Self(Cow::Owned(format!("aliases.{name}")))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
