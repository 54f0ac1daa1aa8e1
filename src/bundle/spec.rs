//! `[bundles.<name>]` entries.
//!
//! # Example
//!
//! ```toml
//! [bundles.app]
//! base_path = "@webroot/app"
//! base_url = "@web/app"
//! css = ["site.css", { path = "print.css", media = "print" }]
//! js = ["app.js"]
//! js_options = { position = "end", defer = true }
//! depends = ["jquery"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{AssetKind, BundleId, Position};
use crate::publish::{AfterCopy, BeforeCopy};

/// Free-form rendering attributes (`media`, `defer`, `charset`, ...).
pub type Attributes = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// AssetOptions
// ============================================================================

/// Rendering options for a bundle's css or js files, or for one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetOptions {
    /// Render position. Bundle-level positions take part in ordering checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// Remaining attributes, passed through to the renderer.
    #[serde(flatten)]
    pub attrs: Attributes,
}

impl AssetOptions {
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Merge `over` on top of `self`, key by key.
    ///
    /// Keys absent from `over` keep their value; a position in `over`
    /// replaces ours.
    pub fn merged(&self, over: &AssetOptions) -> AssetOptions {
        let mut attrs = self.attrs.clone();
        for (k, v) in &over.attrs {
            attrs.insert(k.clone(), v.clone());
        }
        AssetOptions {
            position: over.position.or(self.position),
            attrs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.attrs.is_empty()
    }
}

// ============================================================================
// FileEntry
// ============================================================================

/// One css/js file of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    /// Bare path, relative to the bundle base or an absolute URL.
    Simple(String),
    /// Path with per-file options overriding the bundle options.
    Full {
        path: String,
        #[serde(flatten)]
        options: AssetOptions,
    },
}

impl FileEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::Simple(p) => p,
            Self::Full { path, .. } => path,
        }
    }

    /// Per-file options, if any.
    pub fn options(&self) -> Option<&AssetOptions> {
        match self {
            Self::Simple(_) => None,
            Self::Full { options, .. } => Some(options),
        }
    }

    pub fn with_options(path: impl Into<String>, options: AssetOptions) -> Self {
        Self::Full {
            path: path.into(),
            options,
        }
    }
}

impl From<&str> for FileEntry {
    fn from(p: &str) -> Self {
        Self::Simple(p.to_owned())
    }
}

// ============================================================================
// PublishOptions
// ============================================================================

/// Per-bundle publishing options.
///
/// Hooks cannot be written in TOML; they are attached in code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishOptions {
    /// Glob patterns; when non-empty only matching files are published.
    pub only: Vec<String>,
    /// Glob patterns excluded from publishing (files and directories).
    pub except: Vec<String>,
    /// Republish even if the destination exists. `None` defers to `[publish]`.
    pub force_copy: Option<bool>,
    /// Per-entry veto, also called once for the bundle root.
    #[serde(skip)]
    pub before_copy: Option<BeforeCopy>,
    /// Called after each copied file.
    #[serde(skip)]
    pub after_copy: Option<AfterCopy>,
}

// ============================================================================
// BundleSpec
// ============================================================================

/// Immutable declaration of one asset bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleSpec {
    /// Unpublished origin directory (or single file).
    /// `None` means the files are already web-accessible.
    pub source_path: Option<PathBuf>,
    /// Filesystem directory the files are served from.
    pub base_path: Option<PathBuf>,
    /// URL matching `base_path`.
    pub base_url: Option<String>,
    pub css: Vec<FileEntry>,
    pub js: Vec<FileEntry>,
    pub css_options: AssetOptions,
    pub js_options: AssetOptions,
    /// Bundles that must be registered before this one.
    pub depends: Vec<BundleId>,
    pub publish_options: PublishOptions,
}

impl BundleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self, kind: AssetKind) -> &[FileEntry] {
        match kind {
            AssetKind::Css => &self.css,
            AssetKind::Js => &self.js,
        }
    }

    pub fn options(&self, kind: AssetKind) -> &AssetOptions {
        match kind {
            AssetKind::Css => &self.css_options,
            AssetKind::Js => &self.js_options,
        }
    }

    /// Explicit bundle-level position for `kind`.
    pub fn position(&self, kind: AssetKind) -> Option<Position> {
        self.options(kind).position
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn with_base(mut self, path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self.base_url = Some(url.into());
        self
    }

    pub fn with_css<I, F>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FileEntry>,
    {
        self.css.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_js<I, F>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FileEntry>,
    {
        self.js.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_options(mut self, kind: AssetKind, options: AssetOptions) -> Self {
        match kind {
            AssetKind::Css => self.css_options = options,
            AssetKind::Js => self.js_options = options,
        }
        self
    }

    pub fn with_depends<I, D>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<BundleId>,
    {
        self.depends.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn with_publish_options(mut self, options: PublishOptions) -> Self {
        self.publish_options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_bundle_from_toml() {
        let toml = r#"
base_path = "public/app"
base_url = "/app"
css = ["site.css", { path = "print.css", media = "print" }]
js = ["app.js", { path = "late.js", defer = true }]
js_options = { position = "end", charset = "utf-8" }
depends = ["jquery"]
publish_options = { only = ["js/*"], force_copy = true }
"#;
        let spec: BundleSpec = toml::from_str(toml).unwrap();
        assert_eq!(spec.css.len(), 2);
        assert_eq!(spec.css[1].path(), "print.css");
        assert_eq!(
            spec.css[1].options().unwrap().attrs["media"],
            serde_json::json!("print")
        );
        assert_eq!(spec.position(AssetKind::Js), Some(Position::End));
        assert_eq!(spec.position(AssetKind::Css), None);
        assert_eq!(spec.js_options.attrs["charset"], serde_json::json!("utf-8"));
        assert_eq!(spec.depends, vec![BundleId::from("jquery")]);
        assert_eq!(spec.publish_options.only, vec!["js/*".to_string()]);
        assert_eq!(spec.publish_options.force_copy, Some(true));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(toml::from_str::<BundleSpec>(r#"scripts = ["a.js"]"#).is_err());
    }

    #[test]
    fn test_merge_key_by_key() {
        let base = AssetOptions::default()
            .with_attr("media", "screen")
            .with_attr("hreflang", "en");
        let over = AssetOptions::default().with_attr("media", "tv");
        let merged = base.merged(&over);
        assert_eq!(merged.attrs["media"], serde_json::json!("tv"));
        assert_eq!(merged.attrs["hreflang"], serde_json::json!("en"));
        assert_eq!(merged.position, None);

        let positioned = merged.merged(&AssetOptions::default().with_position(Position::Head));
        assert_eq!(positioned.position, Some(Position::Head));
        // Absent position keeps the base one
        assert_eq!(
            positioned.merged(&AssetOptions::default()).position,
            Some(Position::Head)
        );
    }

    #[test]
    fn test_merge_preserves_key_order() {
        let base = AssetOptions::default()
            .with_attr("media", "screen")
            .with_attr("hreflang", "en");
        let merged = base.merged(&AssetOptions::default().with_attr("media", "tv"));
        let keys: Vec<_> = merged.attrs.keys().cloned().collect();
        assert_eq!(keys, vec!["media", "hreflang"]);
    }

    #[test]
    fn test_builders() {
        let spec = BundleSpec::new()
            .with_base("public/js", "/js")
            .with_js(["jquery.js"])
            .with_depends(["level3"]);
        assert_eq!(spec.files(AssetKind::Js)[0].path(), "jquery.js");
        assert!(spec.files(AssetKind::Css).is_empty());
        assert_eq!(spec.base_url.as_deref(), Some("/js"));
        assert!(spec.source_path().is_none());
    }
}
