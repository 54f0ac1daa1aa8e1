//! `[overrides.<name>]` entries: runtime changes keyed by bundle identity.
//!
//! ```toml
//! [overrides]
//! legacy = false                         # register as an empty bundle
//!
//! [overrides.app]
//! js_options = { position = "head" }     # merged key by key
//! base_url = "https://cdn.example.com/app"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{AssetKind, AssetOptions, BundleSpec};

/// Override for one bundle identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BundleOverride {
    /// `false` disables the bundle, `true` is a no-op.
    Enabled(bool),
    Patch(BundlePatch),
}

impl BundleOverride {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Enabled(false))
    }

    pub fn patch(&self) -> Option<&BundlePatch> {
        match self {
            Self::Patch(p) => Some(p),
            Self::Enabled(_) => None,
        }
    }
}

impl From<BundlePatch> for BundleOverride {
    fn from(p: BundlePatch) -> Self {
        Self::Patch(p)
    }
}

/// Field-level replacements applied at registration time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundlePatch {
    pub source_path: Option<PathBuf>,
    pub base_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub css_options: AssetOptions,
    pub js_options: AssetOptions,
}

impl BundlePatch {
    pub fn options(&self, kind: AssetKind) -> &AssetOptions {
        match kind {
            AssetKind::Css => &self.css_options,
            AssetKind::Js => &self.js_options,
        }
    }

    pub fn with_options(mut self, kind: AssetKind, options: AssetOptions) -> Self {
        match kind {
            AssetKind::Css => self.css_options = options,
            AssetKind::Js => self.js_options = options,
        }
        self
    }

    /// Produce the effective spec for one session. The original is untouched.
    pub fn apply(&self, spec: &BundleSpec) -> BundleSpec {
        let mut out = spec.clone();
        if let Some(p) = &self.source_path {
            out.source_path = Some(p.clone());
        }
        if let Some(p) = &self.base_path {
            out.base_path = Some(p.clone());
        }
        if let Some(u) = &self.base_url {
            out.base_url = Some(u.clone());
        }
        out.css_options = spec.css_options.merged(&self.css_options);
        out.js_options = spec.js_options.merged(&self.js_options);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Position;
    use rustc_hash::FxHashMap;

    #[test]
    fn test_overrides_from_toml() {
        let toml = r#"
legacy = false
noop = true

[app]
js_options = { position = "head" }
base_url = "https://cdn.example.com/app"
"#;
        let map: FxHashMap<String, BundleOverride> = toml::from_str(toml).unwrap();
        assert!(map["legacy"].is_disabled());
        assert!(!map["noop"].is_disabled());
        let patch = map["app"].patch().unwrap();
        assert_eq!(patch.js_options.position, Some(Position::Head));
        assert_eq!(patch.base_url.as_deref(), Some("https://cdn.example.com/app"));
    }

    #[test]
    fn test_apply_keeps_original() {
        let spec = BundleSpec::new()
            .with_base("public/app", "/app")
            .with_options(
                AssetKind::Js,
                AssetOptions::default().with_attr("charset", "utf-8"),
            );
        let patch = BundlePatch::default().with_options(
            AssetKind::Js,
            AssetOptions::default().with_position(Position::Begin),
        );

        let applied = patch.apply(&spec);
        assert_eq!(applied.js_options.position, Some(Position::Begin));
        assert_eq!(applied.js_options.attrs["charset"], serde_json::json!("utf-8"));
        assert_eq!(applied.base_url.as_deref(), Some("/app"));
        assert_eq!(spec.js_options.position, None);
    }
}
