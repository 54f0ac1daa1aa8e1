//! Project configuration for `assetry.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Section definitions and checks
//! │   ├── publish    # [publish]
//! │   └── bundles    # [bundles.*], [overrides]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # AssetConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                        |
//! |--------------------|------------------------------------------------|
//! | `[publish]`        | Publish root, URL, copy/link, timestamps       |
//! | `[aliases]`        | `@name` prefixes used in paths and URLs        |
//! | `[asset_map]`      | Replace asset files by suffix                  |
//! | `[bundles.<id>]`   | Bundle definitions                             |
//! | `[overrides]`      | Per-identity option changes or `false`         |
//!
//! Loading runs in three steps: parse, validate (all problems collected into
//! [`ConfigDiagnostics`]), then normalize aliases and relative paths against
//! the directory holding the config file.

pub mod section;
pub mod types;
mod util;

pub use section::{PublishConfig, PublishFields};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::alias::{AliasError, AliasMap, WEB_ALIAS, WEBROOT_ALIAS};
use crate::bundle::{BundleId, BundleOverride, BundleRegistry, BundleSpec};
use crate::publish::PublisherOptions;
use crate::utils::path::resolve_path;

/// Default config file name.
pub const CONFIG_FILE: &str = "assetry.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `assetry.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory, parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub publish: PublishConfig,
    pub aliases: AliasMap,
    pub asset_map: IndexMap<String, String>,
    pub bundles: IndexMap<BundleId, BundleSpec>,
    pub overrides: IndexMap<BundleId, BundleOverride>,
}

impl AssetConfig {
    /// Load from an explicit path, or search upward from the cwd.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(PathBuf::from("."), e))?;
        let name = explicit.unwrap_or(Path::new(CONFIG_FILE));
        let path = match explicit {
            Some(p) if p.is_absolute() || p.exists() => cwd.join(p),
            _ => find_config_file(name, &cwd).ok_or_else(|| ConfigError::NotFound(cwd.join(name)))?,
        };
        if !path.is_file() {
            return Err(ConfigError::NotFound(path));
        }
        Self::from_path(&path)
    }

    /// Load configuration from a file path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut config = Self::parse(&content, &root)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Parse, validate and normalize TOML content rooted at `root`.
    pub fn parse(content: &str, root: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.root = root.to_path_buf();
        config.finalize()?;
        Ok(config)
    }

    fn finalize(&mut self) -> Result<(), ConfigError> {
        self.default_aliases();

        let mut diag = ConfigDiagnostics::new();
        self.validate(&mut diag);
        if diag.has_errors() {
            return Err(ConfigError::Diagnostics(diag));
        }

        self.normalize(&mut diag);
        if diag.has_errors() {
            return Err(ConfigError::Diagnostics(diag));
        }
        diag.print_warnings();
        Ok(())
    }

    /// `@webroot` → `public`, `@web` → `/` unless configured.
    fn default_aliases(&mut self) {
        if !self.aliases.contains(WEBROOT_ALIAS) {
            self.aliases.set(WEBROOT_ALIAS, "public").ok();
        }
        if !self.aliases.contains(WEB_ALIAS) {
            self.aliases.set(WEB_ALIAS, "/").ok();
        }
    }

    /// Collect every problem in the raw config.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (name, _) in self.aliases.iter() {
            if let Err(e) = AliasMap::check_name(name) {
                diag.error(FieldPath::alias(name), e.to_string());
            }
        }
        for (key, _) in &self.asset_map {
            if key.is_empty() {
                diag.error(FieldPath::new("asset_map"), "asset map keys must not be empty");
            }
        }
        self.publish.validate(diag);
        section::validate_bundles(&self.bundles, &self.overrides, diag);
    }

    /// Resolve aliases and make paths absolute.
    fn normalize(&mut self, diag: &mut ConfigDiagnostics) {
        let aliases = &self.aliases;
        let root = &self.root;
        let path = |raw: &Path| normalize_path_value(aliases, root, raw);

        match path(&self.publish.base_path) {
            Ok(p) => self.publish.base_path = p,
            Err(e) => diag.error(PublishConfig::FIELDS.base_path, e.to_string()),
        }
        match aliases.resolve(&self.publish.base_url) {
            Ok(u) => self.publish.base_url = u,
            Err(e) => diag.error(PublishConfig::FIELDS.base_url, e.to_string()),
        }

        for (id, spec) in &mut self.bundles {
            normalize_location(
                aliases,
                root,
                id,
                "bundles",
                &mut spec.source_path,
                &mut spec.base_path,
                &mut spec.base_url,
                diag,
            );
        }
        for (id, over) in &mut self.overrides {
            if let BundleOverride::Patch(patch) = over {
                normalize_location(
                    aliases,
                    root,
                    id,
                    "overrides",
                    &mut patch.source_path,
                    &mut patch.base_path,
                    &mut patch.base_url,
                    diag,
                );
            }
        }
    }

    // ========================================================================
    // accessors
    // ========================================================================

    /// Bundle registry built from `[bundles]`.
    pub fn registry(&self) -> BundleRegistry {
        let mut registry = BundleRegistry::new();
        for (id, spec) in &self.bundles {
            registry.insert(id.clone(), spec.clone());
        }
        registry
    }

    /// Overrides keyed by identity.
    pub fn override_map(&self) -> FxHashMap<BundleId, BundleOverride> {
        self.overrides
            .iter()
            .map(|(id, o)| (id.clone(), o.clone()))
            .collect()
    }

    /// `@webroot` on disk and `@web` as URL, for files addressed as `@web/...`.
    pub fn web_root(&self) -> Option<(PathBuf, String)> {
        let path = normalize_path_value(&self.aliases, &self.root, Path::new(WEBROOT_ALIAS)).ok()?;
        let url = self.aliases.resolve(WEB_ALIAS).ok()?;
        Some((path, url))
    }

    pub fn publisher_options(&self) -> PublisherOptions {
        self.publish.to_options()
    }
}

fn normalize_path_value(aliases: &AliasMap, root: &Path, raw: &Path) -> Result<PathBuf, AliasError> {
    let expanded = match raw.to_str() {
        Some(s) => PathBuf::from(aliases.resolve(s)?),
        None => raw.to_path_buf(),
    };
    Ok(resolve_path(&expanded, root))
}

#[allow(clippy::too_many_arguments)]
fn normalize_location(
    aliases: &AliasMap,
    root: &Path,
    id: &BundleId,
    table: &str,
    source_path: &mut Option<PathBuf>,
    base_path: &mut Option<PathBuf>,
    base_url: &mut Option<String>,
    diag: &mut ConfigDiagnostics,
) {
    let field = |name: &str| match table {
        "overrides" => FieldPath::override_of(&format!("{id}.{name}")),
        _ => FieldPath::bundle(id.as_str(), name),
    };

    for (name, slot) in [("source_path", source_path), ("base_path", base_path)] {
        if let Some(raw) = slot.as_ref() {
            match normalize_path_value(aliases, root, raw) {
                Ok(p) => *slot = Some(p),
                Err(e) => diag.error(field(name), e.to_string()),
            }
        }
    }
    if let Some(raw) = base_url.as_ref() {
        match aliases.resolve(raw) {
            Ok(u) => *base_url = Some(u),
            Err(e) => diag.error(field("base_url"), e.to_string()),
        }
    }
}

// ============================================================================
// tests
// ============================================================================
