//! Registration coordinator.
//!
//! [`AssetManager`] holds what all sessions share (registry, overrides,
//! publisher, aliases). A [`Session`] is one page render: it registers
//! bundles, remembers them, and hands their files to a renderer at flush.
//!
//! ```text
//! session.register("app")
//!   ├── resolve       order + positions, nothing written on failure
//!   ├── publish       each new bundle with a source path
//!   └── record        base path/url, merged options, effective positions
//! session.render(&mut renderer)
//!   └── per record: css, then js; duplicate file paths render once
//! ```

mod record;
mod render;


pub use record::{RegistrationRecord, default_position};
pub use render::{AssetRenderer, PageAssets, PositionGroup, RenderedFile};

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::alias::{AliasMap, WEB_ALIAS};
use crate::bundle::{AssetKind, AssetOptions, BundleId, BundleOverride, BundleRegistry, BundleSpec, Position};
use crate::config::AssetConfig;
use crate::error::{ConfigurationError, Result};
use crate::publish::Publisher;
use crate::resolve::{RegistrationState, SpecLookup, resolve};

// ============================================================================
// AssetManager
// ============================================================================

/// State shared by every session.
#[derive(Debug, Default)]
pub struct AssetManager {
    registry: BundleRegistry,
    overrides: FxHashMap<BundleId, BundleOverride>,
    publisher: Arc<Publisher>,
    aliases: AliasMap,
    asset_map: IndexMap<String, String>,
    /// `@webroot` directory and `@web` URL.
    web: Option<(PathBuf, String)>,
}

impl AssetManager {
    pub fn new(registry: BundleRegistry, publisher: Arc<Publisher>) -> Self {
        Self {
            registry,
            publisher,
            ..Self::default()
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            registry: config.registry(),
            overrides: config.override_map(),
            publisher: Arc::new(Publisher::new(config.publisher_options())),
            aliases: config.aliases.clone(),
            asset_map: config.asset_map.clone(),
            web: config.web_root(),
        }
    }

    /// Replace the publisher, e.g. one with `force_copy` set.
    pub fn with_publisher(mut self, publisher: Arc<Publisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_override(mut self, id: impl Into<BundleId>, over: impl Into<BundleOverride>) -> Self {
        self.overrides.insert(id.into(), over.into());
        self
    }

    pub fn with_aliases(mut self, aliases: AliasMap) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_asset_map(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.asset_map.insert(from.into(), to.into());
        self
    }

    pub fn with_web(mut self, root: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        self.web = Some((root.into(), url.into()));
        self
    }

    pub fn registry(&self) -> &BundleRegistry {
        &self.registry
    }

    pub fn publisher(&self) -> &Arc<Publisher> {
        &self.publisher
    }

    /// Start a session sharing this manager.
    pub fn session(self: &Arc<Self>) -> Session {
        Session::new(Arc::clone(self))
    }

    /// First asset map target whose key is a `/`-bounded suffix of `path`.
    fn map_asset(&self, path: &str) -> Option<&str> {
        self.asset_map.iter().find_map(|(from, to)| {
            let head = path.strip_suffix(from.as_str())?;
            (head.is_empty() || head.ends_with('/')).then_some(to.as_str())
        })
    }

    /// URL of a file addressed relative to `@web`, timestamped when enabled.
    fn web_url(&self, rest: &str) -> Result<String> {
        match &self.web {
            Some((root, url)) => Ok(self.publisher.file_url(Some(root), url, rest)),
            None => Ok(self.aliases.resolve(&format!("{WEB_ALIAS}/{rest}"))?),
        }
    }

    /// URL for `path` from an asset map target, an alias, or the bundle base.
    fn file_url(&self, record: &RegistrationRecord, path: &str) -> Result<String> {
        let path = self.map_asset(path).unwrap_or(path);
        if let Some(rest) = path.strip_prefix(WEB_ALIAS).and_then(|r| r.strip_prefix('/')) {
            return self.web_url(rest);
        }
        if path.starts_with('@') {
            return Ok(self.aliases.resolve(path)?);
        }
        Ok(self.publisher.file_url(
            record.base_path.as_deref(),
            record.base_url.as_deref().unwrap_or(""),
            path,
        ))
    }
}

/// Effective specs: registry entries with overrides applied.
impl SpecLookup for AssetManager {
    fn lookup(&self, id: &str) -> Option<Arc<BundleSpec>> {
        let spec = self.registry.get(id)?;
        match self.overrides.get(id) {
            Some(BundleOverride::Enabled(false)) => Some(Arc::new(BundleSpec::default())),
            Some(BundleOverride::Patch(patch)) => Some(Arc::new(patch.apply(spec))),
            _ => Some(Arc::clone(spec)),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// A file registered outside any bundle.
#[derive(Debug, Clone)]
struct Standalone {
    key: String,
    file: RenderedFile,
}

/// One page's registrations. Single-threaded; create one per render.
#[derive(Debug)]
pub struct Session {
    manager: Arc<AssetManager>,
    /// Dependency-first registration order.
    records: IndexMap<BundleId, RegistrationRecord>,
    standalone: Vec<Standalone>,
}

impl RegistrationState for Session {
    fn is_registered(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    fn position(&self, id: &str, kind: AssetKind) -> Option<Position> {
        self.records.get(id).and_then(|r| r.position(kind))
    }
}

impl Session {
    pub fn new(manager: Arc<AssetManager>) -> Self {
        Self {
            manager,
            records: IndexMap::new(),
            standalone: Vec::new(),
        }
    }

    pub fn manager(&self) -> &Arc<AssetManager> {
        &self.manager
    }

    /// Register a bundle and everything it depends on.
    ///
    /// Registering an already registered bundle returns its record without
    /// side effects. On error nothing is added to the session.
    pub fn register(&mut self, id: impl Into<BundleId>) -> Result<&RegistrationRecord> {
        let id = id.into();
        if !self.records.contains_key(&id) {
            self.register_new(&id)?;
        }
        self.records
            .get(&id)
            .ok_or_else(|| ConfigurationError::UnknownRoot(id).into())
    }

    fn register_new(&mut self, id: &BundleId) -> Result<()> {
        let manager = Arc::clone(&self.manager);
        let resolution = resolve(id, manager.as_ref(), &*self)?;

        // Publish all before recording any, so a failure leaves the session as it was.
        let mut fresh = Vec::with_capacity(resolution.order.len());
        for dep in &resolution.order {
            let spec = manager
                .lookup(dep.as_str())
                .ok_or_else(|| ConfigurationError::UnknownRoot(dep.clone()))?;
            let published = manager.publisher.publish(&spec)?;
            fresh.push(RegistrationRecord::new(dep.clone(), &spec, published));
        }

        for record in fresh {
            crate::debug!("register"; "{} ({:?})", record.id, record.outcome);
            self.records.insert(record.id.clone(), record);
        }
        for (dep, kind, position) in resolution.positions.assigned() {
            if let Some(record) = self.records.get_mut(dep) {
                record.inherit_position(*kind, *position);
            }
        }
        Ok(())
    }

    /// Register a single css or js file outside any bundle.
    ///
    /// `@web/...` URLs point at files under `@webroot` and get timestamps;
    /// other aliases are expanded; everything else is used verbatim.
    /// Returns the URL that will be rendered.
    pub fn register_file(&mut self, kind: AssetKind, url: &str, options: AssetOptions) -> Result<String> {
        if let Some(existing) = self
            .standalone
            .iter()
            .find(|s| s.file.kind == kind && s.key == url)
        {
            return Ok(existing.file.url.clone());
        }

        let resolved = match url.strip_prefix(WEB_ALIAS).and_then(|r| r.strip_prefix('/')) {
            Some(rest) => self.manager.web_url(rest)?,
            None => self.manager.aliases.resolve(url)?,
        };
        self.standalone.push(Standalone {
            key: url.to_string(),
            file: RenderedFile {
                bundle: None,
                kind,
                position: options.position.unwrap_or(default_position(kind)),
                url: resolved.clone(),
                attributes: options.attrs,
            },
        });
        Ok(resolved)
    }

    pub fn record(&self, id: &str) -> Option<&RegistrationRecord> {
        self.records.get(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &RegistrationRecord> {
        self.records.values()
    }

    /// Registered identities, dependency-first.
    pub fn order(&self) -> Vec<&str> {
        self.records.keys().map(BundleId::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.standalone.is_empty()
    }

    /// Hand every file to `renderer`. Returns the number of files rendered.
    ///
    /// Bundles render in registration order, css before js, followed by
    /// standalone files. A file path already rendered for the same kind is
    /// skipped; the first registration wins.
    pub fn render<R: AssetRenderer + ?Sized>(&self, renderer: &mut R) -> Result<usize> {
        let mut seen: FxHashSet<(AssetKind, &str)> = FxHashSet::default();
        let mut count = 0;

        for record in self.records.values().filter(|r| r.is_available()) {
            for kind in AssetKind::ALL {
                for entry in record.files(kind) {
                    if !seen.insert((kind, entry.path())) {
                        continue;
                    }
                    let options = record.file_options(kind, entry);
                    renderer.register_file(RenderedFile {
                        bundle: Some(record.id.clone()),
                        kind,
                        position: options.position.unwrap_or(default_position(kind)),
                        url: self.manager.file_url(record, entry.path())?,
                        attributes: options.attrs,
                    });
                    count += 1;
                }
            }
        }

        for standalone in &self.standalone {
            if seen.insert((standalone.file.kind, standalone.key.as_str())) {
                renderer.register_file(standalone.file.clone());
                count += 1;
            }
        }
        Ok(count)
    }

    /// Render into a fresh [`PageAssets`].
    pub fn page_assets(&self) -> Result<PageAssets> {
        let mut page = PageAssets::new();
        self.render(&mut page)?;
        Ok(page)
    }
}
