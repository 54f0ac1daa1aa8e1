//! Identity → spec lookup.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::{BundleId, BundleSpec};
use crate::error::ConfigurationError;

/// All known bundles. Read-only once loaded; shared between sessions.
#[derive(Debug, Clone, Default)]
pub struct BundleRegistry {
    bundles: FxHashMap<BundleId, Arc<BundleSpec>>,
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a bundle definition.
    pub fn insert(&mut self, id: impl Into<BundleId>, spec: BundleSpec) -> &mut Self {
        self.bundles.insert(id.into(), Arc::new(spec));
        self
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, id: impl Into<BundleId>, spec: BundleSpec) -> Self {
        self.insert(id, spec);
        self
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Arc<BundleSpec>> {
        self.bundles.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.bundles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Bundle identities, sorted for stable output.
    pub fn ids(&self) -> Vec<&BundleId> {
        let mut ids: Vec<_> = self.bundles.keys().collect();
        ids.sort();
        ids
    }

    /// Report every `depends` entry that names an unknown bundle.
    pub fn unknown_dependencies(&self) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();
        for id in self.ids() {
            for dep in &self.bundles[id].depends {
                if !self.contains(dep.as_str()) {
                    errors.push(ConfigurationError::UnknownBundle {
                        missing: dep.clone(),
                        required_by: id.clone(),
                    });
                }
            }
        }
        errors
    }
}
