//! Process-wide publish cache.
//!
//! Maps a fingerprint to where it was published. Shared by every session of a
//! [`Publisher`](super::Publisher), so a source published once is never looked
//! at on disk again in this process.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

use super::PublishedAsset;

#[derive(Debug, Default)]
pub struct PublishCache {
    entries: DashMap<String, PublishedAsset>,
    /// One lock per fingerprint, held while that fingerprint is published.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PublishCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &str) -> Option<PublishedAsset> {
        self.entries.get(fingerprint).map(|e| e.clone())
    }

    pub fn insert(&self, fingerprint: &str, asset: PublishedAsset) {
        self.entries.insert(fingerprint.to_string(), asset);
    }

    /// Entry whose source is `source`, if published.
    pub fn find_source(&self, source: &Path) -> Option<PublishedAsset> {
        self.entries
            .iter()
            .find(|e| e.source.as_deref() == Some(source))
            .map(|e| e.clone())
    }

    /// Lock for `fingerprint`, created on first use.
    pub(super) fn lock(&self, fingerprint: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(fingerprint.to_string())
            .or_default()
            .clone()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::PublishOutcome;
    use std::path::PathBuf;

    fn asset(path: &str) -> PublishedAsset {
        PublishedAsset {
            source: Some(PathBuf::from("/src")),
            base_path: Some(PathBuf::from(path)),
            base_url: Some("/assets/x".into()),
            outcome: PublishOutcome::Published,
        }
    }

    #[test]
    fn test_insert_get_clear() {
        let cache = PublishCache::new();
        assert!(cache.get("abc").is_none());

        cache.insert("abc", asset("/out/abc"));
        assert_eq!(cache.get("abc").unwrap().base_path, Some(PathBuf::from("/out/abc")));
        assert_eq!(cache.find_source(Path::new("/src")).unwrap().base_url.as_deref(), Some("/assets/x"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lock_is_shared_per_fingerprint() {
        let cache = PublishCache::new();
        let a = cache.lock("abc");
        let b = cache.lock("abc");
        let c = cache.lock("def");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
