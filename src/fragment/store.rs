//! Fragment storage backends.

use dashmap::DashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Deferred call recorded in place of dynamic content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicCall {
    /// Name the callback was registered under.
    pub name: String,
    pub params: serde_json::Value,
}

/// A cached region: raw content plus the placeholders still inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedFragment {
    pub content: String,
    /// Placeholder → call, in the order the calls were made.
    pub placeholders: IndexMap<String, DynamicCall>,
}

/// Key-value backend for cached fragments.
pub trait FragmentStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedFragment>;

    /// Store `fragment`. `ttl` of `None` keeps it until removed.
    fn set(&self, key: &str, fragment: CachedFragment, ttl: Option<Duration>);

    fn remove(&self, key: &str);
}

/// In-process store. Expired entries are dropped on access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, (CachedFragment, Option<Instant>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl FragmentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<CachedFragment> {
        {
            let entry = self.entries.get(key)?;
            if !is_expired(entry.1) {
                return Some(entry.0.clone());
            }
        }
        // The entry may have been replaced since the read guard was dropped.
        self.entries.remove_if(key, |_, (_, deadline)| is_expired(*deadline));
        None
    }

    fn set(&self, key: &str, fragment: CachedFragment, ttl: Option<Duration>) {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.entries.insert(key.to_string(), (fragment, deadline));
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

fn is_expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(content: &str) -> CachedFragment {
        CachedFragment {
            content: content.to_string(),
            placeholders: IndexMap::new(),
        }
    }

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("k").is_none());

        store.set("k", fragment("hello"), None);
        assert_eq!(store.get("k").unwrap().content, "hello");
        assert_eq!(store.len(), 1);

        store.remove("k");
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let store = MemoryStore::new();
        store.set("k", fragment("gone"), Some(Duration::ZERO));
        assert!(store.get("k").is_none());
        assert!(store.is_empty());

        store.set("k", fragment("kept"), Some(Duration::from_secs(3600)));
        assert_eq!(store.get("k").unwrap().content, "kept");
    }
}
