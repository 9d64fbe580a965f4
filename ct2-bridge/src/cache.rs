//! Keyed cache for loaded models and tokenizers
//!
//! Loading a model is expensive, so pipelines keep translators (and their
//! tokenizers) keyed by model identifier. With [`ModelLifetime::Dispose`]
//! everything is dropped at [`ModelCache::cleanup`], which pipelines call
//! after each request; with [`ModelLifetime::KeepAlive`] entries stay until
//! evicted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

/// What happens to cached entries after a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelLifetime {
    /// Release entries at every cleanup
    Dispose,
    /// Keep entries until explicitly evicted
    #[default]
    KeepAlive,
}

#[derive(Debug)]
pub struct ModelCache<T> {
    mode: ModelLifetime,
    entries: HashMap<String, T>,
}

impl<T> ModelCache<T> {
    pub fn new(mode: ModelLifetime) -> Self {
        Self {
            mode,
            entries: HashMap::new(),
        }
    }

    pub fn mode(&self) -> ModelLifetime {
        self.mode
    }

    /// Get the entry for `ident`, loading it first if needed
    ///
    /// A failing loader leaves the cache untouched.
    pub fn get_or_try_insert_with<E, F>(&mut self, ident: &str, load: F) -> Result<&mut T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        match self.entries.entry(ident.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                debug!("Cache miss for {}", ident);
                let value = load()?;
                Ok(entry.insert(value))
            }
        }
    }

    pub fn get(&self, ident: &str) -> Option<&T> {
        self.entries.get(ident)
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.entries.contains_key(ident)
    }

    /// Remove and return one entry
    pub fn evict(&mut self, ident: &str) -> Option<T> {
        self.entries.remove(ident)
    }

    /// Remove every entry regardless of mode
    pub fn drain(&mut self) -> Vec<(String, T)> {
        self.entries.drain().collect()
    }

    /// Drop all entries when the cache is in dispose mode
    pub fn cleanup(&mut self) {
        if self.mode == ModelLifetime::Dispose && !self.entries.is_empty() {
            debug!("Releasing {} cached entries", self.entries.len());
            self.entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for ModelCache<T> {
    fn default() -> Self {
        Self::new(ModelLifetime::KeepAlive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_loader_runs_once_per_ident() {
        let calls = Cell::new(0);
        let mut cache: ModelCache<String> = ModelCache::default();
        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with("m2m100", || {
                    calls.set(calls.get() + 1);
                    Ok::<_, ()>("loaded".to_string())
                })
                .unwrap();
            assert_eq!(value, "loaded");
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_loader_error_is_not_cached() {
        let mut cache: ModelCache<u32> = ModelCache::default();
        let result = cache.get_or_try_insert_with("bad", || Err("no such model"));
        assert_eq!(result, Err("no such model"));
        assert!(cache.is_empty());

        let value = cache
            .get_or_try_insert_with("bad", || Ok::<_, &str>(7))
            .unwrap();
        assert_eq!(*value, 7);
    }

    #[test]
    fn test_keep_alive_survives_cleanup() {
        let mut cache = ModelCache::new(ModelLifetime::KeepAlive);
        cache
            .get_or_try_insert_with("a", || Ok::<_, ()>(1))
            .unwrap();
        cache.cleanup();
        assert!(cache.contains("a"));
    }

    #[test]
    fn test_dispose_clears_on_cleanup() {
        let mut cache = ModelCache::new(ModelLifetime::Dispose);
        cache
            .get_or_try_insert_with("a", || Ok::<_, ()>(1))
            .unwrap();
        cache
            .get_or_try_insert_with("b", || Ok::<_, ()>(2))
            .unwrap();
        assert_eq!(cache.len(), 2);
        cache.cleanup();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evict() {
        let mut cache = ModelCache::default();
        cache
            .get_or_try_insert_with("a", || Ok::<_, ()>(1))
            .unwrap();
        assert_eq!(cache.evict("a"), Some(1));
        assert_eq!(cache.evict("a"), None);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_drain_ignores_mode() {
        let mut cache = ModelCache::new(ModelLifetime::KeepAlive);
        cache
            .get_or_try_insert_with("a", || Ok::<_, ()>(1))
            .unwrap();
        let drained = cache.drain();
        assert_eq!(drained, vec![("a".to_string(), 1)]);
        assert!(cache.is_empty());
    }
}
