//! Bounded page snapshot cache.
//!
//! Snapshots are evicted strictly in insertion order. Lookups never promote
//! an entry, so this is not an LRU.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::PageKey;
use crate::debug;
use crate::lifecycle::PageState;

/// Snapshot of a page taken when navigating away from it.
#[derive(Debug, Clone)]
pub struct CacheEntry<B> {
    /// Host-owned body handle.
    pub body: B,
    pub title: String,
    /// Vertical scroll offset.
    pub scroll: f64,
    /// Merged `beforeunload` state.
    pub state: PageState,
}

/// Insertion-ordered cache keyed by [`PageKey`].
#[derive(Debug)]
pub struct PageCache<B> {
    capacity: usize,
    order: VecDeque<PageKey>,
    entries: FxHashMap<PageKey, CacheEntry<B>>,
}

impl<B> PageCache<B> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: FxHashMap::default(),
        }
    }

    /// Store a snapshot, evicting the oldest-inserted entry when full.
    ///
    /// Storing under an existing key replaces the snapshot and keeps the
    /// key's first insertion position.
    pub fn store(&mut self, key: PageKey, entry: CacheEntry<B>) {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        if self.entries.len() >= self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.entries.remove(&oldest);
            debug!("cache"; "evicted {}", oldest);
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, entry);
    }

    /// Look up a snapshot without reordering or evicting.
    pub fn restore(&self, key: &PageKey) -> Option<&CacheEntry<B>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &PageKey> {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> CacheEntry<String> {
        CacheEntry {
            body: format!("<body>{title}</body>"),
            title: title.to_string(),
            scroll: 0.0,
            state: PageState::default(),
        }
    }

    #[test]
    fn test_store_and_restore() {
        let mut cache = PageCache::new(15);
        let key = PageKey::mint("blog");
        cache.store(key.clone(), entry("Blog"));

        let hit = cache.restore(&key).unwrap();
        assert_eq!(hit.title, "Blog");
        // restoring leaves the entry in place
        assert!(cache.contains(&key));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_oldest_inserted() {
        let mut cache = PageCache::new(15);
        let keys: Vec<_> = (1..=16).map(|i| PageKey::mint(&i.to_string())).collect();

        for key in &keys[..15] {
            cache.store(key.clone(), entry(key.segment()));
        }
        assert_eq!(cache.len(), 15);

        cache.store(keys[15].clone(), entry("16"));
        assert_eq!(cache.len(), 15);
        assert!(!cache.contains(&keys[0]));
        for key in &keys[1..] {
            assert!(cache.contains(key));
        }
    }

    #[test]
    fn test_restore_does_not_promote() {
        let mut cache = PageCache::new(2);
        let a = PageKey::mint("a");
        let b = PageKey::mint("b");
        let c = PageKey::mint("c");

        cache.store(a.clone(), entry("a"));
        cache.store(b.clone(), entry("b"));
        assert!(cache.restore(&a).is_some());

        cache.store(c.clone(), entry("c"));
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[test]
    fn test_restore_missing() {
        let cache: PageCache<String> = PageCache::new(3);
        assert!(cache.restore(&PageKey::mint("x")).is_none());
    }

    #[test]
    fn test_restore_existing_key_keeps_position() {
        let mut cache = PageCache::new(2);
        let a = PageKey::mint("a");
        let b = PageKey::mint("b");

        cache.store(a.clone(), entry("a"));
        cache.store(b.clone(), entry("b"));
        cache.store(a.clone(), entry("a2"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.restore(&a).unwrap().title, "a2");
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec![&a, &b]);

        cache.store(PageKey::mint("c"), entry("c"));
        assert!(!cache.contains(&a));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = PageCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.store(PageKey::mint("a"), entry("a"));
        cache.store(PageKey::mint("b"), entry("b"));
        assert_eq!(cache.len(), 1);
    }
}
