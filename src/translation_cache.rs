//! Bidirectional text <-> text memo table shared by every widget.
//!
//! A completed translation is stored in both directions so that translating
//! the result again restores the source without a backend round trip.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::constants::TRANSLATION_CACHE_CAPACITY;

pub struct TranslationCache {
    entries: LruCache<String, String>,
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::with_capacity(TRANSLATION_CACHE_CAPACITY)
    }
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `capacity` counts directed entries; it is raised to 2 so one pair always fits.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(2)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Store `a -> b` and `b -> a`.
    pub fn put(&mut self, a: &str, b: &str) {
        self.insert_directed(a, b);
        if a != b {
            self.insert_directed(b, a);
        }
    }

    /// Counterpart of `text`, if a translation involving it completed before.
    pub fn lookup(&mut self, text: &str) -> Option<String> {
        self.entries.get(text).cloned()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn insert_directed(&mut self, from: &str, to: &str) {
        let displaced = self.entries.push(from.to_string(), to.to_string());
        // A replaced or evicted entry leaves its reverse direction dangling.
        if let Some((old_from, old_to)) = displaced {
            if old_to == to && old_from == from {
                return;
            }
            if old_to != from && self.entries.peek(&old_to).is_some_and(|back| *back == old_from) {
                self.entries.pop(&old_to);
            }
        }
    }
}
