// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded memoization of text metrics.
//!
//! The cache is a pure performance aid: entries are keyed by `(text, style)` and may be evicted
//! at any time without changing layout results. It is owned by whoever constructs it (usually a
//! [`CachedTextMeasurer`]), never global.

use alloc::string::String;
use core::cell::RefCell;

use hashbrown::HashMap;

use crate::{FontFamily, FontStyle, FontWeight, TextMeasurer, TextMetrics, TextStyle};

/// Default number of entries kept by [`MeasureCache::default`].
const DEFAULT_CAPACITY: usize = 512;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    font_size_bits: u64,
    family: FontFamily,
    weight: FontWeight,
    style: FontStyle,
}

impl CacheKey {
    fn new(text: &str, style: &TextStyle) -> Self {
        Self {
            text: String::from(text),
            font_size_bits: style.font_size.to_bits(),
            family: style.font_family.clone(),
            weight: style.font_weight,
            style: style.font_style,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct CacheEntry {
    metrics: TextMetrics,
    last_used: u64,
}

/// A least-recently-used cache of [`TextMetrics`].
#[derive(Clone, Debug)]
pub struct MeasureCache {
    entries: HashMap<CacheKey, CacheEntry>,
    capacity: usize,
    clock: u64,
}

impl Default for MeasureCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MeasureCache {
    /// Creates a cache holding at most `capacity` entries (minimum one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            clock: 0,
        }
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Looks up cached metrics, marking the entry as recently used.
    pub fn get(&mut self, text: &str, style: &TextStyle) -> Option<TextMetrics> {
        self.clock += 1;
        let clock = self.clock;
        let entry = self.entries.get_mut(&CacheKey::new(text, style))?;
        entry.last_used = clock;
        Some(entry.metrics)
    }

    /// Stores metrics, evicting the least recently used entry when full.
    pub fn insert(&mut self, text: &str, style: &TextStyle, metrics: TextMetrics) {
        self.clock += 1;
        let key = CacheKey::new(text, style);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CacheEntry {
                metrics,
                last_used: self.clock,
            },
        );
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            log::trace!("evicting cached metrics for {:?}", key.text);
            self.entries.remove(&key);
        }
    }
}

/// Wraps a measurer with a [`MeasureCache`].
#[derive(Debug)]
pub struct CachedTextMeasurer<M> {
    inner: M,
    cache: RefCell<MeasureCache>,
}

impl<M: TextMeasurer> CachedTextMeasurer<M> {
    /// Wraps `inner` with a default-sized cache.
    pub fn new(inner: M) -> Self {
        Self::with_cache(inner, MeasureCache::default())
    }

    /// Wraps `inner` with the given cache.
    pub fn with_cache(inner: M, cache: MeasureCache) -> Self {
        Self {
            inner,
            cache: RefCell::new(cache),
        }
    }

    /// Returns the wrapped measurer.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Returns the number of cached entries.
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Drops all cached metrics (e.g. after a font change).
    pub fn invalidate(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedTextMeasurer<M> {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        if let Some(metrics) = self.cache.borrow_mut().get(text, style) {
            return metrics;
        }
        let metrics = self.inner.measure(text, style);
        self.cache.borrow_mut().insert(text, style, metrics);
        metrics
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::Cell;

    use super::*;
    use crate::HeuristicTextMeasurer;

    struct CountingMeasurer {
        calls: Cell<usize>,
    }

    impl TextMeasurer for CountingMeasurer {
        fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
            self.calls.set(self.calls.get() + 1);
            HeuristicTextMeasurer.measure(text, style)
        }
    }

    #[test]
    fn repeated_measurements_hit_the_cache() {
        let measurer = CachedTextMeasurer::new(CountingMeasurer {
            calls: Cell::new(0),
        });
        let style = TextStyle::new(12.0);
        let a = measurer.measure("hello", &style);
        let b = measurer.measure("hello", &style);
        assert_eq!(a, b);
        assert_eq!(measurer.inner().calls.get(), 1);

        measurer.measure("hello", &TextStyle::new(14.0));
        assert_eq!(measurer.inner().calls.get(), 2);
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let style = TextStyle::new(10.0);
        let mut cache = MeasureCache::with_capacity(2);
        let m = TextMetrics::default();
        cache.insert("a", &style, m);
        cache.insert("b", &style, m);
        assert!(cache.get("a", &style).is_some());
        cache.insert("c", &style, m);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a", &style).is_some());
        assert!(cache.get("b", &style).is_none());
        assert!(cache.get("c", &style).is_some());
    }
}
