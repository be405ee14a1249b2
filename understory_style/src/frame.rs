// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-scoped memoization.
//!
//! ## Overview
//!
//! A [`FrameClock`] counts frames. It is advanced exactly once per scene update and is the only
//! place frame numbers come from.
//!
//! - [`FrameCached`] holds one value that stays valid for the rest of the frame it was computed in.
//! - [`FrameEvictCache`] is a keyed cache whose entries expire after a number of frames without use.
//!
//! Frame numbers must increase monotonically. Repeating or rewinding a frame number makes both
//! caches return stale values.

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;

/// A frame number. Real frames start at `1`; `0` is the "never computed" sentinel.
pub type FrameNumber = u64;

/// Monotonic frame counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    current: FrameNumber,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a clock positioned at the first frame.
    pub const fn new() -> Self {
        Self { current: 1 }
    }

    /// The current frame number.
    pub const fn current(&self) -> FrameNumber {
        self.current
    }

    /// Advance to the next frame and return its number.
    pub fn advance(&mut self) -> FrameNumber {
        self.current = self.current.saturating_add(1);
        self.current
    }
}

/// A value cached until the frame counter moves past the frame it was computed in.
///
/// `get` recomputes when the stored frame is older than the current one.
/// [`invalidate`](Self::invalidate) forces recomputation on the next access regardless of frame.
#[derive(Debug)]
pub struct FrameCached<T: Copy> {
    frame: Cell<FrameNumber>,
    value: Cell<Option<T>>,
}

impl<T: Copy> Default for FrameCached<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> FrameCached<T> {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            frame: Cell::new(0),
            value: Cell::new(None),
        }
    }

    /// Return the cached value for `frame`, computing it with `compute` if stale.
    pub fn get(&self, frame: FrameNumber, compute: impl FnOnce() -> T) -> T {
        if let Some(value) = self.value.get()
            && self.frame.get() >= frame
        {
            return value;
        }
        let value = compute();
        self.value.set(Some(value));
        self.frame.set(frame);
        value
    }

    /// Returns true if a value computed in `frame` (or later) is held.
    pub fn is_valid(&self, frame: FrameNumber) -> bool {
        self.value.get().is_some() && self.frame.get() >= frame
    }

    /// Force the next [`get`](Self::get) to recompute.
    pub fn invalidate(&self) {
        self.frame.set(0);
        self.value.set(None);
    }
}

impl<T: Copy> Clone for FrameCached<T> {
    fn clone(&self) -> Self {
        Self {
            frame: Cell::new(self.frame.get()),
            value: Cell::new(self.value.get()),
        }
    }
}

/// A keyed cache that evicts entries not used for `max_age` frames.
///
/// Purging only happens once the map has reached `target_size`. If a purge removes nothing
/// while the map is at or above the target, the target doubles so that a steady working set
/// larger than the target does not trigger a purge on every insertion.
#[derive(Clone, Debug)]
pub struct FrameEvictCache<K, V> {
    entries: HashMap<K, (V, FrameNumber)>,
    target_size: usize,
    max_age: FrameNumber,
}

impl<K: Eq + Hash, V> Default for FrameEvictCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> FrameEvictCache<K, V> {
    /// Default number of entries before purging is attempted.
    pub const DEFAULT_TARGET_SIZE: usize = 64;
    /// Default number of frames an unused entry survives.
    pub const DEFAULT_MAX_AGE: FrameNumber = 120;

    /// Create a cache with the default target size and maximum age.
    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_TARGET_SIZE, Self::DEFAULT_MAX_AGE)
    }

    /// Create a cache with explicit limits.
    pub fn with_limits(target_size: usize, max_age: FrameNumber) -> Self {
        Self {
            entries: HashMap::new(),
            target_size,
            max_age,
        }
    }

    /// Current target size (may have grown since construction).
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `value` under `key`, stamped with `frame`.
    pub fn add(&mut self, key: K, value: V, frame: FrameNumber) {
        if self.purge(frame) == 0 && self.entries.len() >= self.target_size {
            self.target_size = self.target_size.saturating_mul(2).max(1);
        }
        self.entries.insert(key, (value, frame));
    }

    /// Look up `key`, refreshing its stamp to `frame` on a hit.
    pub fn find(&mut self, key: &K, frame: FrameNumber) -> Option<&V> {
        let (value, stamp) = self.entries.get_mut(key)?;
        *stamp = frame;
        Some(value)
    }

    /// Remove entries last used `max_age` or more frames before `frame`.
    ///
    /// Does nothing while the map is below the target size or while fewer than
    /// `max_age` frames have elapsed. Returns the number of removed entries.
    pub fn purge(&mut self, frame: FrameNumber) -> usize {
        if self.entries.len() < self.target_size || frame < self.max_age {
            return 0;
        }
        let threshold = frame - self.max_age;
        let before = self.entries.len();
        self.entries.retain(|_, (_, stamp)| *stamp > threshold);
        before - self.entries.len()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_one_and_advances() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.current(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.current(), 2);
    }

    #[test]
    fn cached_value_computes_once_per_frame() {
        let cell = FrameCached::<i32>::new();
        let mut calls = 0;
        let a = cell.get(5, || {
            calls += 1;
            10
        });
        let b = cell.get(5, || {
            calls += 1;
            20
        });
        assert_eq!((a, b), (10, 10));
        assert_eq!(calls, 1);

        // A later frame recomputes.
        assert_eq!(cell.get(6, || 30), 30);
    }

    #[test]
    fn invalidate_forces_recompute_in_same_frame() {
        let cell = FrameCached::<i32>::new();
        assert_eq!(cell.get(3, || 1), 1);
        assert!(cell.is_valid(3));
        cell.invalidate();
        assert!(!cell.is_valid(3));
        assert_eq!(cell.get(3, || 2), 2);
    }

    #[test]
    fn evict_cache_refreshes_on_find() {
        let mut cache = FrameEvictCache::with_limits(2, 10);
        cache.add("a", 1, 1);
        cache.add("b", 2, 1);
        // "a" is used again at frame 15, "b" is not.
        assert_eq!(cache.find(&"a", 15), Some(&1));
        assert_eq!(cache.purge(20), 1);
        assert_eq!(cache.find(&"a", 20), Some(&1));
        assert_eq!(cache.find(&"b", 20), None);
    }

    #[test]
    fn evict_cache_purge_needs_target_and_age() {
        let mut cache = FrameEvictCache::with_limits(4, 10);
        cache.add(1, (), 1);
        cache.add(2, (), 1);
        // Below the target size: nothing purged even though entries are old.
        assert_eq!(cache.purge(100), 0);

        let mut cache = FrameEvictCache::with_limits(1, 10);
        cache.add(1, (), 1);
        // Not enough frames elapsed overall.
        assert_eq!(cache.purge(5), 0);
        assert_eq!(cache.purge(11), 1);
    }

    #[test]
    fn evict_cache_doubles_target_when_nothing_expires() {
        let mut cache = FrameEvictCache::with_limits(2, 120);
        cache.add(1, (), 1);
        cache.add(2, (), 1);
        assert_eq!(cache.target_size(), 2);
        // At the target, nothing old enough to purge: target doubles.
        cache.add(3, (), 2);
        assert_eq!(cache.target_size(), 4);
        assert_eq!(cache.len(), 3);
    }
}
