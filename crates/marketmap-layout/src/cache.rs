//! Layout caching for memoization.
//!
//! A heat map is re-rendered far more often than its data or size changes.
//! The cache keys a layout by a fingerprint of the weights and the bounds
//! and stores it as item indices, so it can be handed back as borrowed
//! [`LayoutRect`]s for any item slice with the same ids and values. Entries
//! remember exactly what they were computed for; a fingerprint collision is
//! treated as a miss.

use crate::squarify::{squarify, LayoutRect};
use marketmap_core::{Item, Rect};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tracing::trace;

/// Cache key combining an items fingerprint and the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Hash of item ids and values, in order
    pub items_hash: u64,
    /// Hash of the bounds
    pub bounds_hash: u64,
}

impl CacheKey {
    /// Fingerprint `items` laid out in `bounds`.
    #[must_use]
    pub fn new(items: &[Item], bounds: Rect) -> Self {
        let mut hasher = DefaultHasher::new();
        items.len().hash(&mut hasher);
        for item in items {
            item.id().hash(&mut hasher);
            item.value().to_bits().hash(&mut hasher);
        }
        let items_hash = hasher.finish();

        let mut hasher = DefaultHasher::new();
        rect_bits(bounds).hash(&mut hasher);
        Self {
            items_hash,
            bounds_hash: hasher.finish(),
        }
    }
}

/// Exact inputs of a cached layout: ids and value bits in order, plus the
/// bounds bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LayoutInputs {
    weights: Vec<(String, u64)>,
    bounds: [u64; 4],
}

impl LayoutInputs {
    fn new(items: &[Item], bounds: Rect) -> Self {
        Self {
            weights: items
                .iter()
                .map(|item| (item.id().to_string(), item.value().to_bits()))
                .collect(),
            bounds: rect_bits(bounds),
        }
    }

    fn matches(&self, items: &[Item], bounds: Rect) -> bool {
        self.bounds == rect_bits(bounds)
            && self.weights.len() == items.len()
            && self
                .weights
                .iter()
                .zip(items)
                .all(|((id, bits), item)| id == item.id() && *bits == item.value().to_bits())
    }
}

fn rect_bits(rect: Rect) -> [u64; 4] {
    [rect.x, rect.y, rect.width, rect.height].map(f64::to_bits)
}

/// Cached layout.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    /// What the layout was computed from
    pub inputs: LayoutInputs,
    /// `(item index, rect)` in layout order
    pub placed: Vec<(usize, Rect)>,
    /// Frame when this entry was last used
    pub last_used_frame: u64,
}

/// Layout cache for memoizing squarified layouts.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entries: HashMap<CacheKey, CacheEntry>,
    current_frame: u64,
    hits: usize,
    misses: usize,
}

impl LayoutCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached layout of `items` in `bounds`.
    ///
    /// An entry under the same key that was computed for different inputs
    /// counts as a miss.
    #[must_use]
    pub fn get(&mut self, items: &[Item], bounds: Rect) -> Option<&[(usize, Rect)]> {
        let key = CacheKey::new(items, bounds);
        match self.entries.get_mut(&key) {
            Some(entry) if entry.inputs.matches(items, bounds) => {
                entry.last_used_frame = self.current_frame;
                self.hits += 1;
                Some(&entry.placed)
            }
            Some(_) => {
                trace!(?key, "layout cache key collision");
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert a computed layout of `items` in `bounds`.
    pub fn insert(&mut self, items: &[Item], bounds: Rect, placed: Vec<(usize, Rect)>) {
        self.insert_under(CacheKey::new(items, bounds), items, bounds, placed);
    }

    fn insert_under(
        &mut self,
        key: CacheKey,
        items: &[Item],
        bounds: Rect,
        placed: Vec<(usize, Rect)>,
    ) {
        self.entries.insert(
            key,
            CacheEntry {
                inputs: LayoutInputs::new(items, bounds),
                placed,
                last_used_frame: self.current_frame,
            },
        );
    }

    /// Squarify `items` into `bounds`, reusing a cached result computed for
    /// the same ids, values and bounds.
    pub fn layout<'a>(&mut self, items: &'a [Item], bounds: Rect) -> Vec<LayoutRect<'a>> {
        let placed = if let Some(placed) = self.get(items, bounds) {
            trace!(items = items.len(), "layout cache hit");
            placed.to_vec()
        } else {
            trace!(items = items.len(), "layout cache miss");
            let weights: Vec<f64> = items.iter().map(Item::value).collect();
            let placed = squarify(&weights, bounds);
            self.insert(items, bounds, placed.clone());
            placed
        };
        placed
            .into_iter()
            .map(|(idx, rect)| LayoutRect {
                item: &items[idx],
                rect,
            })
            .collect()
    }

    /// Clear the entire cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Get the number of cache hits.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Get the number of cache misses.
    #[must_use]
    pub const fn misses(&self) -> usize {
        self.misses
    }

    /// Advance to the next frame and evict stale entries.
    pub fn advance_frame(&mut self) {
        self.current_frame += 1;

        // Evict entries not used in the last 2 frames
        let threshold = self.current_frame.saturating_sub(2);
        self.entries
            .retain(|_, entry| entry.last_used_frame >= threshold);
    }

    /// Get the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
