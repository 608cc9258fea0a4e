//! Bounded memo of layout results keyed by node identity and width.
//!
//! Widths are compared by their exact bit pattern (`f64::to_bits`): a width
//! that differs in the last bit is a different key. Eviction is least
//! recently used once the entry count reaches capacity.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::nodes::NodeId;

use super::result::LayoutResult;

pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    node: NodeId,
    width_bits: u64,
}

impl CacheKey {
    fn new(node: NodeId, width: f64) -> Self {
        Self {
            node,
            width_bits: width.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hits over lookups, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner {
    entries: LruCache<CacheKey, Arc<LayoutResult>>,
    hits: u64,
    misses: u64,
}

/// Thread-safe layout cache. Share it behind an `Arc` between solvers.
pub struct LayoutCache {
    inner: Mutex<Inner>,
}

impl LayoutCache {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub fn get(&self, node: NodeId, width: f64) -> Option<Arc<LayoutResult>> {
        let mut inner = self.inner.lock();
        let found = inner.entries.get(&CacheKey::new(node, width)).cloned();
        if found.is_some() {
            inner.hits += 1;
            log::trace!("layout cache hit for {node} at {width}");
        } else {
            inner.misses += 1;
            log::trace!("layout cache miss for {node} at {width}");
        }
        found
    }

    /// Stores `result` under its node's id and `width`, replacing any entry
    /// already there.
    pub fn set(&self, result: Arc<LayoutResult>, width: f64) {
        let key = CacheKey::new(result.node.id(), width);
        self.inner.lock().entries.put(key, result);
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            size: inner.entries.len(),
            capacity: inner.entries.cap().get(),
        }
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutCache")
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Size, StyledText};
    use crate::nodes::Node;
    use pretty_assertions::assert_eq;

    fn result(width: f64) -> Arc<LayoutResult> {
        Arc::new(LayoutResult {
            node: Node::text("x"),
            size: Size::new(width, 20.0),
            styled_text: StyledText::new(),
            children: vec![],
        })
    }

    #[test]
    fn hit_needs_same_node_and_width() {
        let cache = LayoutCache::default();
        let r = result(100.0);
        let id = r.node.id();
        cache.set(r, 100.0);

        assert_eq!(cache.get(id, 100.0).unwrap().size, Size::new(100.0, 20.0));
        assert!(cache.get(id, 100.5).is_none());
        assert!(cache.get(id, f64::from_bits(100.0f64.to_bits() + 1)).is_none());
        assert!(cache.get(crate::nodes::NodeId::new(), 100.0).is_none());
    }

    #[test]
    fn set_overwrites() {
        let cache = LayoutCache::default();
        let first = result(10.0);
        let node = first.node.clone();
        cache.set(first, 50.0);
        cache.set(
            Arc::new(LayoutResult {
                node: node.clone(),
                size: Size::new(1.0, 1.0),
                styled_text: StyledText::new(),
                children: vec![],
            }),
            50.0,
        );
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(node.id(), 50.0).unwrap().size, Size::new(1.0, 1.0));
    }

    #[test]
    fn clear_empties() {
        let cache = LayoutCache::default();
        let r = result(1.0);
        let id = r.node.id();
        cache.set(r, 1.0);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(id, 1.0).is_none());
    }

    #[test]
    fn bounded_by_capacity() {
        let cache = LayoutCache::new(3);
        for i in 0..10 {
            cache.set(result(i as f64), i as f64);
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.capacity(), 3);
        assert_eq!(LayoutCache::new(0).capacity(), 1);
    }

    #[test]
    fn stats_count_lookups() {
        let cache = LayoutCache::new(8);
        let r = result(5.0);
        let id = r.node.id();
        cache.set(r, 5.0);
        cache.get(id, 5.0);
        cache.get(id, 6.0);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size, stats.capacity), (1, 1, 1, 8));
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn concurrent_access_is_safe() {
        let cache = Arc::new(LayoutCache::new(64));
        let node = Node::text("shared");
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                let node = node.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let width = (i % 16) as f64;
                        cache.set(
                            Arc::new(LayoutResult {
                                node: node.clone(),
                                size: Size::new(width, t as f64),
                                styled_text: StyledText::new(),
                                children: vec![],
                            }),
                            width,
                        );
                        if let Some(hit) = cache.get(node.id(), width) {
                            assert_eq!(hit.size.width, width);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.len() <= 16);
    }
}
