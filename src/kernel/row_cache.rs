//! LRU cache of materialized kernel rows.

use std::collections::VecDeque;
use std::sync::Arc;

/// A fixed-capacity, most-recently-used-first cache mapping a training index
/// to its materialized kernel row `K[:, i]`.
///
/// Capacity `0` disables caching entirely: every lookup recomputes. At
/// capacity, an eviction reuses the tail entry's buffer in place when no
/// other reader still holds it (`Arc::get_mut` succeeds), avoiding an
/// allocation; otherwise a fresh buffer is allocated and the tail entry is
/// simply dropped from tracking (its buffer stays alive for whoever else
/// holds it).
pub(super) struct RowCache {
    capacity: usize,
    entries: VecDeque<(usize, Arc<[f64]>)>,
}

impl RowCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: VecDeque::new() }
    }

    pub fn get_or_insert(&mut self, index: usize, compute: impl FnOnce() -> Vec<f64>) -> Arc<[f64]> {
        if self.capacity == 0 {
            return compute().into();
        }

        if let Some(pos) = self.entries.iter().position(|&(i, _)| i == index) {
            let entry = self.entries.remove(pos).expect("position just located");
            self.entries.push_front(entry.clone());
            return entry.1;
        }

        let fresh: Arc<[f64]> = if self.entries.len() < self.capacity {
            compute().into()
        } else {
            let (_, mut tail) = self.entries.pop_back().expect("at capacity implies nonempty");
            match Arc::get_mut(&mut tail) {
                Some(slice) => {
                    slice.copy_from_slice(&compute());
                    tail
                }
                None => compute().into(),
            }
        };

        self.entries.push_front((index, fresh.clone()));
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_cache_always_recomputes() {
        let mut cache = RowCache::new(0);
        let mut calls = 0;
        cache.get_or_insert(0, || {
            calls += 1;
            vec![1.0]
        });
        cache.get_or_insert(0, || {
            calls += 1;
            vec![1.0]
        });
        assert_eq!(calls, 2);
    }

    #[test]
    fn hit_avoids_recomputation() {
        let mut cache = RowCache::new(2);
        let mut calls = 0;
        let first = cache.get_or_insert(0, || {
            calls += 1;
            vec![1.0, 2.0]
        });
        let second = cache.get_or_insert(0, || {
            calls += 1;
            vec![9.0, 9.0]
        });
        assert_eq!(calls, 1);
        assert_eq!(&*first, &*second);
    }

    #[test]
    fn eviction_respects_lru_order() {
        let mut cache = RowCache::new(2);
        cache.get_or_insert(0, || vec![0.0]);
        cache.get_or_insert(1, || vec![1.0]);
        // touch 0 so 1 becomes the least-recently-used entry.
        cache.get_or_insert(0, || vec![0.0]);
        cache.get_or_insert(2, || vec![2.0]);

        let mut recomputed_one = false;
        cache.get_or_insert(1, || {
            recomputed_one = true;
            vec![1.0]
        });
        assert!(recomputed_one, "index 1 should have been evicted");

        let mut recomputed_zero = false;
        cache.get_or_insert(0, || {
            recomputed_zero = true;
            vec![0.0]
        });
        assert!(!recomputed_zero, "index 0 should still be cached");
    }

    #[test]
    fn eviction_reuses_buffer_when_uniquely_held() {
        let mut cache = RowCache::new(1);
        let held = cache.get_or_insert(0, || vec![1.0, 2.0]);
        drop(held);
        let second = cache.get_or_insert(1, || vec![3.0, 4.0]);
        assert_eq!(&*second, &[3.0, 4.0]);
    }
}
