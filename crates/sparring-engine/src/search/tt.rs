//! Bounded position cache shared by evaluation and search.
//!
//! Each key holds up to two independent records: the static evaluation
//! memo written by [`Evaluator::evaluate`](crate::eval::Evaluator::evaluate)
//! and a bound-typed search result written by negamax. Once the table holds
//! [`CACHE_CAPACITY`] positions new keys are dropped, but existing keys can
//! still be updated. There is no eviction.

use std::collections::HashMap;

use crate::eval::MATE_THRESHOLD;

/// Maximum number of distinct positions kept.
pub const CACHE_CAPACITY: usize = 100_000;

/// How a stored search score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is exact (a PV node).
    Exact,
    /// The search failed high: the true score is at least this.
    Lower,
    /// The search failed low: the true score is at most this.
    Upper,
}

/// A search result for one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSlot {
    /// Side-to-move relative score, with mate distances counted from this node.
    pub score: i32,
    /// Remaining depth the score was searched to.
    pub depth: i32,
    pub bound: Bound,
}

impl SearchSlot {
    /// The stored score if it settles a node searched to `depth` with the
    /// window `(alpha, beta)`.
    pub fn cutoff(&self, depth: i32, alpha: i32, beta: i32, ply: usize) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        let score = score_from_cache(self.score, ply);
        let usable = match self.bound {
            Bound::Exact => true,
            Bound::Lower => score >= beta,
            Bound::Upper => score <= alpha,
        };
        usable.then_some(score)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CacheEntry {
    static_eval: Option<i32>,
    search: Option<SearchSlot>,
}

/// Store mate scores relative to the node rather than the root so they stay
/// valid when the position is reached along a different path.
pub fn score_to_cache(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_cache`].
pub fn score_from_cache(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Capacity-bounded map from position key to cached evaluations.
#[derive(Debug)]
pub struct TranspositionCache {
    entries: HashMap<u64, CacheEntry>,
    capacity: usize,
}

impl TranspositionCache {
    /// Empty cache holding at most [`CACHE_CAPACITY`] positions.
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    /// Empty cache holding at most `capacity` positions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Static evaluation memo for `key`.
    pub fn get(&self, key: u64) -> Option<i32> {
        self.entries.get(&key).and_then(|e| e.static_eval)
    }

    /// Memoise a static evaluation. A no-op for new keys once full.
    pub fn put(&mut self, key: u64, value: i32) {
        if let Some(entry) = self.slot(key) {
            entry.static_eval = Some(value);
        }
    }

    /// Search result stored for `key`.
    pub fn probe(&self, key: u64) -> Option<SearchSlot> {
        self.entries.get(&key).and_then(|e| e.search)
    }

    /// Store a search result. `score` is root-relative at `ply`; mate scores
    /// are rebased onto the node before storing.
    pub fn store(&mut self, key: u64, score: i32, depth: i32, bound: Bound, ply: usize) {
        if let Some(entry) = self.slot(key) {
            entry.search = Some(SearchSlot {
                score: score_to_cache(score, ply),
                depth,
                bound,
            });
        }
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of positions held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn slot(&mut self, key: u64) -> Option<&mut CacheEntry> {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            return None;
        }
        Some(self.entries.entry(key).or_default())
    }
}

impl Default for TranspositionCache {
    fn default() -> Self {
        Self::new()
    }
}
