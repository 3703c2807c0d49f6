//! ═══════════════════════════════════════════════════════════════════════════════
//! DEDUP — Bounded Duplicate Guards
//! ═══════════════════════════════════════════════════════════════════════════════
//! The broadcast channel replays and edits messages. Two guards keep the
//! engine idempotent:
//! - trigger side, keyed by round number: an edit never re-triggers
//! - verification side, keyed by (round, text fingerprint): an edit with new
//!   content drives verification exactly once
//! ═══════════════════════════════════════════════════════════════════════════════

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};

/// Default guard capacity before the oldest half is dropped
pub const GUARD_CAPACITY: usize = 500;

/// Insertion-ordered set with a size ceiling. Exceeding the ceiling drops
/// the oldest half rather than evicting one-by-one.
#[derive(Debug)]
pub struct BoundedGuard<K: Eq + Hash + Clone> {
    seen: HashSet<K>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone> BoundedGuard<K> {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(2),
        }
    }

    /// Record a key. Returns false when the key was already present,
    /// in which case the caller skips the event idempotently.
    pub fn insert(&mut self, key: K) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        self.seen.insert(key.clone());
        self.order.push_back(key);
        if self.order.len() > self.capacity {
            self.drop_oldest_half();
        }
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }

    fn drop_oldest_half(&mut self) {
        let drop = self.order.len() / 2;
        for _ in 0..drop {
            if let Some(old) = self.order.pop_front() {
                self.seen.remove(&old);
            }
        }
    }
}

impl<K: Eq + Hash + Clone> Default for BoundedGuard<K> {
    fn default() -> Self {
        Self::new(GUARD_CAPACITY)
    }
}

/// Content fingerprint of a raw announcement text
pub fn text_fingerprint(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
