//! Ordered Frequency Tally
//!
//! Counts occurrences of keys while remembering first-seen order.
//! Used for main-species votes and for picking the most frequent caption
//! title; in both places ties must go to the key seen first so output stays
//! stable for identically-ordered input.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Frequency counter with first-seen tie-break
#[derive(Debug, Clone)]
pub struct OrderedTally<K> {
    counts: Vec<(K, usize)>,
    index: FxHashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> OrderedTally<K> {
    pub fn new() -> Self {
        Self {
            counts: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Increment the count for `key`, registering it on first sight.
    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.index.get(key).map_or(0, |&slot| self.counts[slot].1)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Key with the highest count; the earliest key wins ties.
    pub fn winner(&self) -> Option<&K> {
        let mut best: Option<&(K, usize)> = None;
        for entry in &self.counts {
            // Strict comparison keeps the first-seen key on ties
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(key, _)| key)
    }

    /// (key, count) pairs in first-seen order.
    pub fn entries(&self) -> &[(K, usize)] {
        &self.counts
    }
}

impl<K: Clone + Eq + Hash> Default for OrderedTally<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> FromIterator<K> for OrderedTally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Self::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

/// Most frequent item of an iterator, earliest on ties.
pub fn most_frequent<K, I>(items: I) -> Option<K>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = K>,
{
    items.into_iter().collect::<OrderedTally<K>>().winner().cloned()
}
