//! Insertion-ordered counter map.
//!
//! Rankings sort by count descending with a stable sort, so keys with equal
//! counts keep the order in which they were first seen.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct Tally<K> {
  index: HashMap<K, usize>,
  entries: Vec<(K, u64)>,
}

impl<K> Default for Tally<K> {
  fn default() -> Self {
    Self {
      index: HashMap::new(),
      entries: Vec::new(),
    }
  }
}

impl<K: Copy + Eq + Hash> Tally<K> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Count one more occurrence of `key`, returning its new count.
  pub fn increment(&mut self, key: K) -> u64 {
    let slot = match self.index.get(&key) {
      Some(&i) => i,
      None => {
        self.entries.push((key, 0));
        self.index.insert(key, self.entries.len() - 1);
        self.entries.len() - 1
      }
    };
    self.entries[slot].1 += 1;
    self.entries[slot].1
  }

  pub fn get(&self, key: &K) -> u64 {
    self.index.get(key).map(|&i| self.entries[i].1).unwrap_or(0)
  }

  /// Sum of all counts.
  pub fn total(&self) -> u64 {
    self.entries.iter().map(|(_, c)| c).sum()
  }

  /// Number of distinct keys.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Entries in first-seen order.
  pub fn iter(&self) -> impl Iterator<Item = (K, u64)> + '_ {
    self.entries.iter().copied()
  }

  /// Entries by count descending; ties stay in first-seen order.
  pub fn ranked(&self) -> Vec<(K, u64)> {
    let mut out = self.entries.clone();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
  }

  pub fn clear(&mut self) {
    self.index.clear();
    self.entries.clear();
  }
}
