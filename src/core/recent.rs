use parking_lot::RwLock;
use std::collections::VecDeque;

use crate::models::WeatherRecord;

pub const DEFAULT_CAPACITY: usize = 10;
pub const DEFAULT_DISPLAY_LIMIT: usize = 5;

/// Bounded, insertion-ordered log of successful lookups
///
/// Appends go to the back and evict from the front once `capacity` is
/// exceeded. Reads take a snapshot, newest first.
#[derive(Debug)]
pub struct RecentSearches {
    entries: RwLock<VecDeque<WeatherRecord>>,
    capacity: usize,
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }

    pub fn append(&self, record: WeatherRecord) {
        let mut entries = self.entries.write();
        entries.push_back(record);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// The `limit` most recent records, most recent first
    pub fn list(&self, limit: usize) -> Vec<WeatherRecord> {
        self.entries.read().iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
