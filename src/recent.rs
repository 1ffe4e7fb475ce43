use crate::models::ScoreResult;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default number of results kept in memory.
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded, insertion-ordered buffer of recent score results.
///
/// The capacity check and eviction run under the same lock as the append,
/// so concurrent writers can never push the buffer past its bound.
#[derive(Debug)]
pub struct RecentScores {
    capacity: usize,
    entries: Mutex<VecDeque<ScoreResult>>,
}

impl Default for RecentScores {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RecentScores {
    /// Creates an empty buffer. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `result`, evicting the oldest entry when full.
    pub fn push(&self, result: ScoreResult) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            if let Some(evicted) = entries.pop_front() {
                tracing::debug!("Evicted oldest score result {}", evicted.id);
            }
        }
        entries.push_back(result);
    }

    /// Copy of the buffer, oldest first.
    pub fn snapshot(&self) -> Vec<ScoreResult> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
