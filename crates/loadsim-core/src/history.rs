//! Bounded rolling sample history.
//!
//! Each processor keeps a sliding window of load and queue-length samples.
//! The window has a fixed capacity; pushing into a full window silently
//! evicts the oldest sample.

use std::collections::VecDeque;

/// Default number of samples retained per history.
pub const HISTORY_CAPACITY: usize = 100;

/// A fixed-capacity ring buffer of `f64` samples.
///
/// Once `capacity` samples have been pushed, every further push drops
/// the oldest sample, so memory use is bounded regardless of run length.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl RollingHistory {
    /// Create a history with the default capacity of [`HISTORY_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Create a history retaining at most `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a sample, evicting the oldest one if the window is full.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Arithmetic mean of the retained samples, or 0.0 if empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate samples oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new()
    }
}
