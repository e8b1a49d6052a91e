//! Fixed-width moving average for the acceleration channel.

use std::collections::VecDeque;

/// Moving average over the last `capacity` values.
///
/// Per-episode accumulator. Lives in the state machine rather than the
/// fusion filter so that a machine reset also discards the window.
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    window: VecDeque<f64>,
    capacity: usize,
}

impl SmoothingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push one value, dropping the oldest when full, and return the
    /// current average.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
        self.average()
    }

    /// Average of the buffered values. 0 when empty.
    pub fn average(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
