/// Bounded rolling history of the most recent Readings.
use std::collections::VecDeque;

use crate::models::Reading;

/// Fixed-capacity chronological buffer; pushing past capacity evicts the
/// oldest entry. Mutated only by the control loop.
#[derive(Debug)]
pub struct HistoryBuffer {
    buf: VecDeque<Reading>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        HistoryBuffer {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, reading: Reading) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(reading);
    }

    /// Owned chronological copy, safe to hand to a concurrently-reading
    /// display without exposing the buffer mid-eviction.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.buf.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
