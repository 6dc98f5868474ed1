//! Virtual clock and deferred task queue.
//!
//! The editor never sleeps or spawns. Delayed work (staggered measurement,
//! debounced inserts, focus retries) is queued here with a due time and run
//! when the host advances the clock. Tasks due at the same instant run in
//! the order they were scheduled.

use std::collections::BTreeMap;

#[derive(Debug)]
pub struct TimerQueue<T> {
    now_ms: u64,
    seq: u64,
    pending: BTreeMap<(u64, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            seq: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Queue `task` to run `delay_ms` after now.
    pub fn schedule(&mut self, delay_ms: u64, task: T) {
        let due = self.now_ms.saturating_add(delay_ms);
        self.seq += 1;
        self.pending.insert((due, self.seq), task);
    }

    /// Pop the earliest task due at or before `until`, moving the clock to
    /// its due time. Tasks scheduled while running it are visible to the
    /// next call.
    pub fn pop_due(&mut self, until: u64) -> Option<T> {
        let (&(due, seq), _) = self.pending.first_key_value()?;
        if due > until {
            return None;
        }
        self.now_ms = self.now_ms.max(due);
        self.pending.remove(&(due, seq))
    }

    /// Move the clock forward without running anything.
    pub fn advance_to(&mut self, time_ms: u64) {
        self.now_ms = self.now_ms.max(time_ms);
    }

    /// Drop every pending task. The clock keeps its time.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
