//! Deferred events for timed game effects
//!
//! Events are never fired from inside a tick. The owner drains whatever is
//! due at the start of its next tick, so an expiring effect always lands
//! between two ticks.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// Handle for cancelling a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Scheduled<E> {
    due_ms: u64,
    id: TimerId,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        (self.due_ms, self.id) == (other.due_ms, other.id)
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due_ms, self.id).cmp(&(other.due_ms, other.id))
    }
}

/// Min-heap of pending events ordered by due time, then scheduling order
#[derive(Debug)]
pub struct TimerQueue<E> {
    heap: BinaryHeap<Reverse<Scheduled<E>>>,
    cancelled: HashSet<TimerId>,
    next_id: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            cancelled: HashSet::new(),
            next_id: 0,
        }
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse(Scheduled { due_ms, id, event }));
        id
    }

    /// Drop a pending event. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let pending = self.heap.iter().any(|Reverse(s)| s.id == id);
        pending && self.cancelled.insert(id)
    }

    /// Remove and return every event due at or before `now_ms`
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<E> {
        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.heap.peek() {
            if next.due_ms > now_ms {
                break;
            }
            if let Some(Reverse(scheduled)) = self.heap.pop() {
                if !self.cancelled.remove(&scheduled.id) {
                    due.push(scheduled.event);
                }
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.heap.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
    }
}
