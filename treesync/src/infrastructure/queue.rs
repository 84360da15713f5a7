// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! A bounded blocking queue, the connective tissue between the
//! scheduler and the reader/writer pools.
//!
//! Mirrors `fastsync`'s `ThreadsafeBuffer<T>`, which wraps a
//! `pthread_mutex_t` / `pthread_cond_t` pair around a capacity-bounded
//! deque. Here that's a `std::sync::{Mutex, Condvar}` pair; the
//! shutdown protocol is a sentinel value rather than a bolted-on
//! stop flag, so a worker that is blocked in `pop` when the run ends
//! still wakes up and exits instead of needing a second signal.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

enum Slot<T> {
    Item(T),
    Sentinel,
}

/// What `pop` hands back: either real work, or the queue has been
/// closed and the caller should stop pulling from it.
pub enum PopResult<T> {
    Item(T),
    Closed,
}

pub struct BoundedQueue<T> {
    capacity: usize,
    state: Mutex<VecDeque<Slot<T>>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "a bounded queue needs a positive capacity");
        BoundedQueue {
            capacity,
            state: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Blocks until there's room, then enqueues `item`.
    pub fn push(&self, item: T) {
        let mut state = self.state.lock().unwrap();
        while state.len() >= self.capacity {
            state = self.not_full.wait(state).unwrap();
        }
        state.push_back(Slot::Item(item));
        self.not_empty.notify_one();
    }

    /// Blocks until something is available, then returns it.
    pub fn pop(&self) -> PopResult<T> {
        let mut state = self.state.lock().unwrap();
        while state.is_empty() {
            state = self.not_empty.wait(state).unwrap();
        }
        let slot = state.pop_front().expect("checked non-empty above");
        self.not_full.notify_one();
        match slot {
            Slot::Item(item) => PopResult::Item(item),
            Slot::Sentinel => PopResult::Closed,
        }
    }

    /// Current occupancy. Used by the scheduler to prefer draining the
    /// written queue over scanning for new work without blocking on an
    /// empty queue (spec §4.4 step 1).
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pads the queue up to capacity with sentinels, one per worker
    /// that can still be blocked in `pop`. Called once the scheduler
    /// has no more real work to ever push onto this queue.
    pub fn fill_with_sentinels(&self) {
        let mut state = self.state.lock().unwrap();
        while state.len() < self.capacity {
            state.push_back(Slot::Sentinel);
        }
        self.not_empty.notify_all();
    }

    /// Drops whatever is still queued. Used during shutdown on a queue
    /// downstream of one that was just closed, once nothing will ever
    /// pop from it again, so a producer still holding a reference isn't
    /// left pushing into a queue nobody drains.
    pub fn drain_and_discard(&self) {
        let mut state = self.state.lock().unwrap();
        state.clear();
        self.not_full.notify_all();
    }
}
