//! Unbounded blocking queue shared between producers and the dispatch worker

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

struct QueueState<T> {
    items: VecDeque<T>,
    stopped: bool,
}

/// Thread-safe unbounded FIFO with a one-shot stop signal
///
/// All operations are serialized by a single lock. `pop_blocking` parks on a
/// condition variable until an item arrives or the queue is stopped; once stopped
/// it only waits while items remain, so no caller can block forever.
///
/// # Example
///
/// ```
/// use rust_log_dispatcher::core::LogQueue;
///
/// let queue = LogQueue::new();
/// queue.push(1);
/// queue.push(2);
/// queue.stop();
///
/// assert_eq!(queue.pop_blocking(), Some(1));
/// assert_eq!(queue.pop_blocking(), Some(2));
/// assert_eq!(queue.pop_blocking(), None);
/// ```
pub struct LogQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
}

impl<T> LogQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                stopped: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append to the tail and wake one waiter. Accepted after `stop()` too.
    pub fn push(&self, item: T) {
        let mut state = self.state.lock();
        state.items.push_back(item);
        self.available.notify_one();
    }

    /// Remove the head if present, never blocks
    pub fn pop_nonblocking(&self) -> Option<T> {
        self.state.lock().items.pop_front()
    }

    /// Wait for the head item
    ///
    /// Returns `None` only when the queue is stopped and empty.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.stopped {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Signal stop and release every blocked waiter. Idempotent.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.stopped = true;
        self.available.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    pub fn size(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}

impl<T> Default for LogQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
