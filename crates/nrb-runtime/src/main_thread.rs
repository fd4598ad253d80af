#![forbid(unsafe_code)]

//! Main-thread task queue with delayed tasks.
//!
//! All view work runs on one logical UI thread. Work that must happen "a bit
//! later" (restoring a toolkit limit once an asynchronous edit has settled,
//! moving the caret after the toolkit reset it) is posted here and executed
//! when the host pumps the queue.
//!
//! # Key Invariants
//!
//! 1. **Due order**: tasks run in non-decreasing due time.
//! 2. **FIFO ties**: tasks with the same due time run in post order.
//! 3. **Causality**: a task posted while handling mutation N runs after N's
//!    synchronous effects, because nothing runs until the next pump.
//! 4. **Generation filter**: [`MainThreadQueue::drain_current`] drops tasks
//!    tagged with an older [`Generation`] instead of running them.
//!
//! # Example
//! ```
//! use nrb_runtime::main_thread::MainThreadQueue;
//! use web_time::{Duration, Instant};
//!
//! let mut queue = MainThreadQueue::new();
//! let now = Instant::now();
//! queue.post_delayed(now, Duration::from_millis(100), "restore");
//! queue.post(now, "caret");
//!
//! assert_eq!(queue.drain_due(now), vec!["caret"]);
//! assert_eq!(queue.drain_due(now + Duration::from_millis(100)), vec!["restore"]);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use web_time::{Duration, Instant};

use crate::generation::{Generation, Tagged};

/// A task waiting in the queue.
#[derive(Debug)]
struct Scheduled<T> {
    due: Instant,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed so the max-heap pops the earliest task first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Queue statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks posted.
    pub posted: u64,
    /// Tasks handed back for execution.
    pub executed: u64,
    /// Tasks discarded because their generation was stale.
    pub dropped_stale: u64,
}

/// Single-threaded queue of immediate and delayed tasks.
#[derive(Debug)]
pub struct MainThreadQueue<T> {
    heap: BinaryHeap<Scheduled<T>>,
    next_seq: u64,
    stats: QueueStats,
}

impl<T> Default for MainThreadQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MainThreadQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            stats: QueueStats::default(),
        }
    }

    /// Post a task to run on the next pump at or after `now`.
    pub fn post(&mut self, now: Instant, task: T) {
        self.post_at(now, task);
    }

    /// Post a task to run once `delay` has elapsed after `now`.
    pub fn post_delayed(&mut self, now: Instant, delay: Duration, task: T) {
        self.post_at(now + delay, task);
    }

    fn post_at(&mut self, due: Instant, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.stats.posted += 1;
        self.heap.push(Scheduled { due, seq, task });
    }

    /// Remove and return every task due at or before `now`, in run order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|s| s.due <= now) {
            if let Some(scheduled) = self.heap.pop() {
                due.push(scheduled.task);
            }
        }
        self.stats.executed += due.len() as u64;
        due
    }

    /// Earliest pending due time, for hosts that sleep until the next task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|s| s.due)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Counters since creation.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.stats
    }
}

impl<T> MainThreadQueue<Tagged<T>> {
    /// Like [`drain_due`](Self::drain_due), but drops tasks whose generation
    /// differs from `current`.
    pub fn drain_current(&mut self, now: Instant, current: Generation) -> Vec<T> {
        let due = self.drain_due(now);
        let total = due.len();
        let live: Vec<T> = due
            .into_iter()
            .filter_map(|tagged| tagged.into_current(current))
            .collect();
        let stale = (total - live.len()) as u64;
        self.stats.executed -= stale;
        self.stats.dropped_stale += stale;
        live
    }
}
