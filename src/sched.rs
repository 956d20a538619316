//! Bounded-concurrency batch executor driving scan and filter passes
//!
//! Work is submitted as a batch of independent closures; `start` runs the
//! whole batch with at most `max_threads` tasks active at once and blocks
//! until every task has finished. The scheduler guarantees bounded
//! concurrency and batch completion only; tasks touching shared state do
//! their own locking.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread;
use tracing::error;

/// One queued unit of work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Default worker count for scan batches
pub const DEFAULT_MAX_THREADS: usize = 8;

/// Batch executor with a fixed upper bound on concurrent tasks
pub struct TaskScheduler {
    queue: VecDeque<Task>,
    max_threads: usize,
}

impl TaskScheduler {
    /// Creates a scheduler with the default worker bound
    pub fn new() -> Self {
        Self::with_max_threads(DEFAULT_MAX_THREADS)
    }

    /// Creates a scheduler running at most `max_threads` tasks at once
    pub fn with_max_threads(max_threads: usize) -> Self {
        TaskScheduler {
            queue: VecDeque::new(),
            max_threads: max_threads.max(1),
        }
    }

    /// Bounds concurrency for subsequent `start` calls.
    ///
    /// Not callable while a batch is running: `start` holds `&mut self`.
    pub fn set_max_threads(&mut self, max_threads: usize) {
        self.max_threads = max_threads.max(1);
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Appends a unit of work to the pending batch
    pub fn queue_task<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push_back(Box::new(task));
    }

    /// Number of queued, not yet started tasks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Runs the queued batch to completion, blocking the caller.
    ///
    /// A panicking task is caught and logged; it never aborts sibling
    /// tasks or leaves the scheduler unrunnable for the next batch.
    pub fn start(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.queue);
        let workers = self.max_threads.min(batch.len());
        let shared = Mutex::new(batch);

        thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| loop {
                    // The lock guards only the pop; tasks run outside it
                    let task = shared
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .pop_front();
                    let Some(task) = task else { break };
                    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                        error!("scheduled task panicked; remaining tasks continue");
                    }
                });
            }
        });
    }

    /// Discards any queued tasks, run or not
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}
