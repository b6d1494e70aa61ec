//! Explicit FIFO microtask queue.
//!
//! Every continuation registered on a [`Promise`](crate::Promise) runs from
//! this queue, never synchronously inside the call that registered it or
//! the call that settled the promise. Making the queue an explicit value
//! (rather than an ambient runtime detail) keeps the ordering contract a
//! testable property:
//!
//! - continuations registered on the same promise fire in registration
//!   order;
//! - across promises, firing order follows the FIFO order in which
//!   settlements scheduled them.
//!
//! The queue is lock-free and safe to feed from multiple threads, but the
//! ordering guarantees above are stated for the usual driving mode: one
//! thread calling [`Scheduler::run_until_idle`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_queue::SegQueue;

use crate::tracing_compat::trace;

/// One unit of deferred work: a single continuation branch.
type Microtask = Box<dyn FnOnce() + Send + 'static>;

/// A FIFO queue of pending continuations.
///
/// A `Scheduler` is the capability every promise constructor and combinator
/// takes explicitly; there is no global queue. Work only runs when the
/// owner drains the queue.
pub struct Scheduler {
    queue: SegQueue<Microtask>,
    scheduled: AtomicU64,
    completed: AtomicU64,
}

impl Scheduler {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
            scheduled: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        }
    }

    /// Appends a task to the back of the queue.
    ///
    /// The task will not run until [`run_until_idle`](Self::run_until_idle)
    /// reaches it. Enqueueing from within a running task is allowed; the
    /// new task joins the same drain.
    pub fn enqueue(&self, task: impl FnOnce() + Send + 'static) {
        self.scheduled.fetch_add(1, Ordering::Relaxed);
        self.queue.push(Box::new(task));
    }

    /// Pops and runs tasks in FIFO order until the queue is empty.
    ///
    /// Tasks scheduled by running tasks are picked up by the same call.
    /// Returns the number of tasks run. The completed counter is bumped
    /// per task, so it stays accurate even if a task panics out of the
    /// drain.
    pub fn run_until_idle(&self) -> u64 {
        let mut ran = 0;
        while let Some(task) = self.queue.pop() {
            task();
            self.completed.fetch_add(1, Ordering::Relaxed);
            ran += 1;
        }
        trace!(ran, "microtask queue drained");
        ran
    }

    /// Number of tasks currently waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue has no waiting tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total number of tasks ever enqueued.
    #[must_use]
    pub fn scheduled(&self) -> u64 {
        self.scheduled.load(Ordering::Relaxed)
    }

    /// Total number of tasks ever run to completion.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("len", &self.len())
            .field("scheduled", &self.scheduled())
            .field("completed", &self.completed())
            .finish()
    }
}
