//! Queue of failed jobs awaiting a retry decision.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use super::Job;

/// FIFO queue of jobs that failed and should be resubmitted.
///
/// The event handler pushes; an external retry loop drains, either polling
/// with [`try_pop`](RetryQueue::try_pop) or blocking with
/// [`pop`](RetryQueue::pop). A job is pushed at most once per failure, in
/// failure order.
#[derive(Default)]
pub struct RetryQueue {
    jobs: Mutex<VecDeque<Job>>,
    available: Condvar,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, job: Job) {
        self.jobs.lock().unwrap().push_back(job);
        self.available.notify_one();
    }

    /// Dequeue the oldest failed job without blocking.
    pub fn try_pop(&self) -> Option<Job> {
        self.jobs.lock().unwrap().pop_front()
    }

    /// Dequeue the oldest failed job, waiting up to `timeout` for one to
    /// arrive. Returns `None` on timeout.
    pub fn pop(&self, timeout: Duration) -> Option<Job> {
        let jobs = self.jobs.lock().unwrap();
        let (mut jobs, _) = self
            .available
            .wait_timeout_while(jobs, timeout, |queue| queue.is_empty())
            .unwrap();
        jobs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().unwrap().is_empty()
    }
}
