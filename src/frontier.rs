//! C2: Frontier — a priority queue over `FetchTask` keyed by `depth`, with
//! FIFO order preserved between tasks of equal depth.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::types::FetchTask;

/// A depth-bucketed FIFO frontier. `BTreeMap` gives non-decreasing-depth
/// iteration for free; each bucket is a `VecDeque` so tasks enqueued at the
/// same depth are dequeued in insertion order — the stable tie-break the
/// spec requires without the seqence-counter bookkeeping a `BinaryHeap`
/// would need.
#[derive(Default)]
pub struct Frontier {
    buckets: Mutex<BTreeMap<u32, VecDeque<FetchTask>>>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(BTreeMap::new()),
            notify: Notify::new(),
        }
    }

    /// Non-blocking, never fails. Inserts behind any task already queued at
    /// the same depth.
    pub fn enqueue(&self, task: FetchTask) {
        let depth = task.depth;
        {
            let mut buckets = self.buckets.lock().unwrap();
            buckets.entry(depth).or_default().push_back(task);
        }
        self.notify.notify_one();
    }

    /// Pops the lowest-depth task, or waits until one is enqueued or
    /// `cancel` fires. Returns `None` only on cancellation — there is no
    /// "queue closed" sentinel otherwise, matching spec §4.2's dequeue
    /// stream semantics.
    pub async fn dequeue(&self, cancel: &CancellationToken) -> Option<FetchTask> {
        loop {
            if let Some(task) = self.pop_lowest() {
                return Some(task);
            }

            tokio::select! {
                _ = self.notify.notified() => continue,
                _ = cancel.cancelled() => return None,
            }
        }
    }

    fn pop_lowest(&self) -> Option<FetchTask> {
        let mut buckets = self.buckets.lock().unwrap();
        let lowest_depth = *buckets.keys().next()?;
        let bucket = buckets.get_mut(&lowest_depth).unwrap();
        let task = bucket.pop_front();
        if bucket.is_empty() {
            buckets.remove(&lowest_depth);
        }
        task
    }
}
