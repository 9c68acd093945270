use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Concurrent queue of ready node indices.
///
/// Any worker may push and pop. Items carry no ordering guarantee; a node is
/// only ever pushed after its readiness was established and its claim won.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<usize>>,
}

impl WorkQueue {
    /// Creates an empty queue.
    pub fn new() -> WorkQueue {
        WorkQueue::default()
    }

    /// Enqueues a claimed node.
    pub fn push(&self, index: usize) {
        self.lock().push_back(index);
    }

    /// Dequeues a node without blocking, `None` if the queue is currently empty.
    pub fn try_pop(&self) -> Option<usize> {
        self.lock().pop_front()
    }

    /// Returns number of queued nodes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no node is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Poisoning is ignored, the deque is never left half-updated.
    fn lock(&self) -> MutexGuard<'_, VecDeque<usize>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}
