//! FIFO request queue with its own lock.
//!
//! The lock is held only for the push/pop/scan itself, never across a
//! transport call or a completion.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::request::{IoRequest, RequestHandle};

#[derive(Default)]
pub(crate) struct RequestQueue {
    inner: Mutex<VecDeque<Arc<IoRequest>>>,
}

impl RequestQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<IoRequest>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push_back(&self, req: Arc<IoRequest>) {
        self.lock().push_back(req);
    }

    pub(crate) fn pop_front(&self) -> Option<Arc<IoRequest>> {
        self.lock().pop_front()
    }

    /// Remove and return the first request (from the head) matching `pred`.
    pub(crate) fn take_first(&self, pred: impl Fn(&IoRequest) -> bool) -> Option<Arc<IoRequest>> {
        let mut q = self.lock();
        let pos = q.iter().position(|r| pred(r))?;
        q.remove(pos)
    }

    /// Remove the request behind `handle` if it is still queued.
    pub(crate) fn remove(&self, handle: &RequestHandle) -> Option<Arc<IoRequest>> {
        let mut q = self.lock();
        let pos = q.iter().position(|r| handle.same_request(r))?;
        q.remove(pos)
    }

    /// Empty the queue, returning everything in FIFO order.
    pub(crate) fn drain(&self) -> Vec<Arc<IoRequest>> {
        self.lock().drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}
