//! Client buffer management.
//!
//! The engine never touches a client buffer directly. At open time the
//! client hands over two copy primitives, and every payload move between
//! the scratch frame and client memory goes through them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

/// Opaque token naming a client buffer. Only the client's copy primitives
/// know what it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// Copy `dst.len()` bytes from the client buffer into `dst`.
pub type CopyFromFn = Box<dyn Fn(&mut [u8], BufferId) -> bool + Send + Sync>;

/// Copy all of `src` into the client buffer.
pub type CopyToFn = Box<dyn Fn(BufferId, &[u8]) -> bool + Send + Sync>;

/// Pair of copy primitives bound to one open of the device.
pub struct BufferAdapter {
    copy_from: CopyFromFn,
    copy_to: CopyToFn,
}

impl BufferAdapter {
    pub fn new(copy_from: CopyFromFn, copy_to: CopyToFn) -> Self {
        Self { copy_from, copy_to }
    }

    /// Client buffer → scratch.
    pub(crate) fn copy_in(&self, dst: &mut [u8], src: BufferId) -> Result<()> {
        if (self.copy_from)(dst, src) {
            Ok(())
        } else {
            Err(Error::BadArgument)
        }
    }

    /// Scratch → client buffer.
    pub(crate) fn copy_out(&self, dst: BufferId, src: &[u8]) -> Result<()> {
        if (self.copy_to)(dst, src) {
            Ok(())
        } else {
            Err(Error::BadArgument)
        }
    }
}

impl core::fmt::Debug for BufferAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("BufferAdapter")
    }
}

// ── Client-side pool ─────────────────────────────────────────

/// Thread-safe pool of client byte buffers.
///
/// Convenience for clients that keep their packets in ordinary heap
/// memory: allocate buffers, pass their [`BufferId`]s with requests, and
/// open the device with [`BufferPool::adapter`].
#[derive(Clone, Default)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

#[derive(Default)]
struct PoolInner {
    next_id: AtomicUsize,
    buffers: Mutex<HashMap<BufferId, Vec<u8>>>,
}

impl PoolInner {
    fn buffers(&self) -> MutexGuard<'_, HashMap<BufferId, Vec<u8>>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffer holding `data` and return its id.
    pub fn insert(&self, data: &[u8]) -> BufferId {
        let id = BufferId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.buffers().insert(id, data.to_vec());
        id
    }

    /// Register an empty buffer, e.g. as a read target.
    pub fn alloc(&self) -> BufferId {
        self.insert(&[])
    }

    /// Current contents of a buffer.
    pub fn contents(&self, id: BufferId) -> Option<Vec<u8>> {
        self.inner.buffers().get(&id).cloned()
    }

    /// Drop a buffer. Later copies naming it fail.
    pub fn release(&self, id: BufferId) -> Option<Vec<u8>> {
        self.inner.buffers().remove(&id)
    }

    /// Copy primitives operating on this pool.
    pub fn adapter(&self) -> BufferAdapter {
        let from = Arc::clone(&self.inner);
        let to = Arc::clone(&self.inner);
        BufferAdapter::new(
            Box::new(move |dst: &mut [u8], src: BufferId| {
                match from.buffers().get(&src) {
                    Some(buf) if buf.len() >= dst.len() => {
                        dst.copy_from_slice(&buf[..dst.len()]);
                        true
                    }
                    _ => false,
                }
            }),
            Box::new(move |dst: BufferId, src: &[u8]| match to.buffers().get_mut(&dst) {
                Some(buf) => {
                    buf.clear();
                    buf.extend_from_slice(src);
                    true
                }
                None => false,
            }),
        )
    }
}
