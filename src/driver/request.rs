//! Pending read/write requests and their completion slot.
//!
//! A request is created when a read or write is queued and completes
//! exactly once: success, error, or abort. The client keeps a
//! [`RequestHandle`] and waits on it; the worker (or an abort) fills the
//! completion slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::error::Error;
use crate::net::frame::MacAddr;

use super::buffer::{BufferAdapter, BufferId};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Output fields of a finished transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub packet_type: u16,
    pub src: MacAddr,
    pub dst: MacAddr,
    /// Bytes moved to or from the client buffer.
    pub data_len: usize,
    /// Whether the client buffer holds the whole wire frame.
    pub raw: bool,
    /// Destination was the all-ones address.
    pub broadcast: bool,
}

/// Result delivered to the client when a request finishes.
pub type Completion = Result<Transfer, Error>;

/// A queued read or write.
pub struct IoRequest {
    id: u64,
    direction: Direction,
    packet_type: u16,
    raw: bool,
    dst: MacAddr,
    data_len: usize,
    data: BufferId,
    adapter: Arc<BufferAdapter>,
    completed: AtomicBool,
    done: Signal<CriticalSectionRawMutex, Completion>,
}

impl IoRequest {
    pub(crate) fn read(
        packet_type: u16,
        data: BufferId,
        raw: bool,
        adapter: Arc<BufferAdapter>,
    ) -> Arc<Self> {
        Arc::new(Self::new(Direction::Read, packet_type, raw, MacAddr::default(), 0, data, adapter))
    }

    pub(crate) fn write(
        packet_type: u16,
        dst: MacAddr,
        data: BufferId,
        data_len: usize,
        raw: bool,
        adapter: Arc<BufferAdapter>,
    ) -> Arc<Self> {
        Arc::new(Self::new(Direction::Write, packet_type, raw, dst, data_len, data, adapter))
    }

    fn new(
        direction: Direction,
        packet_type: u16,
        raw: bool,
        dst: MacAddr,
        data_len: usize,
        data: BufferId,
        adapter: Arc<BufferAdapter>,
    ) -> Self {
        Self {
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            direction,
            packet_type,
            raw,
            dst,
            data_len,
            data,
            adapter,
            completed: AtomicBool::new(false),
            done: Signal::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn packet_type(&self) -> u16 {
        self.packet_type
    }

    pub fn raw(&self) -> bool {
        self.raw
    }

    pub fn dst(&self) -> MacAddr {
        self.dst
    }

    pub fn data_len(&self) -> usize {
        self.data_len
    }

    pub(crate) fn buffer(&self) -> BufferId {
        self.data
    }

    pub(crate) fn adapter(&self) -> &BufferAdapter {
        &self.adapter
    }

    /// Fill the completion slot. Later calls are ignored.
    pub(crate) fn complete(&self, result: Completion) {
        if self.completed.swap(true, Ordering::AcqRel) {
            log::warn!("request {} completed twice, ignoring", self.id);
            return;
        }
        self.done.signal(result);
    }
}

// ── Client handle ────────────────────────────────────────────

/// Client-side handle to a queued request.
///
/// There is exactly one handle per request and it is not `Clone`: the
/// completion slot holds a single result for a single waiter. Share the
/// handle by reference (e.g. for [`Device::abort`]) but wait on it from one
/// place only.
///
/// ```compile_fail
/// fn dup(h: &spinet::RequestHandle) -> spinet::RequestHandle {
///     h.clone()
/// }
/// ```
///
/// Completion can race with [`Device::abort`]: a request already taken by
/// the worker finishes normally even if an abort was attempted, so waiters
/// must accept either outcome.
///
/// [`Device::abort`]: super::dispatch::Device::abort
pub struct RequestHandle(pub(crate) Arc<IoRequest>);

impl RequestHandle {
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn direction(&self) -> Direction {
        self.0.direction
    }

    pub fn packet_type(&self) -> u16 {
        self.0.packet_type
    }

    /// Whether the request has been completed (the result may already
    /// have been taken).
    pub fn is_done(&self) -> bool {
        self.0.completed.load(Ordering::Acquire)
    }

    /// Wait for the completion.
    pub async fn wait(&self) -> Completion {
        self.0.done.wait().await
    }

    /// Block the calling thread until the request completes.
    pub fn wait_blocking(&self) -> Completion {
        futures_lite::future::block_on(self.wait())
    }

    /// Take the completion if it is already available.
    pub fn try_result(&self) -> Option<Completion> {
        self.0.done.try_take()
    }

    pub(crate) fn same_request(&self, other: &Arc<IoRequest>) -> bool {
        Arc::ptr_eq(&self.0, other)
    }
}

impl core::fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestHandle")
            .field("id", &self.0.id)
            .field("direction", &self.0.direction)
            .field("packet_type", &self.0.packet_type)
            .finish_non_exhaustive()
    }
}
