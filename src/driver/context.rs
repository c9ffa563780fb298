//! Driver state.
//!
//! Split in two halves:
//!
//! - [`Shared`] — everything clients touch: both request queues, the open
//!   state with its bound buffer adapter, and the worker's wakeup signals.
//!   Reference-counted between every [`Device`] handle and the worker.
//! - [`DriverContext`] — the worker-exclusive half: the transport, the one
//!   scratch frame buffer and the keepalive counter. Owned by value by the
//!   worker, so TxPath and RxPath can never use the scratch concurrently.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::Vec;
use log::info;

use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::net::frame::{MacAddr, SCRATCH_CAPACITY};
use crate::net::transport::Transport;

use super::buffer::BufferAdapter;
use super::dispatch::Device;
use super::queue::RequestQueue;

/// Wakeup signal: a coalescing flag the worker waits on.
pub(crate) type WakeSignal = Signal<CriticalSectionRawMutex, ()>;

// ── Shared half ──────────────────────────────────────────────

#[derive(Default)]
struct OpenState {
    count: u32,
    adapter: Option<Arc<BufferAdapter>>,
    /// Set at teardown; nothing may be queued afterwards.
    stopped: bool,
}

pub(crate) struct Shared {
    pub(crate) reads: RequestQueue,
    pub(crate) writes: RequestQueue,
    /// Set by clients after queueing a write.
    pub(crate) tx_signal: WakeSignal,
    /// Set by the periodic trigger.
    pub(crate) rx_signal: WakeSignal,
    /// Set once at teardown.
    pub(crate) stop: WakeSignal,
    open: Mutex<OpenState>,
    pub(crate) station: MacAddr,
    pub(crate) max_frame_size: usize,
    pub(crate) line_bps: u32,
}

impl Shared {
    fn new(station: MacAddr, config: &DriverConfig) -> Self {
        Self {
            reads: RequestQueue::new(),
            writes: RequestQueue::new(),
            tx_signal: Signal::new(),
            rx_signal: Signal::new(),
            stop: Signal::new(),
            open: Mutex::new(OpenState::default()),
            station,
            max_frame_size: config.max_frame_size as usize,
            line_bps: config.line_bps,
        }
    }

    fn open_state(&self) -> MutexGuard<'_, OpenState> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `adapter` for a new open. Fails if the device is already open.
    pub(crate) fn bind(&self, adapter: BufferAdapter) -> Result<()> {
        let mut state = self.open_state();
        if state.stopped || state.adapter.is_some() {
            return Err(Error::OpenFailed);
        }
        state.adapter = Some(Arc::new(adapter));
        state.count += 1;
        Ok(())
    }

    /// Release the bound adapter. Returns `false` if nothing was open.
    pub(crate) fn release(&self) -> bool {
        let mut state = self.open_state();
        if state.adapter.take().is_none() {
            return false;
        }
        state.count = state.count.saturating_sub(1);
        true
    }

    pub(crate) fn adapter(&self) -> Option<Arc<BufferAdapter>> {
        self.open_state().adapter.clone()
    }

    /// Run `enqueue` with the bound adapter while the open state is held.
    ///
    /// Teardown takes the same lock in [`Shared::shut`], so a request is
    /// either queued before the final [`Shared::abort_all`] or refused.
    pub(crate) fn admit<R>(&self, enqueue: impl FnOnce(Arc<BufferAdapter>) -> R) -> Result<R> {
        let state = self.open_state();
        if state.stopped {
            return Err(Error::BadArgument);
        }
        let adapter = state.adapter.clone().ok_or(Error::BadArgument)?;
        Ok(enqueue(adapter))
    }

    /// Refuse further opens and requests, and drop the bound adapter.
    pub(crate) fn shut(&self) {
        let mut state = self.open_state();
        state.stopped = true;
        if state.adapter.take().is_some() {
            state.count = state.count.saturating_sub(1);
        }
    }

    pub(crate) fn open_count(&self) -> u32 {
        self.open_state().count
    }

    /// Complete every still-queued request with [`Error::Aborted`].
    pub(crate) fn abort_all(&self) -> usize {
        let mut n = 0;
        for req in self.writes.drain().into_iter().chain(self.reads.drain()) {
            req.complete(Err(Error::Aborted));
            n += 1;
        }
        n
    }
}

// ── Worker-exclusive half ────────────────────────────────────

/// Transport whose every call runs inside the system-wide
/// hardware-exclusion section. One section covers exactly one call.
pub(crate) struct HwTransport<T> {
    inner: T,
}

impl<T: Transport> HwTransport<T> {
    pub(crate) fn exclusive<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|_| f(&mut self.inner))
    }
}

/// Worker-owned driver state plus a handle to the shared half.
pub struct DriverContext<T: Transport> {
    pub(crate) shared: Arc<Shared>,
    pub(crate) hw: HwTransport<T>,
    pub(crate) scratch: Vec<u8, SCRATCH_CAPACITY>,
    pub(crate) keepalive_tick: u8,
    pub(crate) keepalive_interval: u8,
}

impl<T: Transport> DriverContext<T> {
    /// Build the context around an initialised transport.
    ///
    /// Reads the station address once; clients are served from this copy
    /// and never reach the transport themselves.
    pub fn new(transport: T, config: &DriverConfig) -> Result<Self> {
        config.validate()?;

        let mut hw = HwTransport { inner: transport };
        let station = hw.exclusive(|t| t.local_address());
        info!("driver context ready, station {}", station);

        Ok(Self {
            shared: Arc::new(Shared::new(station, config)),
            hw,
            scratch: Vec::new(),
            keepalive_tick: 0,
            keepalive_interval: config.keepalive_interval,
        })
    }

    /// A new client handle onto this driver.
    pub fn device(&self) -> Device {
        Device::new(Arc::clone(&self.shared))
    }

    pub fn transport(&self) -> &T {
        &self.hw.inner
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.hw.inner
    }

    /// Requests waiting in the (read, write) queues.
    pub fn queued(&self) -> (usize, usize) {
        (self.shared.reads.len(), self.shared.writes.len())
    }
}
