//! Command dispatcher — the client-facing boundary.
//!
//! Every command either completes immediately (status queries, link
//! commands, validation failures) or is queued and completes later from the
//! worker (reads and writes). Queueing never blocks beyond the queue lock.
//!
//! ```text
//!  client ──▶ begin_io ──┬─▶ Reply::Done / StationAddress / DeviceQuery
//!                        └─▶ queue ──▶ Reply::Pending(handle) ──▶ worker completes
//! ```

use std::sync::Arc;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::net::frame::MacAddr;
use crate::net::query::DeviceQuery;

use super::buffer::{BufferAdapter, BufferId};
use super::context::Shared;
use super::request::{IoRequest, RequestHandle};

/// The only unit this device exposes.
pub const UNIT: u32 = 0;

/// A client command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Wait for a frame of `packet_type`.
    Read {
        packet_type: u16,
        data: BufferId,
        raw: bool,
    },
    /// Send `len` bytes to `dst`.
    Write {
        packet_type: u16,
        dst: MacAddr,
        data: BufferId,
        len: usize,
        raw: bool,
    },
    /// Send `len` bytes to the broadcast address.
    Broadcast {
        packet_type: u16,
        data: BufferId,
        len: usize,
        raw: bool,
    },
    Online,
    Offline,
    ConfigInterface,
    GetStationAddress,
    DeviceQuery {
        size_available: u32,
    },
    // Accepted without effect.
    OnEvent,
    TrackType,
    UntrackType,
    GetTypeStats,
    ReadOrphan,
    GetGlobalStats,
    GetSpecialStats,
    /// Any command code this device does not know.
    Unknown(u16),
}

/// Immediate answer to [`Device::begin_io`].
#[derive(Debug)]
pub enum Reply {
    /// Finished with nothing to report.
    Done,
    /// Local hardware address, reported as both source and destination.
    StationAddress { src: MacAddr, dst: MacAddr },
    DeviceQuery(DeviceQuery),
    /// Queued; completes through the handle.
    Pending(RequestHandle),
}

/// Outcome of [`Device::abort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortOutcome {
    /// Removed from its queue and completed with [`Error::Aborted`].
    Cancelled,
    /// Not queued: already taken by the worker or already completed.
    NotFound,
}

/// Client handle onto one driver instance. Cheap to clone; every clone
/// talks to the same queues.
#[derive(Clone)]
pub struct Device {
    shared: Arc<Shared>,
}

impl Device {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    // ── Open / close ──────────────────────────────────────────

    /// Open `unit` and bind the client's copy primitives.
    pub fn open(&self, unit: u32, adapter: BufferAdapter) -> Result<()> {
        if unit != UNIT {
            return Err(Error::OpenFailed);
        }
        self.shared.bind(adapter)?;
        info!("device opened (unit {})", unit);
        Ok(())
    }

    /// Release the bound copy primitives. Requests already queued keep
    /// the adapter they were queued with.
    pub fn close(&self) {
        if self.shared.release() {
            info!("device closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared.adapter().is_some()
    }

    pub fn open_count(&self) -> u32 {
        self.shared.open_count()
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Execute one command.
    pub fn begin_io(&self, cmd: Command) -> Result<Reply> {
        match cmd {
            Command::Read {
                packet_type,
                data,
                raw,
            } => self.read(packet_type, data, raw).map(Reply::Pending),
            Command::Write {
                packet_type,
                dst,
                data,
                len,
                raw,
            } => self.write(packet_type, dst, data, len, raw).map(Reply::Pending),
            Command::Broadcast {
                packet_type,
                data,
                len,
                raw,
            } => self.broadcast(packet_type, data, len, raw).map(Reply::Pending),
            Command::GetStationAddress => {
                let addr = self.station_address();
                Ok(Reply::StationAddress {
                    src: addr,
                    dst: addr,
                })
            }
            Command::DeviceQuery { size_available } => {
                Ok(Reply::DeviceQuery(self.device_query(size_available)))
            }
            Command::Online => self.online().map(|()| Reply::Done),
            Command::Offline => self.offline().map(|()| Reply::Done),
            Command::ConfigInterface => self.configure_interface().map(|()| Reply::Done),
            Command::OnEvent
            | Command::TrackType
            | Command::UntrackType
            | Command::GetTypeStats
            | Command::ReadOrphan
            | Command::GetGlobalStats
            | Command::GetSpecialStats => Ok(Reply::Done),
            Command::Unknown(code) => {
                debug!("unsupported command {}", code);
                Err(Error::UnsupportedCommand)
            }
        }
    }

    /// Queue a read for the next frame of `packet_type`.
    pub fn read(&self, packet_type: u16, data: BufferId, raw: bool) -> Result<RequestHandle> {
        self.shared.admit(|adapter| {
            let req = IoRequest::read(packet_type, data, raw, adapter);
            debug!("read[{}] queued, type=0x{:04x}", req.id(), packet_type);
            self.shared.reads.push_back(Arc::clone(&req));
            RequestHandle(req)
        })
    }

    /// Queue a frame for `dst`.
    pub fn write(
        &self,
        packet_type: u16,
        dst: MacAddr,
        data: BufferId,
        len: usize,
        raw: bool,
    ) -> Result<RequestHandle> {
        self.enqueue_write(packet_type, dst, data, len, raw)
    }

    /// Queue a frame for every station on the link.
    pub fn broadcast(
        &self,
        packet_type: u16,
        data: BufferId,
        len: usize,
        raw: bool,
    ) -> Result<RequestHandle> {
        self.enqueue_write(packet_type, MacAddr::BROADCAST, data, len, raw)
    }

    fn enqueue_write(
        &self,
        packet_type: u16,
        dst: MacAddr,
        data: BufferId,
        len: usize,
        raw: bool,
    ) -> Result<RequestHandle> {
        if len > self.shared.max_frame_size {
            return Err(Error::MtuExceeded);
        }
        let handle = self.shared.admit(|adapter| {
            let req = IoRequest::write(packet_type, dst, data, len, raw, adapter);
            debug!("write[{}] queued, {} bytes to {}", req.id(), len, dst);
            self.shared.writes.push_back(Arc::clone(&req));
            RequestHandle(req)
        })?;
        self.shared.tx_signal.signal(());
        Ok(handle)
    }

    // ── Link commands ─────────────────────────────────────────

    // The controller has no link state to toggle; these succeed as long
    // as a caller could reach them at all.

    pub fn online(&self) -> Result<()> {
        debug!("online");
        Ok(())
    }

    pub fn offline(&self) -> Result<()> {
        debug!("offline");
        Ok(())
    }

    /// Station address is fixed by the controller, so there is nothing
    /// to configure.
    pub fn configure_interface(&self) -> Result<()> {
        debug!("configure interface: station {}", self.shared.station);
        Ok(())
    }

    // ── Immediate queries ─────────────────────────────────────

    pub fn station_address(&self) -> MacAddr {
        self.shared.station
    }

    /// Capability descriptor for a caller that can take `size_available` bytes.
    pub fn device_query(&self, size_available: u32) -> DeviceQuery {
        DeviceQuery::build(
            size_available,
            self.shared.max_frame_size as u32,
            self.shared.line_bps,
        )
    }

    // ── Cancellation ──────────────────────────────────────────

    /// Cancel a request if it is still queued.
    ///
    /// Best effort: a request the worker has already taken completes
    /// normally and this returns [`AbortOutcome::NotFound`].
    pub fn abort(&self, handle: &RequestHandle) -> AbortOutcome {
        let found = self
            .shared
            .reads
            .remove(handle)
            .or_else(|| self.shared.writes.remove(handle));

        match found {
            Some(req) => {
                debug!("request {} aborted", req.id());
                req.complete(Err(Error::Aborted));
                AbortOutcome::Cancelled
            }
            None => AbortOutcome::NotFound,
        }
    }

    // ── Trigger hook ──────────────────────────────────────────

    /// Wake the worker's receive side. Called by the periodic trigger;
    /// extra or missed calls only change how often the transport is polled.
    pub fn trigger_poll(&self) {
        self.shared.rx_signal.signal(());
    }
}

impl core::fmt::Debug for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("station", &self.shared.station)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
