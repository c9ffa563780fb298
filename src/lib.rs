//! spinet — queued packet interface over a byte-serial Ethernet controller.
//!
//! Turns a synchronous, one-frame-at-a-time transport into a device that
//! many clients can use at once: reads and writes are queued, a single
//! worker drains them against the transport, and received frames are
//! matched to pending reads by packet type.
//!
//! ```text
//!  clients ──▶ driver::dispatch::Device ──▶ queues ──▶ driver::worker
//!                                                         │
//!                                         net::transport::Transport
//! ```

#![deny(unused_must_use)]

pub mod config;
pub mod driver;
pub mod error;
pub mod net;

pub use config::DriverConfig;
pub use driver::Driver;
pub use driver::buffer::{BufferAdapter, BufferId, BufferPool};
pub use driver::dispatch::{AbortOutcome, Command, Device, Reply};
pub use driver::request::{Completion, RequestHandle, Transfer};
pub use error::{Error, WireError};
pub use net::frame::MacAddr;
pub use net::transport::{LoopbackTransport, Transport};
