//! Asynchronous I/O engine over a one-request-at-a-time transport.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         Driver                                 │
//! │                                                                │
//! │  clients ──▶ Device (dispatch) ──┬──▶ write queue ──┐          │
//! │     ▲                            └──▶ read queue ───┤          │
//! │     │                                               ▼          │
//! │     │        ┌───────────────────────────────────────────┐     │
//! │     └────────│ WorkerTask: TxPath ─▶ Transport ─▶ RxPath │     │
//! │  completion  │  (one thread, one scratch frame)          │     │
//! │              └───────────────────────────────────────────┘     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each queue has its own lock, held only for the queue operation. The
//! transport is touched only by the worker, one call per hardware-exclusion
//! section.

pub mod buffer;
pub mod context;
pub mod dispatch;
pub mod queue;
pub mod request;
mod rx;
mod task_pin;
mod tx;
pub mod worker;

use core::time::Duration;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use crate::config::DriverConfig;
use crate::net::transport::Transport;

use self::context::{DriverContext, Shared};
use self::dispatch::Device;
use self::worker::WorkerTask;

/// A running driver instance: the shared state plus its worker thread.
///
/// Dropping the driver stops the worker and aborts whatever is still queued.
/// [`Device`] handles that outlive it are closed: opens fail with
/// `OpenFailed` and reads or writes with `BadArgument`.
pub struct Driver {
    device: Device,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Driver {
    /// Bring up the transport and start the worker.
    ///
    /// Transport initialisation failure is fatal here.
    pub fn start<T: Transport + 'static>(mut transport: T, config: &DriverConfig) -> Result<Self> {
        config.validate().context("invalid driver config")?;
        transport
            .init()
            .map_err(|e| anyhow!("transport init failed: {e:?}"))?;

        let ctx = DriverContext::new(transport, config).context("driver context")?;
        let shared = Arc::clone(&ctx.shared);
        let device = ctx.device();
        let task = WorkerTask::new(ctx);
        let period = Duration::from_millis(config.poll_interval_ms.into());

        let handle = task_pin::spawn_worker(config, move || worker::run_worker(task, period))
            .context("failed to spawn worker task")?;

        info!("driver started, station {}", shared.station);

        Ok(Self {
            device,
            shared,
            worker: Some(handle),
        })
    }

    /// A new client handle.
    pub fn device(&self) -> Device {
        self.device.clone()
    }

    /// Stop the worker and abort every request still queued. No request
    /// is accepted afterwards.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        self.shared.shut();
        self.shared.stop.signal(());
        if handle.join().is_err() {
            warn!("worker thread panicked");
        }
        let aborted = self.shared.abort_all();
        info!("driver stopped ({} queued request(s) aborted)", aborted);
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.stop();
    }
}
