//! WorkerTask — the single loop that owns the transport.
//!
//! Runs in a dedicated thread using `edge-executor`, with two futures:
//!
//! 1. **Worker** — waits on the write and receive signals, then drains the
//!    write queue and/or polls the transport until both run dry.
//! 2. **Ticker** — the periodic trigger: sets the receive signal every
//!    `poll_interval_ms` via an `async-io-mini` reactor timer.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  Worker thread                                           │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor (until stop signal)  │  │
//!  │  │                                                    │  │
//!  │  │  ┌──────────────┐        ┌──────────────────────┐  │  │
//!  │  │  │ Ticker 50 Hz │──rx──▶ │ Worker               │  │  │
//!  │  │  └──────────────┘        │ Waiting ⇄ Draining   │  │  │
//!  │  │  clients ─────────tx───▶ │ (writes, then reads) │  │  │
//!  │  │                          └──────────────────────┘  │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Both signals coalesce: several writes or ticks before the worker wakes
//! collapse into one drain, which is fine because every drain runs to
//! exhaustion.

use core::time::Duration;
use std::sync::Arc;

use futures_lite::future;
use log::{debug, info};

use crate::net::transport::Transport;

use super::context::{DriverContext, Shared};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Suspended on the signal set.
    Waiting,
    /// Running TxPath and/or RxPath to exhaustion.
    Draining,
}

/// Which signals were set when the worker woke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wake {
    pub tx: bool,
    pub rx: bool,
}

pub struct WorkerTask<T: Transport> {
    ctx: DriverContext<T>,
    state: WorkerState,
}

impl<T: Transport> WorkerTask<T> {
    pub fn new(ctx: DriverContext<T>) -> Self {
        Self {
            ctx,
            state: WorkerState::Waiting,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn context(&self) -> &DriverContext<T> {
        &self.ctx
    }

    /// Suspend until either signal fires, then collect both.
    pub async fn wait(&self) -> Wake {
        let shared = &self.ctx.shared;
        let first = future::or(
            async {
                shared.tx_signal.wait().await;
                Wake { tx: true, rx: false }
            },
            async {
                shared.rx_signal.wait().await;
                Wake { tx: false, rx: true }
            },
        )
        .await;

        Wake {
            tx: first.tx || shared.tx_signal.try_take().is_some(),
            rx: first.rx || shared.rx_signal.try_take().is_some(),
        }
    }

    /// Run one drain cycle: writes first, then reads.
    pub fn drain(&mut self, wake: Wake) {
        self.state = WorkerState::Draining;
        if wake.tx {
            let sent = self.ctx.run_tx();
            if sent > 0 {
                debug!("worker: sent {} frame(s)", sent);
            }
        }
        if wake.rx {
            self.ctx.run_rx();
        }
        self.state = WorkerState::Waiting;
    }

    /// Wait/drain forever. Ends only when the executor is dropped.
    pub async fn run(mut self) {
        loop {
            let wake = self.wait().await;
            self.drain(wake);
        }
    }
}

/// Periodic trigger: set the receive signal every `period`.
async fn ticker(shared: Arc<Shared>, period: Duration) {
    loop {
        async_io_mini::Timer::after(period).await;
        shared.rx_signal.signal(());
    }
}

/// Body of the worker thread. Returns once the stop signal is set.
pub(crate) fn run_worker<T: Transport + 'static>(worker: WorkerTask<T>, period: Duration) {
    let shared = Arc::clone(&worker.ctx.shared);
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();

    executor.spawn(ticker(Arc::clone(&shared), period)).detach();
    executor.spawn(worker.run()).detach();

    info!("worker started (poll every {}ms)", period.as_millis());

    future::block_on(executor.run(shared.stop.wait()));

    info!("worker stopped");
}
