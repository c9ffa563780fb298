//! Driver configuration parameters
//!
//! Tunables for the worker task, frame limits and the keepalive/poll
//! cadence. Defaults match the ENC28J60-class controller the engine was
//! built around: 1518-byte frames on a 10 Mbit/s link.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::net::frame::MAX_FRAME_SIZE;

/// Smallest frame size that still carries a header plus minimum payload.
const MIN_FRAME_SIZE: u16 = 60;

/// Driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    // --- Worker task ---
    /// Worker thread name
    pub task_name: String<16>,
    /// Worker task priority (only honoured on pinned targets)
    pub task_priority: u8,
    /// Worker stack size in KiB
    pub task_stack_kb: usize,

    // --- Link ---
    /// Largest payload a write may carry, and the receive poll length
    pub max_frame_size: u16,
    /// Line bit-rate reported by device queries
    pub line_bps: u32,

    // --- Timing ---
    /// Receive wakeups between keepalive pokes
    pub keepalive_interval: u8,
    /// Period of the receive trigger (milliseconds)
    pub poll_interval_ms: u32,
}

impl DriverConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.task_name.is_empty() {
            return Err(Error::Config("task name must not be empty"));
        }
        if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE as u16).contains(&self.max_frame_size) {
            return Err(Error::Config("max frame size out of range"));
        }
        if self.keepalive_interval == 0 {
            return Err(Error::Config("keepalive interval must be non-zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll interval must be non-zero"));
        }
        Ok(())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        let mut task_name = String::new();
        let _ = task_name.push_str("spinet");

        Self {
            task_name,
            task_priority: 12,
            task_stack_kb: 32,

            max_frame_size: MAX_FRAME_SIZE as u16,
            line_bps: 10_000_000,

            keepalive_interval: 64,
            poll_interval_ms: 20, // ~50 Hz
        }
    }
}
