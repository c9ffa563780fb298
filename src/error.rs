//! Unified error types for the packet interface.
//!
//! A single `Error` enum covers every way a client request can fail. It is
//! delivered through the same channel as success: the `Result` of an
//! immediate command, or the completion of a deferred read/write.
//! All variants are `Copy` so completions can be stored in a signal slot
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Client-visible errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Open on a unit other than 0, or on an already-open device.
    OpenFailed,
    /// No bound buffer adapter, or a client copy primitive refused the move.
    BadArgument,
    /// Write payload is larger than the maximum frame size.
    MtuExceeded,
    /// Command code not understood by this device.
    UnsupportedCommand,
    /// Request was cancelled while still queued.
    Aborted,
    /// Catch-all for transport-level failures.
    GenericWireError,
    /// Configuration is invalid.
    Config(&'static str),
}

impl Error {
    /// Secondary wire-level code reported next to the primary error.
    pub const fn wire_error(self) -> WireError {
        match self {
            Self::BadArgument => WireError::BufferError,
            Self::MtuExceeded | Self::UnsupportedCommand | Self::GenericWireError => {
                WireError::Generic
            }
            Self::OpenFailed | Self::Aborted | Self::Config(_) => WireError::None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed => write!(f, "open failed"),
            Self::BadArgument => write!(f, "bad argument"),
            Self::MtuExceeded => write!(f, "MTU exceeded"),
            Self::UnsupportedCommand => write!(f, "unsupported command"),
            Self::Aborted => write!(f, "request aborted"),
            Self::GenericWireError => write!(f, "wire error"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Wire errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    None,
    /// Unspecified link or command failure.
    Generic,
    /// Buffer management failure (missing adapter, refused copy).
    BufferError,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Generic => write!(f, "generic error"),
            Self::BufferError => write!(f, "buffer error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
