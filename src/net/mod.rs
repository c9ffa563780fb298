//! Link-layer types and the transport boundary.
//!
//! ```text
//! ┌──────────────┐   frames    ┌──────────────┐
//! │ RxPath/TxPath │◀──────────▶│  Transport   │──▶ serial bus ──▶ controller
//! │ (driver)      │            │  (trait)     │
//! └──────────────┘             └──────────────┘
//! ```
//!
//! The driver core is generic over [`transport::Transport`]; the bus and the
//! controller's register programming live behind it.

pub mod frame;
pub mod query;
pub mod transport;
