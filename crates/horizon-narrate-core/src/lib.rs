//! Core systems for Horizon Narrate.
//!
//! This crate provides the plumbing shared by the Horizon Narrate navigation
//! engine:
//!
//! - **Signal/Slot System**: Typed notifications for session observers
//! - **Logging**: `tracing` targets, span names and helper macros
//! - **Errors**: The crate-wide error type for host-facing operations
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_narrate_core::Signal;
//!
//! let closed = Signal::<()>::new();
//! let conn_id = closed.connect(|_| println!("menu closed"));
//! closed.emit(());
//! closed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::{Error, Result};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
