//! Domain layer for rask-log-client.
//!
//! Contains the canonical types shared across all modules:
//! - `Event`: one log record, from the caller through the interceptor chain
//!   to the transport
//! - `EventData`/`Fields`/`Field`: the payload, which may hold error values
//! - `Level`: event severity (Debug/Info/Warn/Error)

pub mod event;
pub mod level;

pub use event::{Event, EventData, Field, Fields};
pub use level::Level;
