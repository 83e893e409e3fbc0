//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events
//! after successful domain mutations. The server installs a sink that turns
//! events into log lines; tests use the mock sink to assert on them.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
