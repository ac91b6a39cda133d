//! Runtime events: types, broadcast bus and the gated logger.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Severity`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//! - [`Logger`] source-bound publisher that drops debug events while debug logging is off
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor`, `WorkerHandle` (callback guard and worker task),
//!   `TerminationEscalator`, `HeartbeatScheduler`, `ConsoleChannel`, `WorkerContext`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: `Supervisor::subscriber_listener()` fanning out to `SubscriberSet`.

mod bus;
mod event;
mod logger;

pub use bus::Bus;
pub use event::{Event, EventKind, Severity};
pub use logger::Logger;
