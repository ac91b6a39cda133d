//! # Worker module contract.
//!
//! A worker is the externally supplied unit the supervisor loads, initializes,
//! starts on its own task and eventually stops. `initialize`, `run` and `stop`
//! are mandatory; the command and clock callbacks default to no-ops.
//!
//! All callbacks other than `run` are invoked from the supervisor loop, one at a
//! time, so a worker never sees concurrent re-entrant calls from the supervisor.
//! They should return quickly: the supervisor does not cancel an in-flight
//! `on_command`/`on_hourly`/`on_daily`.
//!
//! # Example
//! ```
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use plugvisor::{Worker, WorkerContext, WorkerError};
//!
//! #[derive(Default)]
//! struct Ticker {
//!     stopping: AtomicBool,
//! }
//!
//! #[async_trait]
//! impl Worker for Ticker {
//!     async fn initialize(&self, ctx: &WorkerContext) -> Result<(), WorkerError> {
//!         ctx.debug(format!("parameters: {:?}", ctx.parameter()));
//!         Ok(())
//!     }
//!
//!     async fn run(&self, ctx: WorkerContext, token: CancellationToken) -> Result<(), WorkerError> {
//!         while !self.stopping.load(Ordering::Relaxed) && !token.is_cancelled() {
//!             ctx.log("tick");
//!             tokio::select! {
//!                 _ = token.cancelled() => break,
//!                 _ = tokio::time::sleep(std::time::Duration::from_secs(5)) => {}
//!             }
//!         }
//!         Ok(())
//!     }
//!
//!     async fn stop(&self) -> Result<(), WorkerError> {
//!         self.stopping.store(true, Ordering::Relaxed);
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::WorkerContext;
use crate::error::WorkerError;

/// A loadable worker module.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Called exactly once before `run`. An error aborts the whole supervisor run.
    ///
    /// Start-up parameters are available through [`WorkerContext::parameter`].
    async fn initialize(&self, ctx: &WorkerContext) -> Result<(), WorkerError>;

    /// Body of the worker task. Runs concurrently with the supervisor loop until it
    /// returns; should exit promptly after [`Worker::stop`] or once `token` fires.
    async fn run(&self, ctx: WorkerContext, token: CancellationToken) -> Result<(), WorkerError>;

    /// Cooperative termination request. Must not wait for `run` to finish.
    async fn stop(&self) -> Result<(), WorkerError>;

    /// Operator command that is not a supervisor built-in.
    async fn on_command(&self, ctx: &WorkerContext, _command: &str) -> Result<(), WorkerError> {
        ctx.log("This worker does not support any console commands except 'Quit!'");
        Ok(())
    }

    /// Called from the first heartbeat of every new hour.
    async fn on_hourly(&self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
        Ok(())
    }

    /// Called from the first heartbeat of every new day.
    async fn on_daily(&self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
        Ok(())
    }
}
