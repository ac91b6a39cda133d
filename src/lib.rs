//! # plugvisor
//!
//! **Plugvisor** is a supervisor for a single pluggable worker module.
//!
//! It loads one worker by name, drives its lifecycle (initialize → start → run →
//! stop → terminate) and multiplexes an operator command channel with periodic
//! housekeeping, without ever blocking the console for more than a bounded time.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   operator text                       ModuleLoader (WorkerRegistry)
//!        │                                        │ load(id)
//!        ▼                                        ▼
//! ┌──────────────┐  next(timeout)  ┌──────────────────────────────────────────┐
//! │CommandChannel│ ───────────────►│  Supervisor (control loop)               │
//! │ Inbox/Console│  Command        │  - SupervisorState (monotonic)           │
//! └──────────────┘  Timeout        │  - HeartbeatScheduler (on Timeout)       │
//!        ▲          Closing        │  - TerminationEscalator (on quit)        │
//!        │                         │  - CleanupGuard (exactly once)           │
//!   QuitHandle                     └──────┬───────────────────────┬───────────┘
//!        │                                │ guarded callbacks     │ publish(Event)
//!        │                                ▼                       ▼
//! ┌──────┴───────┐                 ┌──────────────┐        ┌──────────────┐
//! │WorkerContext │◄────────────────│ WorkerHandle │        │     Bus      │
//! │ log / stats  │                 │ JoinHandle + │        └──────┬───────┘
//! └──────────────┘                 │ Cancellation │               ▼
//!                                  └──────┬───────┘        SubscriberSet
//!                                         ▼                 ┌─────┴─────┐
//!                                   Worker::run()           ▼           ▼
//!                                   (own task)          LogWriter     custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ─► Initializing ─► Running ─► StopRequested ─► Terminating ─► Terminated
//!
//! Running loop:
//!   ├─ Help! / Debug! / NoDebug!      handled by the supervisor
//!   ├─ Heartbeat! or channel timeout  liveness ─► memory ─► hour/day callbacks
//!   ├─ anything else                  Worker::on_command (errors logged, loop continues)
//!   └─ Quit! / channel closing / worker gone ─► leave loop
//!
//! Termination: stop() ─► wait ─► cancel token ─► wait ─► give up (logged)
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                              |
//! |-------------------|-----------------------------------------------------------------|-------------------------------------------------|
//! | **Workers**       | The module contract and its supervisor-side view.               | [`Worker`], [`WorkerContext`], [`WorkerHandle`] |
//! | **Loading**       | Resolve a module identifier to a worker instance.               | [`ModuleLoader`], [`WorkerRegistry`]            |
//! | **Supervision**   | Control loop, heartbeats, bounded termination.                  | [`Supervisor`], [`TerminationEscalator`]        |
//! | **Commands**      | Operator input, timeouts and closing requests.                  | [`CommandChannel`], [`Inbox`], [`ConsoleChannel`] |
//! | **Events**        | Diagnostics as events, gated by the debug flag.                 | [`Event`], [`Logger`], [`Subscribe`]            |
//! | **Status**        | Status lines, statistics, memory and clock collaborators.       | [`StatusReporter`], [`HealthProbe`], [`Clock`]  |
//! | **Errors**        | Typed errors for loading, callbacks and the run.                | [`RuntimeError`], [`CallbackError`]             |
//! | **Configuration** | Centralize runtime settings.                                    | [`SupervisorConfig`]                            |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`] and builds the `plugvisor` console binary.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use plugvisor::{
//!     LaunchArgs, Supervisor, SupervisorConfig, Worker, WorkerContext, WorkerError, WorkerRegistry,
//!     inbox,
//! };
//!
//! #[derive(Default)]
//! struct Hello {
//!     done: tokio::sync::Notify,
//! }
//!
//! #[async_trait]
//! impl Worker for Hello {
//!     async fn initialize(&self, ctx: &WorkerContext) -> Result<(), WorkerError> {
//!         ctx.log("Hello from initialize");
//!         Ok(())
//!     }
//!
//!     async fn run(&self, _ctx: WorkerContext, token: CancellationToken) -> Result<(), WorkerError> {
//!         tokio::select! {
//!             _ = self.done.notified() => Ok(()),
//!             _ = token.cancelled() => Err(WorkerError::Canceled),
//!         }
//!     }
//!
//!     async fn stop(&self) -> Result<(), WorkerError> {
//!         self.done.notify_one();
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn plugvisor::Subscribe>> = vec![Arc::new(plugvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn plugvisor::Subscribe>> = Vec::new();
//!
//!     let sup = Supervisor::builder(SupervisorConfig::default())
//!         .with_loader(WorkerRegistry::new().register("Hello", Hello::default))
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let (tx, channel) = inbox(16);
//!     tx.send("Quit!").await;
//!
//!     let shutdown = sup.run(LaunchArgs::new("Hello"), channel).await?;
//!     println!("{:?}", shutdown.termination);
//!     Ok(())
//! }
//! ```

mod channel;
mod core;
mod error;
mod events;
mod status;
mod subscribers;
mod worker;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use channel::{
    Command, CommandChannel, ConsoleChannel, Inbound, Inbox, InboxSender, QuitHandle, inbox,
};
pub use core::{
    Beat, CleanupGuard, DebugState, ExitReason, HeartbeatScheduler, LaunchArgs, Shutdown,
    ShutdownSignal, StopPhase, Supervisor, SupervisorBuilder, SupervisorConfig, SupervisorState,
    Termination, TerminationEscalator, Transitions, wait_for_shutdown_signal,
};
pub use error::{ArgsError, CallbackError, LoadError, RuntimeError, WorkerError};
pub use events::{Bus, Event, EventKind, Logger, Severity};
pub use status::{
    Clock, ClockSnapshot, HealthProbe, LocalClock, MemorySample, StatValue, StatusBoard,
    StatusReporter, SystemMemoryProbe,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use worker::{ModuleLoader, Worker, WorkerContext, WorkerHandle, WorkerRegistry};

// Built-in console renderer.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
