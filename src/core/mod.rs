//! Supervisor core: configuration, lifecycle state and the control loop.
//!
//! - [`supervisor`]: the command loop and run orchestration;
//! - [`builder`]: wiring of loader, collaborators and subscribers;
//! - [`escalator`]: bounded multi-phase worker termination;
//! - [`heartbeat`]: liveness, memory and hour/day checks on channel timeouts;
//! - [`state`]: monotonic lifecycle states;
//! - [`cleanup`]: one-shot cleanup guard;
//! - [`args`]: startup argument parsing;
//! - [`shutdown`]: cross-platform termination signals.

mod args;
mod builder;
mod cleanup;
mod config;
mod escalator;
mod heartbeat;
mod shutdown;
mod state;
mod supervisor;

pub use args::LaunchArgs;
pub use builder::SupervisorBuilder;
pub use cleanup::CleanupGuard;
pub use config::{DebugState, SupervisorConfig};
pub use escalator::{StopPhase, Termination, TerminationEscalator};
pub use heartbeat::{Beat, HeartbeatScheduler, Transitions};
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
pub use state::SupervisorState;
pub use supervisor::{ExitReason, Shutdown, Supervisor};
