//! # Process-scoped supervisor configuration.
//!
//! [`SupervisorConfig`] centralizes every tunable of a run: the heartbeat clock,
//! the termination budgets, the memory high-water mark and the shared
//! [`DebugState`]. One instance is created per process and handed explicitly to
//! each component; nothing here lives in a global.
//!
//! ## Sentinel values
//! - `poll_interval = 0s` → clamped to 1ms
//! - `memory_high_water` outside `(0, 1]` → clamped into range
//! - `bus_capacity = 0` → clamped to 1

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Shared verbose-logging flag.
///
/// Cloning shares the flag. Mutated only by `Debug!`/`NoDebug!` commands and the
/// startup arguments; read by every log call.
#[derive(Clone, Debug, Default)]
pub struct DebugState(Arc<AtomicBool>);

impl DebugState {
    /// Creates a flag with the given initial value.
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    /// Current value.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sets the flag; returns the previous value.
    #[inline]
    pub fn set(&self, enabled: bool) -> bool {
        self.0.swap(enabled, Ordering::Relaxed)
    }
}

/// Configuration for one supervisor process.
///
/// ## Field semantics
/// - `heartbeat_interval`: channel timeout; a heartbeat is synthesized each time it elapses
/// - `stop_call_timeout`: bound on the `Worker::stop()` call itself
/// - `stop_wait`: liveness polling budget after the cooperative stop
/// - `interrupt_wait`: liveness polling budget after the cancellation token fires
/// - `poll_interval`: sleep between liveness polls
/// - `memory_high_water`: used-memory fraction above which a warning is raised once
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Name used as the source of supervisor log lines and for the status line.
    pub name: String,

    /// How long the loop waits for a command before running heartbeat processing.
    pub heartbeat_interval: Duration,

    /// Maximum time granted to `Worker::stop()` before escalation proceeds anyway.
    pub stop_call_timeout: Duration,

    /// Time to wait for the worker to exit after the cooperative stop.
    pub stop_wait: Duration,

    /// Time to wait for the worker to exit after cancellation.
    pub interrupt_wait: Duration,

    /// Interval between liveness polls during termination.
    pub poll_interval: Duration,

    /// Memory usage fraction that triggers the low-memory warning.
    pub memory_high_water: f64,

    /// Capacity of the event bus ring buffer.
    pub bus_capacity: usize,

    /// Verbose logging flag shared by every component of the process.
    pub debug: DebugState,
}

impl SupervisorConfig {
    /// Returns the poll interval, never zero.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Returns the high-water mark clamped into `(0, 1]`.
    #[inline]
    pub fn memory_high_water_clamped(&self) -> f64 {
        if self.memory_high_water.is_nan() || self.memory_high_water <= 0.0 {
            0.90
        } else {
            self.memory_high_water.min(1.0)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Worst-case time termination may take before control returns to the supervisor.
    ///
    /// Each wait may overshoot by at most one poll interval.
    pub fn termination_budget(&self) -> Duration {
        let poll = self.poll_interval_clamped();
        self.stop_call_timeout + self.stop_wait + self.interrupt_wait + poll * 2
    }

    /// Builder-style toggle for the initial debug state.
    pub fn with_debug(self, enabled: bool) -> Self {
        self.debug.set(enabled);
        self
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `heartbeat_interval = 15s`
    /// - `stop_call_timeout = 1s`
    /// - `stop_wait = 3s`, `interrupt_wait = 3s`, `poll_interval = 250ms`
    /// - `memory_high_water = 0.90`
    /// - `bus_capacity = 1024`
    /// - debug logging off
    fn default() -> Self {
        Self {
            name: "plugvisor".to_string(),
            heartbeat_interval: Duration::from_secs(15),
            stop_call_timeout: Duration::from_secs(1),
            stop_wait: Duration::from_secs(3),
            interrupt_wait: Duration::from_secs(3),
            poll_interval: Duration::from_millis(250),
            memory_high_water: 0.90,
            bus_capacity: 1024,
            debug: DebugState::default(),
        }
    }
}
