//! # Heartbeat processing.
//!
//! A heartbeat runs whenever the command channel times out (or on `Heartbeat!`).
//! Each tick, in order:
//!
//! ```text
//! 1. liveness   worker task gone?  ──► Beat::WorkerGone (no further callbacks)
//! 2. memory     sample probe ─► Memory.UsedKB stat ─► edge-triggered high-water warning
//! 3. clock      snapshot vs previous ─► on_hourly() / on_daily() (both may fire)
//!               previous := snapshot
//! ```
//!
//! The warning is raised once when usage goes above the mark and re-armed
//! once usage is back at or below it.

use std::sync::Arc;

use crate::events::{Event, EventKind, Logger};
use crate::status::{Clock, ClockSnapshot, HealthProbe, MemorySample, StatusReporter};
use crate::worker::WorkerHandle;

/// Result of one heartbeat tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Beat {
    /// Worker still running.
    Continue,
    /// Worker task ended on its own; treat as an abnormal quit.
    WorkerGone,
}

/// Which clock callbacks are due.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transitions {
    /// Hour of day changed.
    pub hourly: bool,
    /// Day of month changed.
    pub daily: bool,
}

/// Clock, memory and liveness checks driven by channel timeouts.
pub struct HeartbeatScheduler {
    clock: Arc<dyn Clock>,
    probe: Arc<dyn HealthProbe>,
    status: Arc<dyn StatusReporter>,
    logger: Logger,
    used_stat: String,
    high_water: f64,
    previous: ClockSnapshot,
    warned: bool,
}

impl HeartbeatScheduler {
    /// Creates a scheduler; the first snapshot is taken now.
    pub fn new(
        clock: Arc<dyn Clock>,
        probe: Arc<dyn HealthProbe>,
        status: Arc<dyn StatusReporter>,
        logger: Logger,
        stat_prefix: &str,
        high_water: f64,
    ) -> Self {
        let previous = clock.snapshot();
        Self {
            clock,
            probe,
            status,
            logger,
            used_stat: format!("{stat_prefix}.Memory.UsedKB"),
            high_water,
            previous,
            warned: false,
        }
    }

    /// Runs one full heartbeat against `worker`.
    pub async fn tick(&mut self, worker: &mut WorkerHandle) -> Beat {
        self.logger.emit(Event::new(EventKind::Heartbeat));

        if !worker.is_alive() {
            self.logger.emit(
                Event::new(EventKind::AbnormalCompletion)
                    .with_detail(format!("Abnormal completion of {} detected", worker.id())),
            );
            return Beat::WorkerGone;
        }

        self.check_memory();

        let due = self.advance_clock();
        if due.hourly {
            self.logger
                .emit(Event::new(EventKind::HourChanged).with_detail("Next hour"));
            let _ = worker.on_hourly().await; // logged by the guard
        }
        if due.daily {
            self.logger
                .emit(Event::new(EventKind::DayChanged).with_detail("Next day"));
            let _ = worker.on_daily().await; // logged by the guard
        }
        Beat::Continue
    }

    /// Samples the clock, reports what changed and stores the new snapshot.
    pub fn advance_clock(&mut self) -> Transitions {
        let now = self.clock.snapshot();
        let due = Transitions {
            hourly: now.hour_of_day != self.previous.hour_of_day,
            daily: now.day_of_month != self.previous.day_of_month,
        };
        self.previous = now;
        due
    }

    /// Samples memory, refreshes `Memory.UsedKB` and handles the warning edge.
    ///
    /// Returns the sample taken.
    pub fn check_memory(&mut self) -> MemorySample {
        let sample = self.probe.sample();
        self.status
            .publish_stat(&self.used_stat, sample.used_kb().into());

        if sample.used_fraction() > self.high_water {
            if !self.warned {
                self.warned = true;
                let free_pct = ((1.0 - self.high_water) * 100.0).round() as u32;
                self.logger.emit(Event::new(EventKind::MemoryHighWater).with_detail(format!(
                    "Free memory is below {free_pct} percent ({} KB free)",
                    sample.free_kb()
                )));
            }
        } else if self.warned {
            self.warned = false;
            self.logger.emit(
                Event::new(EventKind::MemoryRecovered).with_detail("Memory usage back to normal"),
            );
        }
        sample
    }

    /// Whether the high-water warning is currently latched.
    pub fn is_warning(&self) -> bool {
        self.warned
    }
}
