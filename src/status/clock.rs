//! Wall-clock sampling for hour/day transitions.

use chrono::{Datelike, Local, Timelike};

/// Hour and day captured at one heartbeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSnapshot {
    /// `0..=23`.
    pub hour_of_day: u32,
    /// `1..=31`.
    pub day_of_month: u32,
}

/// Source of [`ClockSnapshot`]s.
pub trait Clock: Send + Sync + 'static {
    /// Samples the current local time.
    fn snapshot(&self) -> ClockSnapshot;
}

/// [`Clock`] reading the local time zone through `chrono`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn snapshot(&self) -> ClockSnapshot {
        let now = Local::now();
        ClockSnapshot {
            hour_of_day: now.hour(),
            day_of_month: now.day(),
        }
    }
}
