//! External collaborators the supervisor reports to and samples from.
//!
//! - [`StatusReporter`] / [`StatusBoard`]: status lines and statistics
//! - [`HealthProbe`] / [`SystemMemoryProbe`]: memory usage for the heartbeat
//! - [`Clock`] / [`LocalClock`]: hour/day sampling for the heartbeat

mod clock;
mod probe;
mod reporter;

pub use clock::{Clock, ClockSnapshot, LocalClock};
pub use probe::{HealthProbe, MemorySample, SystemMemoryProbe};
pub use reporter::{StatValue, StatusBoard, StatusReporter};
