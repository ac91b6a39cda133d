//! # Runtime events emitted by the supervisor, the worker handle and the channel.
//!
//! The [`EventKind`] enum classifies event types across four groups:
//! - **Supervisor lifecycle**: state changes, debug toggles, shutdown, cleanup
//! - **Worker lifecycle**: load, callback entry/exit/failure, exit, termination phases
//! - **Heartbeat**: hour/day transitions, memory high-water warnings, abnormal completion
//! - **Subscriber health**: overflow and panics inside subscribers
//!
//! Free-form log lines use [`EventKind::Message`] / [`EventKind::Trace`].
//! Every kind has a fixed [`Severity`]; debug-severity events are dropped at the
//! source by [`Logger`](crate::Logger) unless debug logging is on.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use plugvisor::{Event, EventKind, Severity};
//!
//! let ev = Event::new(EventKind::CallbackFailed)
//!     .with_source("HelloWorld")
//!     .with_callback("on_command")
//!     .with_detail("boom");
//!
//! assert_eq!(ev.kind.severity(), Severity::Error);
//! assert_eq!(ev.callback, Some("on_command"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Importance of an event, used for gating and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Verbose output; only emitted while debug logging is on.
    Debug,
    /// Normal operator-visible output.
    Info,
    /// Operator attention required, nothing failed yet.
    Warn,
    /// Something failed.
    Error,
}

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Free-form output ===
    /// Operator-visible line (`detail` holds the text).
    Message,
    /// Debug line (`detail` holds the text).
    Trace,

    // === Supervisor lifecycle ===
    /// Supervisor state changed (`detail`: new state name).
    StateChanged,
    /// Debug logging switched on.
    DebugEnabled,
    /// Debug logging switched off.
    DebugDisabled,
    /// Shutdown requested by `Quit!` or by the channel closing (`detail`: origin).
    ShutdownRequested,
    /// Cleanup sequence finished (published once per run).
    CleanupDone,
    /// The command channel failed and was downgraded to closing (`detail`: cause).
    ChannelFailed,

    // === Worker lifecycle ===
    /// Worker module resolved by the loader.
    WorkerLoaded,
    /// Worker module could not be loaded (`detail`: reason).
    LoadFailed,
    /// About to invoke a worker callback (`callback`).
    CallbackEntering,
    /// Worker callback returned normally (`callback`).
    CallbackLeaving,
    /// Worker callback failed or panicked (`callback`, `detail`).
    CallbackFailed,
    /// Worker task spawned.
    WorkerStarted,
    /// Worker task finished by itself.
    WorkerExited,
    /// Worker task finished with an error or a panic (`detail`).
    WorkerFailed,
    /// Cooperative stop requested.
    StopRequested,
    /// Cancellation token of the worker fired.
    InterruptSent,
    /// Worker terminated during escalation (`elapsed_ms`).
    WorkerStopped,
    /// Worker survived every termination phase (`elapsed_ms`).
    WorkerUnresponsive,

    // === Heartbeat ===
    /// Heartbeat processing ran.
    Heartbeat,
    /// Hour of day changed since the previous heartbeat.
    HourChanged,
    /// Day of month changed since the previous heartbeat.
    DayChanged,
    /// Memory usage crossed the high-water mark (`detail`).
    MemoryHighWater,
    /// Memory usage fell back to or below the high-water mark.
    MemoryRecovered,
    /// The worker stopped without being asked to.
    AbnormalCompletion,

    // === Subscriber health ===
    /// Subscriber panicked during event processing (`source`: subscriber name).
    SubscriberPanicked,
    /// Subscriber dropped an event (`source`: subscriber name, `detail`: reason).
    SubscriberOverflow,
}

impl EventKind {
    /// Fixed severity of this kind.
    pub fn severity(self) -> Severity {
        use EventKind::*;
        match self {
            Trace | StateChanged | CleanupDone | WorkerLoaded | CallbackEntering
            | CallbackLeaving | WorkerStarted | WorkerExited | StopRequested | InterruptSent
            | WorkerStopped | Heartbeat | HourChanged | DayChanged | MemoryRecovered => {
                Severity::Debug
            }
            Message | DebugEnabled | DebugDisabled | ShutdownRequested => Severity::Info,
            MemoryHighWater | SubscriberOverflow => Severity::Warn,
            ChannelFailed | LoadFailed | CallbackFailed | WorkerFailed | WorkerUnresponsive
            | AbnormalCompletion | SubscriberPanicked => Severity::Error,
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Who emitted the event (supervisor name, worker id, subscriber name).
    pub source: Option<Arc<str>>,
    /// Human-readable payload (message text, error, state name).
    pub detail: Option<Arc<str>>,
    /// Worker callback involved, if any.
    pub callback: Option<&'static str>,
    /// Elapsed time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            detail: None,
            callback: None,
            elapsed_ms: None,
        }
    }

    /// Attaches the emitting component.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a human-readable payload.
    #[inline]
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attaches a callback name.
    #[inline]
    pub fn with_callback(mut self, callback: &'static str) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_detail(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_detail(info)
    }

    /// Text payload, or an empty string.
    #[inline]
    pub fn detail_str(&self) -> &str {
        self.detail.as_deref().unwrap_or("")
    }

    /// Source name, or an empty string.
    #[inline]
    pub fn source_str(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }
}
