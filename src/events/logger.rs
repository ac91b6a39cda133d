//! # Logger: the severity-gated front door to the [`Bus`].
//!
//! Every component that wants to say something holds a [`Logger`] bound to its
//! own source name. Debug-severity events are discarded here, at the source,
//! whenever the shared [`DebugState`] is off; `Debug!`/`NoDebug!` therefore take
//! effect for the very next log call.

use std::sync::Arc;

use super::{Bus, Event, EventKind, Severity};
use crate::core::DebugState;

/// Source-bound, debug-gated event publisher.
#[derive(Clone, Debug)]
pub struct Logger {
    bus: Bus,
    debug: DebugState,
    source: Arc<str>,
}

impl Logger {
    /// Creates a logger that stamps every event with `source`.
    pub fn new(bus: Bus, debug: DebugState, source: impl Into<Arc<str>>) -> Self {
        Self {
            bus,
            debug,
            source: source.into(),
        }
    }

    /// Returns a logger for another source sharing the same bus and debug flag.
    pub fn for_source(&self, source: impl Into<Arc<str>>) -> Self {
        Self {
            bus: self.bus.clone(),
            debug: self.debug.clone(),
            source: source.into(),
        }
    }

    /// Name stamped on emitted events.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Underlying bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Shared debug flag.
    pub fn debug_state(&self) -> &DebugState {
        &self.debug
    }

    /// Publishes `ev` (stamped with this source unless it already has one).
    ///
    /// Returns `false` if the event was gated out.
    pub fn emit(&self, mut ev: Event) -> bool {
        if ev.kind.severity() == Severity::Debug && !self.debug.enabled() {
            return false;
        }
        if ev.source.is_none() {
            ev.source = Some(Arc::clone(&self.source));
        }
        self.bus.publish(ev);
        true
    }

    /// Operator-visible line.
    pub fn info(&self, msg: impl Into<Arc<str>>) {
        self.emit(Event::new(EventKind::Message).with_detail(msg));
    }

    /// Verbose line; dropped unless debug logging is on.
    pub fn debug(&self, msg: impl Into<Arc<str>>) {
        if self.debug.enabled() {
            self.emit(Event::new(EventKind::Trace).with_detail(msg));
        }
    }
}
