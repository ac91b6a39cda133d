//! # Worker-side view of the supervisor.
//!
//! [`WorkerContext`] is what a worker uses to talk back: logging under its own
//! name, its own status line, namespaced statistics and a shutdown request.
//! Everything a worker publishes is withdrawn when its task ends.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::channel::QuitHandle;
use crate::events::Logger;
use crate::status::{StatValue, StatusReporter};

/// Cloneable handle given to worker callbacks and to [`Worker::run`](crate::Worker::run).
#[derive(Clone)]
pub struct WorkerContext {
    inner: Arc<Inner>,
}

struct Inner {
    id: Arc<str>,
    parameter: Option<Arc<str>>,
    logger: Logger,
    status: Arc<dyn StatusReporter>,
    quit: Option<QuitHandle>,
    stats: Mutex<BTreeSet<String>>,
}

impl WorkerContext {
    pub(crate) fn new(
        id: impl Into<Arc<str>>,
        parameter: Option<&str>,
        logger: Logger,
        status: Arc<dyn StatusReporter>,
        quit: Option<QuitHandle>,
    ) -> Self {
        let id: Arc<str> = id.into();
        Self {
            inner: Arc::new(Inner {
                logger: logger.for_source(Arc::clone(&id)),
                id,
                parameter: parameter.map(Arc::from),
                status,
                quit,
                stats: Mutex::new(BTreeSet::new()),
            }),
        }
    }

    /// Module identifier the worker was loaded under.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Start-up parameters (debug tokens removed), `None` if there were none.
    pub fn parameter(&self) -> Option<&str> {
        self.inner.parameter.as_deref()
    }

    /// Operator-visible log line, prefixed with the worker id.
    pub fn log(&self, msg: impl Into<Arc<str>>) {
        self.inner.logger.info(msg);
    }

    /// Debug line; dropped unless debug logging is on.
    pub fn debug(&self, msg: impl Into<Arc<str>>) {
        self.inner.logger.debug(msg);
    }

    /// Whether debug logging is currently on.
    pub fn is_debug(&self) -> bool {
        self.inner.logger.debug_state().enabled()
    }

    /// Sets the worker's own status line.
    pub fn set_status(&self, text: &str) {
        self.inner.status.set_status(&self.inner.id, text);
    }

    /// Publishes `<id>.<name>`; removed automatically when the worker task ends.
    pub fn publish_stat(&self, name: &str, value: impl Into<StatValue>) {
        let full = self.stat_name(name);
        self.inner.status.publish_stat(&full, value.into());
        self.inner
            .stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(full);
    }

    /// Removes `<id>.<name>`.
    pub fn clear_stat(&self, name: &str) {
        let full = self.stat_name(name);
        self.inner.status.clear_stat(&full);
        self.inner
            .stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&full);
    }

    /// Asks the supervisor to shut down as if `Quit!` had been entered.
    ///
    /// Returns `false` if the channel cannot take the request.
    pub fn request_quit(&self) -> bool {
        self.inner.logger.debug("Requesting shutdown");
        self.inner.quit.as_ref().is_some_and(QuitHandle::request)
    }

    /// Withdraws the status line and every statistic this worker published.
    pub(crate) fn release(&self) {
        let names = std::mem::take(
            &mut *self
                .inner
                .stats
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for name in names {
            self.inner.status.clear_stat(&name);
        }
        self.inner.status.clear_status(&self.inner.id);
    }

    fn stat_name(&self, name: &str) -> String {
        format!("{}.{name}", self.inner.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DebugState;
    use crate::events::Bus;
    use crate::status::StatusBoard;

    #[test]
    fn release_withdraws_everything_published() {
        let board = Arc::new(StatusBoard::new());
        let logger = Logger::new(Bus::new(8), DebugState::default(), "sup");
        let ctx = WorkerContext::new("Foo", Some("a b"), logger, board.clone(), None);

        assert_eq!(ctx.id(), "Foo");
        assert_eq!(ctx.parameter(), Some("a b"));

        ctx.set_status("busy");
        ctx.publish_stat("Processed", 3u64);
        ctx.publish_stat("Mode", "fast");
        ctx.clear_stat("Mode");
        board.publish_stat("Other", 1u64.into());

        assert_eq!(board.stat("Foo.Processed"), Some(StatValue::Number(3.0)));
        assert_eq!(board.status("Foo").as_deref(), Some("busy"));

        ctx.release();
        assert!(board.stat("Foo.Processed").is_none());
        assert!(board.status("Foo").is_none());
        assert!(board.stat("Other").is_some());
        assert!(!ctx.request_quit());
    }
}
