//! # WorkerHandle: the supervisor's exclusive grip on one loaded worker.
//!
//! The handle owns the worker object, its context, its cancellation token and,
//! once started, the `JoinHandle` of the worker task. It is the only path through
//! which worker callbacks are invoked, and every invocation is guarded.
//!
//! ## Liveness
//! ```text
//! new() ──► start() ──► is_alive() == true  (task running)
//!                            │
//!                  task finishes (return, error, panic)
//!                            ▼
//!                     is_alive() == false  ── sticky: JoinHandle forgotten
//! ```
//! `is_alive` polls the task every time; the `false` answer is remembered only
//! by dropping the join handle, so later checks are cheap and can never flip back.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::invoke::{guarded, guarded_with_timeout, panic_message};
use super::{Worker, WorkerContext};
use crate::error::{CallbackError, WorkerError};
use crate::events::{Event, EventKind, Logger};

/// Loaded worker plus its lifecycle state.
pub struct WorkerHandle {
    worker: Arc<dyn Worker>,
    ctx: WorkerContext,
    logger: Logger,
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
    started: bool,
}

impl WorkerHandle {
    /// Wraps a freshly loaded worker. `logger` is the supervisor's logger.
    pub(crate) fn new(worker: Arc<dyn Worker>, ctx: WorkerContext, logger: Logger) -> Self {
        Self {
            worker,
            ctx,
            logger,
            token: CancellationToken::new(),
            join: None,
            started: false,
        }
    }

    /// Module identifier.
    pub fn id(&self) -> &str {
        self.ctx.id()
    }

    /// Start-up parameters handed to the worker.
    pub fn parameter(&self) -> Option<&str> {
        self.ctx.parameter()
    }

    /// Runs `Worker::initialize` under the callback guard.
    pub async fn initialize(&self) -> Result<(), CallbackError> {
        guarded(
            &self.logger,
            self.id(),
            "initialize",
            self.worker.initialize(&self.ctx),
        )
        .await
    }

    /// Spawns the worker task. Returns immediately; `false` if already started.
    ///
    /// A worker is never restarted, even after its task has ended.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;

        let worker = Arc::clone(&self.worker);
        let ctx = self.ctx.clone();
        let token = self.token.clone();
        let logger = self.logger.clone();
        let id = self.id().to_string();

        logger.emit(
            Event::new(EventKind::WorkerStarted).with_detail(format!("=> {id}.run()")),
        );
        self.join = Some(tokio::spawn(async move {
            let res = AssertUnwindSafe(worker.run(ctx.clone(), token))
                .catch_unwind()
                .await;
            match res {
                Ok(Ok(())) | Ok(Err(WorkerError::Canceled)) => {
                    logger.emit(
                        Event::new(EventKind::WorkerExited).with_detail(format!("<= {id}.run()")),
                    );
                }
                Ok(Err(e)) => {
                    logger.emit(
                        Event::new(EventKind::WorkerFailed)
                            .with_callback("run")
                            .with_detail(format!("Unhandled error in {id}.run(): {}", e.as_message())),
                    );
                }
                Err(payload) => {
                    logger.emit(
                        Event::new(EventKind::WorkerFailed)
                            .with_callback("run")
                            .with_detail(format!(
                                "Unhandled panic in {id}.run(): {}",
                                panic_message(&*payload)
                            )),
                    );
                }
            }
            ctx.release();
        }));
        true
    }

    /// Whether the worker task is still running. Never cached; `false` is sticky.
    pub fn is_alive(&mut self) -> bool {
        let alive = self.join.as_ref().is_some_and(|join| !join.is_finished());
        if !alive {
            self.join = None;
        }
        alive
    }

    /// Invokes `Worker::stop`, giving up on the call after `limit`.
    pub async fn stop(&self, limit: Duration) -> Result<(), CallbackError> {
        guarded_with_timeout(&self.logger, self.id(), "stop", limit, self.worker.stop()).await
    }

    /// Fires the worker's cancellation token. Returns `false` if it had already fired.
    pub fn interrupt(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.token.cancel();
        true
    }

    /// Whether [`interrupt`](Self::interrupt) has been called.
    pub fn is_interrupted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Forwards a non-built-in operator command.
    pub async fn on_command(&self, raw: &str) -> Result<(), CallbackError> {
        guarded(
            &self.logger,
            self.id(),
            "on_command",
            self.worker.on_command(&self.ctx, raw),
        )
        .await
    }

    /// Signals the start of a new hour.
    pub async fn on_hourly(&self) -> Result<(), CallbackError> {
        guarded(
            &self.logger,
            self.id(),
            "on_hourly",
            self.worker.on_hourly(&self.ctx),
        )
        .await
    }

    /// Signals the start of a new day.
    pub async fn on_daily(&self) -> Result<(), CallbackError> {
        guarded(
            &self.logger,
            self.id(),
            "on_daily",
            self.worker.on_daily(&self.ctx),
        )
        .await
    }
}

/// Limit on the detached `stop()` call issued when a running handle is dropped.
const DROP_STOP_LIMIT: Duration = Duration::from_secs(1);

impl Drop for WorkerHandle {
    /// A handle dropped while its task still runs (the supervisor future was
    /// abandoned mid-run) asks the worker to stop and fires its token.
    ///
    /// After a completed escalation the token has already fired, so nothing
    /// is sent twice.
    fn drop(&mut self) {
        let running = self.join.as_ref().is_some_and(|join| !join.is_finished());
        if !running || self.token.is_cancelled() {
            return;
        }

        if let Ok(rt) = tokio::runtime::Handle::try_current() {
            let worker = Arc::clone(&self.worker);
            let logger = self.logger.clone();
            let id = self.id().to_string();
            rt.spawn(async move {
                let _ = guarded_with_timeout(&logger, &id, "stop", DROP_STOP_LIMIT, worker.stop())
                    .await; // logged by the guard
            });
        }
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behavior, FakeWorker, harness};

    #[tokio::test]
    async fn liveness_is_sticky_after_exit() {
        let h = harness();
        let worker = FakeWorker::new(Behavior::ExitWhenReleased);
        let mut handle = h.handle(worker.clone());

        assert!(!handle.is_alive(), "not alive before start");
        assert!(handle.start());
        assert!(!handle.start(), "never restarted");
        assert!(handle.is_alive());

        worker.release();
        while handle.is_alive() {
            tokio::task::yield_now().await;
        }
        assert!(!handle.is_alive());
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn interrupt_fires_once() {
        let h = harness();
        let mut handle = h.handle(FakeWorker::new(Behavior::HonorsInterrupt));
        handle.start();
        assert!(handle.interrupt());
        assert!(!handle.interrupt());
        assert!(handle.is_interrupted());
        while handle.is_alive() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn panicking_run_is_reported_and_ends_task() {
        let h = harness();
        let mut rx = h.bus.subscribe();
        let mut handle = h.handle(FakeWorker::new(Behavior::PanicsInRun));
        handle.start();
        while handle.is_alive() {
            tokio::task::yield_now().await;
        }

        let failed = loop {
            let ev = rx.recv().await.unwrap();
            if ev.kind == EventKind::WorkerFailed {
                break ev;
            }
        };
        assert!(failed.detail_str().starts_with("Unhandled panic in Fake.run()"));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_running_handle_stops_the_worker() {
        let h = harness();
        let worker = FakeWorker::new(Behavior::Cooperative);
        let mut handle = h.handle(worker.clone());
        handle.start();
        tokio::task::yield_now().await;
        assert!(handle.is_alive());

        drop(handle);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(worker.calls().stop, 1);
        assert_eq!(Arc::strong_count(&worker), 1, "worker task still holds the worker");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_after_interrupt_sends_nothing_more() {
        let h = harness();
        let worker = FakeWorker::new(Behavior::ExitWhenReleased);
        let mut handle = h.handle(worker.clone());
        handle.start();
        handle.interrupt();

        drop(handle);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(worker.calls().stop, 0);
        worker.release();
    }

    #[tokio::test]
    async fn callbacks_route_to_worker() {
        let h = harness();
        let worker = FakeWorker::new(Behavior::Cooperative);
        let handle = h.handle(worker.clone());

        handle.initialize().await.unwrap();
        handle.on_command("status").await.unwrap();
        handle.on_hourly().await.unwrap();
        handle.on_daily().await.unwrap();
        assert!(handle.on_command("explode").await.is_err());

        let calls = worker.calls();
        assert_eq!(calls.initialize, 1);
        assert_eq!(calls.commands, vec!["status".to_string(), "explode".to_string()]);
        assert_eq!((calls.hourly, calls.daily), (1, 1));
    }
}
