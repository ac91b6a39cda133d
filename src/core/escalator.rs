//! # Bounded, multi-phase worker termination.
//!
//! ```text
//! alive? ──no──► AlreadyDead
//!   │yes
//!   ▼
//! 1. Worker::stop()            (call itself bounded by stop_call_timeout; errors logged, ignored)
//! 2. poll is_alive()           every poll_interval, up to stop_wait      ──dead──► Stopped{Cooperative}
//! 3. cancel token, poll again  every poll_interval, up to interrupt_wait ──dead──► Stopped{Interrupt}
//! 4. give up                   "<id> could not be stopped"               ───────► Unresponsive{waited}
//! ```
//!
//! There is no forced kill: the task of an unresponsive worker is left detached.
//! Worst case wall time is [`SupervisorConfig::termination_budget`].

use std::time::Duration;

use tokio::time::{self, Instant};

use crate::core::SupervisorConfig;
use crate::events::{Event, EventKind, Logger};
use crate::worker::WorkerHandle;

/// Phase in which the worker was observed to exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopPhase {
    /// After the cooperative `stop()` request.
    Cooperative,
    /// After the cancellation token fired.
    Interrupt,
}

/// How worker termination ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The worker exited during `phase`.
    Stopped {
        /// Phase that made the worker exit.
        phase: StopPhase,
    },
    /// The worker task had already ended; no escalation was needed.
    AlreadyDead,
    /// The worker outlived every phase and was left running.
    Unresponsive {
        /// Total time spent escalating.
        waited: Duration,
    },
}

impl Termination {
    /// `true` unless the worker was left running.
    pub fn is_clean(&self) -> bool {
        !matches!(self, Termination::Unresponsive { .. })
    }
}

/// Drives the termination phases against one worker.
pub struct TerminationEscalator<'a> {
    cfg: &'a SupervisorConfig,
    logger: &'a Logger,
}

impl<'a> TerminationEscalator<'a> {
    /// Creates an escalator using the budgets of `cfg`.
    pub fn new(cfg: &'a SupervisorConfig, logger: &'a Logger) -> Self {
        Self { cfg, logger }
    }

    /// Terminates `worker`. Always returns within the termination budget.
    pub async fn terminate(&self, worker: &mut WorkerHandle) -> Termination {
        if !worker.is_alive() {
            return Termination::AlreadyDead;
        }
        let started = Instant::now();
        let id = worker.id().to_string();

        self.logger.emit(
            Event::new(EventKind::StopRequested).with_detail(format!("Stopping {id}")),
        );
        let _ = worker.stop(self.cfg.stop_call_timeout).await;

        self.logger.debug(format!("Waiting for {id} termination"));
        if self.wait_for_exit(worker, self.cfg.stop_wait).await {
            return self.stopped(&id, StopPhase::Cooperative, started);
        }

        self.logger.emit(
            Event::new(EventKind::InterruptSent).with_detail(format!("Sending interrupt to {id}")),
        );
        worker.interrupt();
        if self.wait_for_exit(worker, self.cfg.interrupt_wait).await {
            return self.stopped(&id, StopPhase::Interrupt, started);
        }

        let waited = started.elapsed();
        self.logger.emit(
            Event::new(EventKind::WorkerUnresponsive)
                .with_detail(format!("{id} could not be stopped"))
                .with_elapsed(waited),
        );
        Termination::Unresponsive { waited }
    }

    /// Polls liveness until the worker is gone or `budget` is spent.
    async fn wait_for_exit(&self, worker: &mut WorkerHandle, budget: Duration) -> bool {
        let poll = self.cfg.poll_interval_clamped();
        let deadline = Instant::now() + budget;
        loop {
            if !worker.is_alive() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            time::sleep(poll.min(deadline - now)).await;
        }
    }

    fn stopped(&self, id: &str, phase: StopPhase, started: Instant) -> Termination {
        self.logger.emit(
            Event::new(EventKind::WorkerStopped)
                .with_detail(format!("{id} has terminated"))
                .with_elapsed(started.elapsed()),
        );
        Termination::Stopped { phase }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behavior, FakeWorker, harness};

    async fn terminate(behavior: Behavior) -> (Termination, Duration, SupervisorConfig) {
        let h = harness();
        let cfg = SupervisorConfig::default();
        let mut handle = h.handle(FakeWorker::new(behavior));
        handle.start();
        tokio::task::yield_now().await;

        let started = Instant::now();
        let outcome = TerminationEscalator::new(&cfg, &h.logger)
            .terminate(&mut handle)
            .await;
        (outcome, started.elapsed(), cfg)
    }

    #[tokio::test(start_paused = true)]
    async fn cooperative_worker_stops_in_first_phase() {
        let (outcome, elapsed, cfg) = terminate(Behavior::Cooperative).await;
        assert_eq!(outcome, Termination::Stopped { phase: StopPhase::Cooperative });
        assert!(elapsed <= cfg.poll_interval);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_is_the_second_resort() {
        let (outcome, elapsed, cfg) = terminate(Behavior::HonorsInterrupt).await;
        assert_eq!(outcome, Termination::Stopped { phase: StopPhase::Interrupt });
        assert!(elapsed >= cfg.stop_wait);
        assert!(elapsed <= cfg.stop_wait + cfg.poll_interval);
    }

    #[tokio::test(start_paused = true)]
    async fn unresponsive_worker_is_abandoned_within_budget() {
        let (outcome, elapsed, cfg) = terminate(Behavior::Unresponsive).await;
        match outcome {
            Termination::Unresponsive { waited } => {
                assert!(waited >= cfg.stop_call_timeout + cfg.stop_wait + cfg.interrupt_wait);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(elapsed <= cfg.termination_budget());
    }

    #[tokio::test(start_paused = true)]
    async fn dead_worker_needs_no_escalation() {
        let h = harness();
        let cfg = SupervisorConfig::default();
        let worker = FakeWorker::new(Behavior::ExitWhenReleased);
        worker.release();
        let mut handle = h.handle(worker.clone());
        handle.start();
        while handle.is_alive() {
            tokio::task::yield_now().await;
        }

        let outcome = TerminationEscalator::new(&cfg, &h.logger)
            .terminate(&mut handle)
            .await;
        assert_eq!(outcome, Termination::AlreadyDead);
        assert_eq!(worker.calls().stop, 0);
    }
}
