//! Test doubles shared by the unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::core::DebugState;
use crate::error::WorkerError;
use crate::events::{Bus, Logger};
use crate::status::{
    Clock, ClockSnapshot, HealthProbe, MemorySample, StatValue, StatusBoard, StatusReporter,
};
use crate::worker::{Worker, WorkerContext, WorkerHandle};

/// How a [`FakeWorker`] reacts to the lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Exits on `stop()` or on cancellation.
    Cooperative,
    /// Ignores `stop()` and cancellation; exits only on [`FakeWorker::release`].
    ExitWhenReleased,
    /// Ignores `stop()`, exits on cancellation.
    HonorsInterrupt,
    /// `stop()` never returns and cancellation is ignored.
    Unresponsive,
    /// `run()` panics right away.
    PanicsInRun,
    /// `initialize()` fails.
    FailsInit,
}

impl Behavior {
    fn honors_stop(self) -> bool {
        matches!(self, Behavior::Cooperative | Behavior::FailsInit)
    }

    fn honors_token(self) -> bool {
        matches!(
            self,
            Behavior::Cooperative | Behavior::HonorsInterrupt | Behavior::FailsInit
        )
    }
}

/// Everything the supervisor asked of a [`FakeWorker`].
#[derive(Clone, Debug, Default)]
pub struct Calls {
    pub initialize: usize,
    pub parameter: Option<String>,
    pub runs: usize,
    pub stop: usize,
    pub commands: Vec<String>,
    pub hourly: usize,
    pub daily: usize,
}

/// Scriptable worker.
///
/// `on_command("explode")` fails, `on_command("leave")` requests shutdown.
pub struct FakeWorker {
    behavior: Behavior,
    calls: Mutex<Calls>,
    stopping: AtomicBool,
    released: AtomicBool,
    wake: Notify,
}

impl FakeWorker {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self::plain(behavior))
    }

    pub fn plain(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Calls::default()),
            stopping: AtomicBool::new(false),
            released: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    /// Lets `run()` return regardless of behavior.
    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Worker for FakeWorker {
    async fn initialize(&self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.initialize += 1;
            calls.parameter = ctx.parameter().map(str::to_string);
        }
        ctx.publish_stat("Initialized", 1u64);
        if self.behavior == Behavior::FailsInit {
            return Err(WorkerError::fail("database unavailable"));
        }
        Ok(())
    }

    async fn run(&self, ctx: WorkerContext, token: CancellationToken) -> Result<(), WorkerError> {
        self.calls.lock().unwrap().runs += 1;
        if self.behavior == Behavior::PanicsInRun {
            panic!("worker exploded");
        }
        ctx.set_status("Running");
        loop {
            let stop = self.behavior.honors_stop() && self.stopping.load(Ordering::SeqCst);
            if stop || self.released.load(Ordering::SeqCst) {
                return Ok(());
            }
            tokio::select! {
                _ = self.wake.notified() => {}
                _ = token.cancelled(), if self.behavior.honors_token() => {
                    return Err(WorkerError::Canceled);
                }
            }
        }
    }

    async fn stop(&self) -> Result<(), WorkerError> {
        self.calls.lock().unwrap().stop += 1;
        if self.behavior == Behavior::Unresponsive {
            std::future::pending::<()>().await;
        }
        self.stopping.store(true, Ordering::SeqCst);
        self.wake.notify_one();
        Ok(())
    }

    async fn on_command(&self, ctx: &WorkerContext, command: &str) -> Result<(), WorkerError> {
        self.calls.lock().unwrap().commands.push(command.to_string());
        match command {
            "explode" => Err(WorkerError::fail("explode")),
            "leave" => {
                ctx.request_quit();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn on_hourly(&self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
        self.calls.lock().unwrap().hourly += 1;
        Ok(())
    }

    async fn on_daily(&self, _ctx: &WorkerContext) -> Result<(), WorkerError> {
        self.calls.lock().unwrap().daily += 1;
        Ok(())
    }
}

/// [`StatusBoard`] that also counts removals and records status history.
#[derive(Default)]
pub struct RecordingStatus {
    board: StatusBoard,
    cleared: Mutex<BTreeMap<String, usize>>,
    history: Mutex<Vec<(String, String)>>,
}

impl RecordingStatus {
    pub fn board(&self) -> &StatusBoard {
        &self.board
    }

    pub fn clear_count(&self, name: &str) -> usize {
        self.cleared.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn history(&self, owner: &str) -> Vec<String> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl StatusReporter for RecordingStatus {
    fn set_status(&self, owner: &str, text: &str) {
        self.history
            .lock()
            .unwrap()
            .push((owner.to_string(), text.to_string()));
        self.board.set_status(owner, text);
    }

    fn clear_status(&self, owner: &str) {
        self.board.clear_status(owner);
    }

    fn publish_stat(&self, name: &str, value: StatValue) {
        self.board.publish_stat(name, value);
    }

    fn clear_stat(&self, name: &str) {
        *self
            .cleared
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default() += 1;
        self.board.clear_stat(name);
    }
}

/// Hand-set wall clock.
pub struct ManualClock(Mutex<ClockSnapshot>);

impl ManualClock {
    pub fn new(hour_of_day: u32, day_of_month: u32) -> Self {
        Self(Mutex::new(ClockSnapshot {
            hour_of_day,
            day_of_month,
        }))
    }

    pub fn set(&self, hour_of_day: u32, day_of_month: u32) {
        *self.0.lock().unwrap() = ClockSnapshot {
            hour_of_day,
            day_of_month,
        };
    }
}

impl Clock for ManualClock {
    fn snapshot(&self) -> ClockSnapshot {
        *self.0.lock().unwrap()
    }
}

/// Hand-set memory probe.
pub struct FakeProbe(Mutex<MemorySample>);

impl FakeProbe {
    pub fn new(used_bytes: u64, limit_bytes: u64) -> Self {
        Self(Mutex::new(MemorySample {
            used_bytes,
            limit_bytes,
        }))
    }

    pub fn set(&self, used_bytes: u64, limit_bytes: u64) {
        *self.0.lock().unwrap() = MemorySample {
            used_bytes,
            limit_bytes,
        };
    }
}

impl HealthProbe for FakeProbe {
    fn sample(&self) -> MemorySample {
        *self.0.lock().unwrap()
    }
}

/// Bus, status and logger wired together for component tests.
pub struct Harness {
    pub bus: Bus,
    pub status: Arc<RecordingStatus>,
    pub logger: Logger,
}

impl Harness {
    /// Wraps `worker` in a handle registered as `Fake`.
    pub fn handle(&self, worker: Arc<FakeWorker>) -> WorkerHandle {
        let ctx = WorkerContext::new(
            "Fake",
            None,
            self.logger.clone(),
            self.status.clone(),
            None,
        );
        WorkerHandle::new(worker, ctx, self.logger.clone())
    }
}

pub fn harness() -> Harness {
    let bus = Bus::new(256);
    Harness {
        logger: Logger::new(bus.clone(), DebugState::default(), "plugvisor"),
        bus,
        status: Arc::new(RecordingStatus::default()),
    }
}
