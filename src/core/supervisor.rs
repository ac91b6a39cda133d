//! # Supervisor: loads one worker, serves the command channel, shuts down in bounded time.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the module loader
//! and the status/health/clock collaborators. [`Supervisor::run`] consumes it and
//! drives one complete worker lifecycle.
//!
//! ## High-level architecture
//! ```text
//! run(args, channel):
//!   subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(Event)      (fire-and-forget)
//!
//!   Idle ─► Initializing
//!             ├─ ModuleLoader::load(args.module)    ── Err ─► cleanup ─► Err(RuntimeError::Load)
//!             ├─ publish Supervisor.* / Memory.* statistics
//!             ├─ WorkerHandle::initialize()         ── Err ─► cleanup ─► Err(RuntimeError::Init)
//!             └─ WorkerHandle::start()              (worker task spawned)
//!   Running:
//!     loop {
//!       status "Idle"
//!       channel.next(heartbeat_interval)
//!         ├─ Timeout | Heartbeat!  ─► HeartbeatScheduler::tick ── WorkerGone ─► AbnormalCompletion
//!         ├─ Help! / Debug! / NoDebug!  handled here, never forwarded
//!         ├─ Custom(raw)           ─► WorkerHandle::on_command(raw)   (errors logged, loop continues)
//!         └─ Quit! | Closing       ─► leave loop
//!     }
//!   StopRequested ─► Terminating ─► TerminationEscalator::terminate   (skipped if worker already gone)
//!   Terminated   ─► cleanup (exactly once) ─► Ok(Shutdown)
//! ```
//!
//! Cleanup removes the supervisor's statistics and status line, withdraws what the
//! worker published and closes the channel. It is guarded so that every exit
//! path, including dropping the `run` future, performs it exactly once.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use plugvisor::{
//!     ExitReason, LaunchArgs, Supervisor, SupervisorConfig, Worker, WorkerContext, WorkerError,
//!     WorkerRegistry, inbox,
//! };
//!
//! #[derive(Default)]
//! struct Echo {
//!     done: tokio::sync::Notify,
//! }
//!
//! #[async_trait]
//! impl Worker for Echo {
//!     async fn initialize(&self, _ctx: &WorkerContext) -> Result<(), WorkerError> { Ok(()) }
//!     async fn run(&self, _ctx: WorkerContext, token: CancellationToken) -> Result<(), WorkerError> {
//!         tokio::select! {
//!             _ = self.done.notified() => Ok(()),
//!             _ = token.cancelled() => Err(WorkerError::Canceled),
//!         }
//!     }
//!     async fn stop(&self) -> Result<(), WorkerError> {
//!         self.done.notify_one();
//!         Ok(())
//!     }
//!     async fn on_command(&self, ctx: &WorkerContext, command: &str) -> Result<(), WorkerError> {
//!         ctx.log(format!("echo: {command}"));
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sup = Supervisor::builder(SupervisorConfig::default())
//!         .with_loader(WorkerRegistry::new().register("Echo", Echo::default))
//!         .build();
//!
//!     let (tx, channel) = inbox(16);
//!     tx.send("hello").await;
//!     tx.send("Quit!").await;
//!
//!     let shutdown = sup.run(LaunchArgs::new("Echo"), channel).await.unwrap();
//!     assert_eq!(shutdown.reason, ExitReason::Quit);
//! }
//! ```

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::args::LaunchArgs;
use super::builder::SupervisorBuilder;
use super::cleanup::CleanupGuard;
use super::config::SupervisorConfig;
use super::escalator::{Termination, TerminationEscalator};
use super::heartbeat::{Beat, HeartbeatScheduler};
use super::state::SupervisorState;
use crate::channel::{Command, CommandChannel, Inbound};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind, Logger};
use crate::status::{Clock, HealthProbe, StatValue, StatusReporter};
use crate::subscribers::SubscriberSet;
use crate::worker::{ModuleLoader, WorkerContext, WorkerHandle};

/// Why the command loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The operator entered `Quit!`.
    Quit,
    /// The channel is closing (end of input, OS signal, worker quit request).
    ChannelClosed,
    /// A heartbeat found the worker task already finished.
    AbnormalCompletion,
}

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shutdown {
    /// Module identifier of the supervised worker.
    pub worker: String,
    /// Why the loop ended.
    pub reason: ExitReason,
    /// How the worker was terminated.
    pub termination: Termination,
}

impl Shutdown {
    /// Turns an unresponsive worker into [`RuntimeError::Unresponsive`].
    pub fn into_result(self) -> Result<Shutdown, RuntimeError> {
        match self.termination {
            Termination::Unresponsive { waited } => Err(RuntimeError::Unresponsive {
                worker: self.worker,
                waited,
            }),
            _ => Ok(self),
        }
    }
}

/// Drives one worker module from load to cleanup.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    subs: SubscriberSet,
    loader: Arc<dyn ModuleLoader>,
    status: Arc<dyn StatusReporter>,
    probe: Arc<dyn HealthProbe>,
    clock: Arc<dyn Clock>,
}

impl Supervisor {
    /// Starts a [`SupervisorBuilder`].
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(super) fn from_parts(
        cfg: SupervisorConfig,
        bus: Bus,
        subs: SubscriberSet,
        loader: Arc<dyn ModuleLoader>,
        status: Arc<dyn StatusReporter>,
        probe: Arc<dyn HealthProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            loader,
            status,
            probe,
            clock,
        }
    }

    /// Event bus; subscribe before [`run`](Self::run) to observe the whole run.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Active configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Runs the worker named by `args` until quit, channel closing or abnormal completion.
    ///
    /// Returns `Err` only when the module cannot be loaded or initialized; cleanup
    /// has already run in that case.
    pub async fn run<C: CommandChannel>(
        self,
        args: LaunchArgs,
        mut channel: C,
    ) -> Result<Shutdown, RuntimeError> {
        let Supervisor {
            cfg,
            bus,
            subs,
            loader,
            status,
            probe,
            clock,
        } = self;
        let (listener_stop, listener) = subscriber_listener(&bus, subs);

        let outcome = {
            let mut session = Session {
                logger: Logger::new(bus.clone(), cfg.debug.clone(), cfg.name.as_str()),
                cfg: &cfg,
                status,
                channel: &mut channel,
                state: SupervisorState::Idle,
                cleanup: CleanupGuard::new(),
                stats: Vec::new(),
                worker_ctx: None,
            };
            session.drive(&args, loader.as_ref(), probe, clock).await
        };

        listener_stop.cancel();
        let _ = listener.await;
        outcome
    }
}

/// Forwards bus events to the subscriber set until stopped, then drains and shuts it down.
fn subscriber_listener(bus: &Bus, subs: SubscriberSet) -> (CancellationToken, JoinHandle<()>) {
    let mut rx = bus.subscribe();
    let stop = CancellationToken::new();
    let stopped = stop.clone();

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => subs.emit(Arc::new(ev)),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = stopped.cancelled() => break,
            }
        }
        loop {
            match rx.try_recv() {
                Ok(ev) => subs.emit(Arc::new(ev)),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        subs.shutdown().await;
    });
    (stop, handle)
}

/// State of one run; cleans up on drop if no exit path did.
struct Session<'a, C: CommandChannel> {
    cfg: &'a SupervisorConfig,
    logger: Logger,
    status: Arc<dyn StatusReporter>,
    channel: &'a mut C,
    state: SupervisorState,
    cleanup: CleanupGuard,
    stats: Vec<String>,
    worker_ctx: Option<WorkerContext>,
}

impl<C: CommandChannel> Session<'_, C> {
    async fn drive(
        &mut self,
        args: &LaunchArgs,
        loader: &dyn ModuleLoader,
        probe: Arc<dyn HealthProbe>,
        clock: Arc<dyn Clock>,
    ) -> Result<Shutdown, RuntimeError> {
        if let Some(enabled) = args.debug {
            self.cfg.debug.set(enabled);
        }
        self.transition(SupervisorState::Initializing);

        let mut worker = match self.start_worker(args, loader, probe.as_ref()).await {
            Ok(worker) => worker,
            Err(e) => {
                self.transition(SupervisorState::Terminated);
                self.cleanup();
                return Err(e);
            }
        };
        let mut heartbeat = HeartbeatScheduler::new(
            clock,
            probe,
            Arc::clone(&self.status),
            self.logger.clone(),
            worker.id(),
            self.cfg.memory_high_water_clamped(),
        );

        self.transition(SupervisorState::Running);
        let reason = self.serve(&mut worker, &mut heartbeat).await;

        self.transition(SupervisorState::StopRequested);
        self.logger.emit(
            Event::new(EventKind::ShutdownRequested)
                .with_detail(format!("{} termination in progress", self.cfg.name)),
        );
        let termination = if reason == ExitReason::AbnormalCompletion {
            Termination::AlreadyDead
        } else {
            self.transition(SupervisorState::Terminating);
            TerminationEscalator::new(self.cfg, &self.logger)
                .terminate(&mut worker)
                .await
        };

        self.transition(SupervisorState::Terminated);
        self.cleanup();
        Ok(Shutdown {
            worker: worker.id().to_string(),
            reason,
            termination,
        })
    }

    async fn start_worker(
        &mut self,
        args: &LaunchArgs,
        loader: &dyn ModuleLoader,
        probe: &dyn HealthProbe,
    ) -> Result<WorkerHandle, RuntimeError> {
        let module = match loader.load(&args.module) {
            Ok(module) => module,
            Err(e) => {
                self.logger
                    .emit(Event::new(EventKind::LoadFailed).with_detail(e.as_message()));
                return Err(e.into());
            }
        };
        self.logger.emit(
            Event::new(EventKind::WorkerLoaded).with_detail(format!("Loaded {}", args.module)),
        );
        self.publish_startup_stats(&args.module, probe);

        let ctx = WorkerContext::new(
            args.module.as_str(),
            args.parameter.as_deref(),
            self.logger.clone(),
            Arc::clone(&self.status),
            self.channel.quit_handle(),
        );
        self.worker_ctx = Some(ctx.clone());

        let mut worker = WorkerHandle::new(module, ctx, self.logger.clone());
        worker.initialize().await.map_err(RuntimeError::Init)?;
        worker.start();
        Ok(worker)
    }

    async fn serve(
        &mut self,
        worker: &mut WorkerHandle,
        heartbeat: &mut HeartbeatScheduler,
    ) -> ExitReason {
        loop {
            self.set_status("Idle");
            let command = match self.channel.next(self.cfg.heartbeat_interval).await {
                Inbound::Command(command) => {
                    self.set_status(&format!("Processing command {command}"));
                    command
                }
                Inbound::Timeout => Command::Heartbeat,
                Inbound::Closing => return ExitReason::ChannelClosed,
            };

            match command {
                Command::Quit => return ExitReason::Quit,
                Command::Help => {
                    for (keyword, text) in Command::BUILTINS {
                        self.logger.info(format!("{keyword:<11} {text}"));
                    }
                }
                Command::Debug => {
                    self.cfg.debug.set(true);
                    self.logger.emit(Event::new(EventKind::DebugEnabled).with_detail(
                        "Debug logging enabled - Enter 'NoDebug!' to disable",
                    ));
                }
                Command::NoDebug => {
                    self.cfg.debug.set(false);
                    self.logger.emit(
                        Event::new(EventKind::DebugDisabled).with_detail("Debug logging disabled"),
                    );
                }
                Command::Heartbeat => {
                    self.set_status("Performing heartbeat processing");
                    if heartbeat.tick(worker).await == Beat::WorkerGone {
                        return ExitReason::AbnormalCompletion;
                    }
                }
                Command::Custom(raw) if raw.is_empty() => {}
                Command::Custom(raw) => {
                    let _ = worker.on_command(&raw).await; // logged by the guard
                }
            }
        }
    }

    fn publish_startup_stats(&mut self, id: &str, probe: &dyn HealthProbe) {
        let memory = probe.sample();
        let platform = format!("{} {}", std::env::consts::OS, std::env::consts::ARCH);
        let started = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        self.publish(id, "Supervisor.Platform", platform.into());
        self.publish(id, "Supervisor.VersionNumber", env!("CARGO_PKG_VERSION").into());
        self.publish(id, "Supervisor.StartedTime", started.into());
        self.publish(id, "Memory.LimitKB", memory.limit_kb().into());
        self.publish(id, "Memory.UsedKB", memory.used_kb().into());
    }

    fn publish(&mut self, id: &str, name: &str, value: StatValue) {
        let full = format!("{id}.{name}");
        self.status.publish_stat(&full, value);
        self.stats.push(full);
    }

    fn transition(&mut self, next: SupervisorState) {
        let prev = self.state;
        if self.state.advance(next) {
            self.logger.emit(
                Event::new(EventKind::StateChanged).with_detail(format!("{prev} -> {next}")),
            );
            self.set_status(next.status_text());
        }
    }

    fn set_status(&self, text: &str) {
        self.status.set_status(&self.cfg.name, text);
    }

    fn cleanup(&mut self) {
        if !self.cleanup.begin() {
            return;
        }
        self.logger.debug("Freeing resources");
        for name in self.stats.drain(..) {
            self.status.clear_stat(&name);
        }
        if let Some(ctx) = self.worker_ctx.take() {
            ctx.release();
        }
        self.status.clear_status(&self.cfg.name);
        self.channel.close();
        self.logger
            .emit(Event::new(EventKind::CleanupDone).with_detail("Cleanup done"));
    }
}

impl<C: CommandChannel> Drop for Session<'_, C> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{InboxSender, inbox};
    use crate::core::escalator::StopPhase;
    use crate::error::LoadError;
    use crate::testing::{Behavior, FakeProbe, FakeWorker, ManualClock, RecordingStatus};
    use crate::worker::{Worker, WorkerRegistry};
    use std::time::Duration;
    use tokio::sync::broadcast;
    use tokio::time::Instant;

    const STATS: [&str; 5] = [
        "Fake.Supervisor.Platform",
        "Fake.Supervisor.VersionNumber",
        "Fake.Supervisor.StartedTime",
        "Fake.Memory.LimitKB",
        "Fake.Memory.UsedKB",
    ];

    struct Rig {
        sup: Supervisor,
        events: broadcast::Receiver<Event>,
        status: Arc<RecordingStatus>,
        clock: Arc<ManualClock>,
        probe: Arc<FakeProbe>,
        worker: Arc<FakeWorker>,
        debug: crate::core::DebugState,
    }

    fn rig(behavior: Behavior) -> Rig {
        let worker = FakeWorker::new(behavior);
        let shared = Arc::clone(&worker);
        let loader = WorkerRegistry::new()
            .register_fallible("Fake", move || Ok(Arc::clone(&shared) as Arc<dyn Worker>));

        let status = Arc::new(RecordingStatus::default());
        let clock = Arc::new(ManualClock::new(9, 14));
        let probe = Arc::new(FakeProbe::new(40 * 1024, 100 * 1024));
        let cfg = SupervisorConfig::default();
        let debug = cfg.debug.clone();

        let sup = Supervisor::builder(cfg)
            .with_loader(loader)
            .with_status(status.clone())
            .with_clock(clock.clone())
            .with_probe(probe.clone())
            .build();
        let events = sup.bus().subscribe();
        Rig {
            sup,
            events,
            status,
            clock,
            probe,
            worker,
            debug,
        }
    }

    async fn feed(lines: &[&str]) -> (InboxSender, crate::channel::Inbox) {
        let (tx, rx) = inbox(64);
        for line in lines {
            assert!(tx.send(*line).await);
        }
        (tx, rx)
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn assert_cleaned_once(status: &RecordingStatus) {
        for name in STATS {
            assert_eq!(status.clear_count(name), 1, "{name}");
        }
        assert!(status.board().stats().is_empty());
        assert!(status.board().status("plugvisor").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn builtins_are_never_forwarded() {
        let mut rig = rig(Behavior::Cooperative);
        let (_tx, channel) = feed(&[
            "help!", "DEBUG!", "nodebug!", "Heartbeat!", "  Help!  ", "hEaRtBeAt!", "custom one",
            "QUIT!",
        ])
        .await;

        let shutdown = rig.sup.run(LaunchArgs::new("Fake"), channel).await.unwrap();
        assert_eq!(shutdown.reason, ExitReason::Quit);
        assert_eq!(
            shutdown.termination,
            Termination::Stopped {
                phase: StopPhase::Cooperative
            }
        );

        let calls = rig.worker.calls();
        assert_eq!(calls.commands, vec!["custom one".to_string()]);
        assert_eq!(calls.stop, 1);
        assert_cleaned_once(&rig.status);

        let events = drain(&mut rig.events);
        let help_lines = events
            .iter()
            .filter(|e| e.kind == EventKind::Message && e.detail_str().starts_with("Quit!"))
            .count();
        assert_eq!(help_lines, 2);
        assert!(events.iter().any(|e| e.kind == EventKind::DebugEnabled));
        assert!(events.iter().any(|e| e.kind == EventKind::DebugDisabled));
    }

    #[tokio::test(start_paused = true)]
    async fn startup_debug_token_and_parameters() {
        let rig = rig(Behavior::Cooperative);
        let args = LaunchArgs::parse(["Fake", "Debug!", "bar", "baz"]).unwrap();
        let (_tx, channel) = feed(&["Quit!"]).await;

        rig.sup.run(args, channel).await.unwrap();
        assert!(rig.debug.enabled());
        assert_eq!(rig.worker.calls().parameter.as_deref(), Some("bar baz"));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_command_does_not_stop_the_loop() {
        let mut rig = rig(Behavior::Cooperative);
        let (_tx, channel) = feed(&["explode", "after", "Quit!"]).await;

        let shutdown = rig.sup.run(LaunchArgs::new("Fake"), channel).await.unwrap();
        assert_eq!(shutdown.reason, ExitReason::Quit);
        assert!(shutdown.termination.is_clean());
        assert_eq!(rig.worker.calls().commands, vec!["explode", "after"]);

        let failures: Vec<String> = drain(&mut rig.events)
            .into_iter()
            .filter(|e| e.kind == EventKind::CallbackFailed)
            .map(|e| e.detail_str().to_string())
            .collect();
        assert_eq!(failures, vec!["Unhandled error in Fake.on_command(): explode"]);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_death_detected_by_manual_heartbeat() {
        let rig = rig(Behavior::ExitWhenReleased);
        rig.worker.release();
        let (tx, channel) = inbox(8);

        let run = tokio::spawn(rig.sup.run(LaunchArgs::new("Fake"), channel));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(tx.send("Heartbeat!").await);

        let shutdown = run.await.unwrap().unwrap();
        assert_eq!(shutdown.reason, ExitReason::AbnormalCompletion);
        assert_eq!(shutdown.termination, Termination::AlreadyDead);
        assert_eq!(rig.worker.calls().stop, 0);
        assert_cleaned_once(&rig.status);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_death_detected_by_channel_timeout() {
        let rig = rig(Behavior::ExitWhenReleased);
        rig.worker.release();
        let (_tx, channel) = inbox(8);

        let started = Instant::now();
        let shutdown = rig.sup.run(LaunchArgs::new("Fake"), channel).await.unwrap();
        assert_eq!(shutdown.reason, ExitReason::AbnormalCompletion);
        let elapsed = started.elapsed();
        assert!(elapsed >= SupervisorConfig::default().heartbeat_interval);
        assert!(elapsed < Duration::from_secs(16));
        assert_cleaned_once(&rig.status);
    }

    #[tokio::test(start_paused = true)]
    async fn unresponsive_worker_is_abandoned_and_cleanup_runs() {
        let mut rig = rig(Behavior::Unresponsive);
        let (_tx, channel) = feed(&["Quit!"]).await;
        let budget = rig.sup.config().termination_budget();

        let started = Instant::now();
        let shutdown = rig.sup.run(LaunchArgs::new("Fake"), channel).await.unwrap();
        assert!(started.elapsed() <= budget);
        assert!(matches!(shutdown.termination, Termination::Unresponsive { .. }));
        assert_cleaned_once(&rig.status);

        assert!(drain(&mut rig.events).iter().any(|e| {
            e.kind == EventKind::WorkerUnresponsive && e.detail_str() == "Fake could not be stopped"
        }));
        assert_eq!(
            shutdown.into_result().unwrap_err().as_label(),
            "runtime_worker_unresponsive"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_module_aborts_before_start() {
        let rig = rig(Behavior::Cooperative);
        let (_tx, channel) = inbox(8);

        let err = rig
            .sup
            .run(LaunchArgs::new("fake"), channel)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::Load(LoadError::NotFound {
                identifier: "fake".into()
            })
        );
        assert_eq!(rig.worker.calls().initialize, 0);
        assert!(rig.status.board().status("plugvisor").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_initialize_never_starts_the_worker() {
        let rig = rig(Behavior::FailsInit);
        let (_tx, channel) = inbox(8);

        let err = rig.sup.run(LaunchArgs::new("Fake"), channel).await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_init_failed");
        assert_eq!(
            err.as_message(),
            "Unhandled error in Fake.initialize(): database unavailable"
        );

        let calls = rig.worker.calls();
        assert_eq!((calls.initialize, calls.runs), (1, 0));
        assert_cleaned_once(&rig.status);
        assert_eq!(rig.status.clear_count("Fake.Initialized"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_channel_is_a_quit() {
        let rig = rig(Behavior::Cooperative);
        let (tx, channel) = feed(&["one"]).await;
        drop(tx);

        let shutdown = rig.sup.run(LaunchArgs::new("Fake"), channel).await.unwrap();
        assert_eq!(shutdown.reason, ExitReason::ChannelClosed);
        assert!(shutdown.termination.is_clean());
        assert_eq!(rig.worker.calls().commands, vec!["one"]);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_can_request_shutdown() {
        let rig = rig(Behavior::Cooperative);
        let (_tx, channel) = feed(&["leave", "never seen"]).await;

        let shutdown = rig.sup.run(LaunchArgs::new("Fake"), channel).await.unwrap();
        assert_eq!(shutdown.reason, ExitReason::ChannelClosed);
        assert_eq!(rig.worker.calls().commands, vec!["leave", "never seen"]);
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeats_drive_clock_callbacks_and_memory_stat() {
        let rig = rig(Behavior::Cooperative);
        let (tx, channel) = inbox(8);
        let run = tokio::spawn(rig.sup.run(LaunchArgs::new("Fake"), channel));

        tokio::time::sleep(Duration::from_millis(10)).await;
        rig.clock.set(10, 14);
        rig.probe.set(60 * 1024, 100 * 1024);
        assert!(tx.send("Heartbeat!").await);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            rig.status.board().stat("Fake.Memory.UsedKB"),
            Some(StatValue::Number(60.0))
        );

        rig.clock.set(0, 15);
        // Synthesized heartbeat after the channel timeout.
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(tx.send("Quit!").await);

        run.await.unwrap().unwrap();
        let calls = rig.worker.calls();
        assert_eq!((calls.hourly, calls.daily), (2, 1));
        assert!(calls.commands.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn status_line_follows_the_loop() {
        let rig = rig(Behavior::Cooperative);
        let (_tx, channel) = feed(&["work", "Quit!"]).await;

        rig.sup.run(LaunchArgs::new("Fake"), channel).await.unwrap();
        let history = rig.status.history("plugvisor");
        assert!(history.contains(&"Processing command work".to_string()));
        assert!(history.contains(&"Idle".to_string()));
        assert_eq!(history.last().map(String::as_str), Some("Terminated"));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_run_still_cleans_up() {
        let rig = rig(Behavior::Cooperative);
        let (_tx, channel) = inbox(8);
        let run = rig.sup.run(LaunchArgs::new("Fake"), channel);

        assert!(
            tokio::time::timeout(Duration::from_secs(1), run)
                .await
                .is_err()
        );
        assert_cleaned_once(&rig.status);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(rig.worker.calls().stop, 1);
        assert_eq!(
            Arc::strong_count(&rig.worker),
            1,
            "worker task outlived the dropped run"
        );
    }
}
