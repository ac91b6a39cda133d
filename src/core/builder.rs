use std::sync::Arc;

use super::{config::SupervisorConfig, supervisor::Supervisor};
use crate::{
    events::Bus,
    status::{Clock, HealthProbe, LocalClock, StatusBoard, StatusReporter, SystemMemoryProbe},
    subscribers::{Subscribe, SubscriberSet},
    worker::{ModuleLoader, WorkerRegistry},
};

/// Builder for a [`Supervisor`] and its collaborators.
///
/// Defaults: an empty [`WorkerRegistry`], an in-memory [`StatusBoard`],
/// [`SystemMemoryProbe`], [`LocalClock`] and no subscribers.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    loader: Option<Arc<dyn ModuleLoader>>,
    status: Option<Arc<dyn StatusReporter>>,
    probe: Option<Arc<dyn HealthProbe>>,
    clock: Option<Arc<dyn Clock>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            loader: None,
            status: None,
            probe: None,
            clock: None,
        }
    }

    /// Sets the module loader used to resolve the worker identifier.
    pub fn with_loader(mut self, loader: impl ModuleLoader) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive every published event through dedicated tasks with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the status line / statistics sink.
    pub fn with_status(mut self, status: Arc<dyn StatusReporter>) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the memory probe used by heartbeats.
    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Sets the clock used for hour/day transitions.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the supervisor.
    ///
    /// Spawns the subscriber tasks, so it must be called inside a Tokio runtime.
    pub fn build(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());

        Supervisor::from_parts(
            self.cfg,
            bus,
            subs,
            self.loader
                .unwrap_or_else(|| Arc::new(WorkerRegistry::new())),
            self.status
                .unwrap_or_else(|| Arc::new(StatusBoard::new())),
            self.probe
                .unwrap_or_else(|| Arc::new(SystemMemoryProbe::new())),
            self.clock.unwrap_or_else(|| Arc::new(LocalClock)),
        )
    }
}
