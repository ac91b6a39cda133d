//! # Non-blocking event fan-out to multiple subscribers.
//!
//! [`SubscriberSet`] hands each event to every subscriber's private queue
//! without ever awaiting, so the supervisor loop keeps its bounded response time
//! no matter how slow a log sink is.
//!
//! ```text
//! emit(event)
//!     ├──► [queue 1] ──► task 1 ──► subscriber1.on_event()
//!     │    (bounded)        └─────► panic → SubscriberPanicked
//!     └──► [queue N] ──► task N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**; each subscriber sees its own FIFO
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Isolation**: a panicking subscriber keeps processing later events
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber panics while holding one of its own locks.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;
use crate::worker::panic_message;

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    tasks: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one task per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut tasks = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let bus_for_task = bus.clone();

            tasks.push(tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        bus_for_task
                            .publish(Event::subscriber_panicked(name, panic_message(&*payload)));
                    }
                }
            }));
            channels.push(SubscriberChannel { name, sender: tx });
        }
        Self {
            channels,
            tasks,
            bus,
        }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the set has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Offers the event to every subscriber queue. Never blocks.
    ///
    /// Overflow notices are not re-published for overflow events themselves.
    pub fn emit(&self, event: Arc<Event>) {
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow_evt {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Closes every queue and waits for the subscriber tasks to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}
