//! # Event subscribers.
//!
//! ```text
//!   Supervisor / WorkerHandle / Console ── publish(Event) ──► Bus
//!                                                              │
//!                            Supervisor::subscriber_listener ◄─┘
//!                                          │
//!                                    SubscriberSet
//!                               ┌──────────┼──────────┐
//!                               ▼          ▼          ▼
//!                           LogWriter    Audit      Custom ...
//! ```
//!
//! [`LogWriter`] is available with the `logging` feature.

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
