//! # Command channel between the operator and the supervisor.
//!
//! [`CommandChannel`] is the only place the supervisor loop suspends. Every call
//! to [`CommandChannel::next`] ends in exactly one [`Inbound`] outcome; transport
//! failures surface as [`Inbound::Closing`] so that the loop always shuts down
//! rather than hanging.
//!
//! ## Contents
//! - [`Command`] classification of operator lines
//! - [`Inbox`] / [`InboxSender`] / [`QuitHandle`] in-process queue
//! - [`ConsoleChannel`] stdin-fed inbox with OS signal handling

mod command;
mod console;
mod inbox;

use std::time::Duration;

use async_trait::async_trait;

pub use command::Command;
pub use console::ConsoleChannel;
pub use inbox::{Inbox, InboxSender, QuitHandle, inbox};

/// Outcome of waiting on the channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// One operator command.
    Command(Command),
    /// Nothing arrived within the timeout.
    Timeout,
    /// The channel is shutting down; handled exactly like `Quit!`.
    Closing,
}

/// Blocking, timeout-capable inbox of operator commands.
#[async_trait]
pub trait CommandChannel: Send {
    /// Waits up to `timeout` for the next command.
    async fn next(&mut self, timeout: Duration) -> Inbound;

    /// Releases the channel. Idempotent; later `next` calls return [`Inbound::Closing`].
    fn close(&mut self);

    /// Handle a worker can use to request shutdown, if the transport supports it.
    fn quit_handle(&self) -> Option<QuitHandle> {
        None
    }
}
