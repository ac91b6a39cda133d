//! # In-process command channel.
//!
//! [`Inbox`] is the receiving end of a bounded `tokio::sync::mpsc` queue of
//! operator lines; [`InboxSender`] is the producing end (console reader, tests,
//! embedding applications). A [`QuitHandle`] lets the worker ask for shutdown
//! without keeping the queue alive.
//!
//! ```text
//! InboxSender::send("reload") ──┐
//! InboxSender::quit()  ─────────┼──► [bounded mpsc] ──► Inbox::next(timeout)
//! QuitHandle::request() ────────┘      (FIFO)             ├─ Command(..)
//!                                                         ├─ Timeout
//!                                                         └─ Closing  (Quit, closed, all senders gone)
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time;

use super::{Command, CommandChannel, Inbound};

/// Queue item.
#[derive(Debug)]
enum Message {
    Line(String),
    Quit,
}

/// Creates a connected sender/inbox pair (capacity clamped to at least 1).
pub fn inbox(capacity: usize) -> (InboxSender, Inbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let weak = tx.downgrade();
    (
        InboxSender { tx },
        Inbox {
            rx,
            weak,
            closed: false,
        },
    )
}

/// Producing end of an [`Inbox`].
#[derive(Clone, Debug)]
pub struct InboxSender {
    tx: mpsc::Sender<Message>,
}

impl InboxSender {
    /// Enqueues one line, waiting for space. Returns `false` if the inbox is gone.
    pub async fn send(&self, line: impl Into<String>) -> bool {
        self.tx.send(Message::Line(line.into())).await.is_ok()
    }

    /// Enqueues one line without waiting. Returns `false` if full or gone.
    pub fn try_send(&self, line: impl Into<String>) -> bool {
        self.tx.try_send(Message::Line(line.into())).is_ok()
    }

    /// Enqueues a closing request. Returns `false` if the inbox is gone.
    pub async fn quit(&self) -> bool {
        self.tx.send(Message::Quit).await.is_ok()
    }
}

/// Weak handle used by workers to request shutdown.
#[derive(Clone, Debug)]
pub struct QuitHandle {
    weak: mpsc::WeakSender<Message>,
}

impl QuitHandle {
    /// Posts a closing request; `false` if the inbox is gone or full.
    pub fn request(&self) -> bool {
        match self.weak.upgrade() {
            Some(tx) => tx.try_send(Message::Quit).is_ok(),
            None => false,
        }
    }
}

/// Receiving end; implements [`CommandChannel`].
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::Receiver<Message>,
    weak: mpsc::WeakSender<Message>,
    closed: bool,
}

impl Inbox {
    /// `true` once [`CommandChannel::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl CommandChannel for Inbox {
    async fn next(&mut self, timeout: Duration) -> Inbound {
        if self.closed {
            return Inbound::Closing;
        }
        match time::timeout(timeout, self.rx.recv()).await {
            Err(_elapsed) => Inbound::Timeout,
            Ok(None) | Ok(Some(Message::Quit)) => Inbound::Closing,
            Ok(Some(Message::Line(line))) => Inbound::Command(Command::parse(&line)),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.rx.close();
        }
    }

    fn quit_handle(&self) -> Option<QuitHandle> {
        Some(QuitHandle {
            weak: self.weak.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn yields_commands_in_order_then_times_out() {
        let (tx, mut inbox) = inbox(8);
        assert!(tx.send(" hello ").await);
        assert!(tx.try_send("heartbeat!"));

        let wait = Duration::from_secs(15);
        assert_eq!(
            inbox.next(wait).await,
            Inbound::Command(Command::Custom("hello".into()))
        );
        assert_eq!(inbox.next(wait).await, Inbound::Command(Command::Heartbeat));
        assert_eq!(inbox.next(wait).await, Inbound::Timeout);
    }

    #[tokio::test]
    async fn quit_message_and_dropped_senders_close() {
        let (tx, mut inbox) = inbox(4);
        assert!(tx.quit().await);
        assert_eq!(inbox.next(Duration::from_secs(1)).await, Inbound::Closing);

        drop(tx);
        assert_eq!(inbox.next(Duration::from_secs(1)).await, Inbound::Closing);
    }

    #[tokio::test]
    async fn quit_handle_does_not_keep_channel_alive() {
        let (tx, mut inbox) = inbox(4);
        let handle = inbox.quit_handle().unwrap();
        assert!(handle.request());
        assert_eq!(inbox.next(Duration::from_secs(1)).await, Inbound::Closing);

        drop(tx);
        assert!(!handle.request());
        assert_eq!(inbox.next(Duration::from_secs(1)).await, Inbound::Closing);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (tx, mut inbox) = inbox(4);
        inbox.close();
        inbox.close();
        assert!(inbox.is_closed());
        assert!(!tx.try_send("late"));
        assert_eq!(inbox.next(Duration::from_secs(1)).await, Inbound::Closing);
    }
}
