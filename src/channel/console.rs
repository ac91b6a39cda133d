//! # Operator console backed by standard input.
//!
//! A background task reads lines and forwards them into an [`Inbox`]. Blank
//! lines are skipped. End of input, a read error or an OS termination signal
//! posts a closing request, so the supervisor shuts down instead of hanging.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::inbox::{Inbox, InboxSender, inbox};
use crate::core::wait_for_shutdown_signal;
use crate::events::{Event, EventKind, Logger};

/// Factory for console-fed inboxes.
pub struct ConsoleChannel;

impl ConsoleChannel {
    /// Reads operator commands from stdin.
    pub fn stdin(capacity: usize, logger: Logger) -> Inbox {
        Self::from_reader(tokio::io::stdin(), capacity, logger)
    }

    /// Reads operator commands from any async reader.
    pub fn from_reader<R>(reader: R, capacity: usize, logger: Logger) -> Inbox
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, inbox) = inbox(capacity);
        tokio::spawn(pump(reader, tx, logger));
        inbox
    }
}

/// Forwards lines until input ends, fails, a signal arrives or the inbox goes away.
async fn pump<R>(reader: R, tx: InboxSender, logger: Logger)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(reader).lines();
    let signal = wait_for_shutdown_signal();
    tokio::pin!(signal);
    let mut signals_armed = true;

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    logger.debug(format!("Operator entered the command {}", line.trim()));
                    if !tx.send(line).await {
                        return;
                    }
                }
                Ok(None) => {
                    logger.debug("Console input closed");
                    tx.quit().await;
                    return;
                }
                Err(e) => {
                    logger.emit(
                        Event::new(EventKind::ChannelFailed)
                            .with_detail(format!("unable to read command from the console: {e}")),
                    );
                    tx.quit().await;
                    return;
                }
            },
            res = &mut signal, if signals_armed => match res {
                Ok(sig) => {
                    logger.info(format!("Received {sig}, shutting down"));
                    tx.quit().await;
                    return;
                }
                Err(e) => {
                    logger.debug(format!("OS signal handlers unavailable: {e}"));
                    signals_armed = false;
                }
            },
        }
    }
}
