//! # LogWriter: renders events as operator console lines.
//!
//! Each [`Event`] becomes one `tracing` record at the level of its
//! [`Severity`](crate::Severity), prefixed with its source the way an operator
//! expects to read it:
//!
//! ```text
//! INFO  plugvisor: HelloWorld: Hello world
//! DEBUG plugvisor: plugvisor: => HelloWorld.on_hourly()
//! ERROR plugvisor: plugvisor: Unhandled error in HelloWorld.on_command(): explode
//! WARN  plugvisor: plugvisor: Free memory is below 10 percent (81234 KB free)
//! ```
//!
//! Debug events reach this writer only while debug logging is on; the
//! `tracing` filter installed by the host is applied on top.

use async_trait::async_trait;

use crate::events::{Event, EventKind, Severity};
use crate::subscribers::Subscribe;

/// Event-to-`tracing` renderer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders the console line for `e` (without level or timestamp).
    pub fn render(e: &Event) -> String {
        let body = match e.kind {
            EventKind::SubscriberOverflow => {
                format!("subscriber {} dropped an event ({})", e.source_str(), e.detail_str())
            }
            EventKind::SubscriberPanicked => {
                format!("subscriber {} panicked: {}", e.source_str(), e.detail_str())
            }
            EventKind::WorkerStopped | EventKind::WorkerUnresponsive => match e.elapsed_ms {
                Some(ms) => format!("{} ({ms} ms)", e.detail_str()),
                None => e.detail_str().to_string(),
            },
            _ if e.detail.is_some() => e.detail_str().to_string(),
            other => format!("{other:?}"),
        };
        match e.source.as_deref() {
            Some(src) if !matches!(
                e.kind,
                EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
            ) =>
            {
                format!("{src}: {body}")
            }
            _ => body,
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let line = Self::render(e);
        match e.kind.severity() {
            Severity::Debug => tracing::debug!(seq = e.seq, "{line}"),
            Severity::Info => tracing::info!("{line}"),
            Severity::Warn => tracing::warn!("{line}"),
            Severity::Error => match e.callback {
                Some(callback) => tracing::error!(callback, "{line}"),
                None => tracing::error!("{line}"),
            },
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn callback_field_only_when_present() {
        let out = Captured::default();
        let sink = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let writer = LogWriter::new();
        writer
            .on_event(&Event::new(EventKind::LoadFailed).with_detail("unable to load worker module Nope"))
            .await;
        writer
            .on_event(
                &Event::new(EventKind::CallbackFailed)
                    .with_callback("on_command")
                    .with_detail("Unhandled error in Fake.on_command(): explode"),
            )
            .await;

        let text = out.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2, "{text}");
        assert!(lines[0].contains("unable to load worker module Nope"));
        assert!(!lines[0].contains("callback"), "{}", lines[0]);
        assert!(lines[1].contains("callback=\"on_command\""), "{}", lines[1]);
    }

    #[test]
    fn lines_carry_source_prefix() {
        let ev = Event::new(EventKind::Message)
            .with_source("HelloWorld")
            .with_detail("Hello world");
        assert_eq!(LogWriter::render(&ev), "HelloWorld: Hello world");

        let stopped = Event::new(EventKind::WorkerStopped)
            .with_source("plugvisor")
            .with_detail("HelloWorld stopped")
            .with_elapsed(Duration::from_millis(250));
        assert_eq!(
            LogWriter::render(&stopped),
            "plugvisor: HelloWorld stopped (250 ms)"
        );

        let overflow = Event::subscriber_overflow("audit", "full");
        assert_eq!(
            LogWriter::render(&overflow),
            "subscriber audit dropped an event (full)"
        );
    }

    #[test]
    fn bare_kind_falls_back_to_its_name() {
        let ev = Event::new(EventKind::Heartbeat);
        assert_eq!(LogWriter::render(&ev), "Heartbeat");
    }
}
