//! # Callback invocation guard.
//!
//! Every supervisor-side call into worker code goes through [`guarded`]: publish
//! "entering", await the callback with panics caught, then publish "leaving" or a
//! single [`EventKind::CallbackFailed`] line. Nothing raised by the worker crosses
//! this boundary except as a [`CallbackError`] value.
//!
//! **Warning**: `AssertUnwindSafe` is used; a worker that panics while holding one
//! of its own locks may leave that state inconsistent for later callbacks.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;

use crate::error::{CallbackError, WorkerError};
use crate::events::{Event, EventKind, Logger};

/// Runs one worker callback under the guard.
pub(crate) async fn guarded<F>(
    logger: &Logger,
    worker: &str,
    callback: &'static str,
    fut: F,
) -> Result<(), CallbackError>
where
    F: Future<Output = Result<(), WorkerError>> + Send,
{
    logger.emit(
        Event::new(EventKind::CallbackEntering)
            .with_callback(callback)
            .with_detail(format!("=> {worker}.{callback}()")),
    );

    let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(CallbackError::Failed {
            worker: worker.to_string(),
            callback,
            source,
        }),
        Err(payload) => Err(CallbackError::Panicked {
            worker: worker.to_string(),
            callback,
            info: panic_message(&*payload),
        }),
    };

    report(logger, worker, callback, &outcome);
    outcome
}

/// Like [`guarded`], but gives up on the callback after `limit`.
pub(crate) async fn guarded_with_timeout<F>(
    logger: &Logger,
    worker: &str,
    callback: &'static str,
    limit: Duration,
    fut: F,
) -> Result<(), CallbackError>
where
    F: Future<Output = Result<(), WorkerError>> + Send,
{
    match time::timeout(limit, guarded(logger, worker, callback, fut)).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => {
            let err = CallbackError::TimedOut {
                worker: worker.to_string(),
                callback,
                timeout: limit,
            };
            report(logger, worker, callback, &Err(err.clone()));
            Err(err)
        }
    }
}

fn report(logger: &Logger, worker: &str, callback: &'static str, outcome: &Result<(), CallbackError>) {
    match outcome {
        Ok(()) => {
            logger.emit(
                Event::new(EventKind::CallbackLeaving)
                    .with_callback(callback)
                    .with_detail(format!("<= {worker}.{callback}()")),
            );
        }
        Err(e) => {
            logger.emit(
                Event::new(EventKind::CallbackFailed)
                    .with_callback(callback)
                    .with_detail(e.as_message()),
            );
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
