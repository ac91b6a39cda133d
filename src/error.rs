//! Error types used by the plugvisor runtime and by worker modules.
//!
//! - [`LoadError`]: the module loader could not produce a worker.
//! - [`WorkerError`]: returned by worker callbacks and by [`Worker::run`](crate::Worker::run).
//! - [`CallbackError`]: a worker callback failed or panicked (recovered by the supervisor).
//! - [`RuntimeError`]: failures of the supervisor run itself.
//! - [`ArgsError`]: malformed startup arguments.
//!
//! All types provide `as_label` (stable snake_case, for logs/metrics) and `as_message`.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while resolving a worker module by identifier.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No module is registered under the identifier (identifiers are case-sensitive).
    #[error("unable to load worker module {identifier}")]
    NotFound {
        /// Requested module identifier.
        identifier: String,
    },

    /// The factory refused to build the module (wrong shape, missing prerequisite).
    #[error("worker module {identifier} rejected: {reason}")]
    Rejected {
        /// Requested module identifier.
        identifier: String,
        /// Factory-supplied reason.
        reason: String,
    },
}

impl LoadError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LoadError::NotFound { .. } => "load_not_found",
            LoadError::Rejected { .. } => "load_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LoadError::NotFound { identifier } => format!(
                "unable to load worker module {identifier}; make sure it is registered and the name is spelled with correct upper-/lowercase"
            ),
            LoadError::Rejected { identifier, reason } => {
                format!("worker module {identifier} rejected: {reason}")
            }
        }
    }
}

/// # Errors returned by worker code.
///
/// The supervisor never propagates these past its dispatch boundary:
/// they are logged and, except during `initialize`, execution continues.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Recoverable failure of one callback or of the worker body.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Failure the worker considers unrecoverable.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The worker observed its cancellation token and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        WorkerError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`WorkerError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        WorkerError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Fatal { .. } => "worker_fatal",
            WorkerError::Canceled => "worker_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Fail { error } => error.clone(),
            WorkerError::Fatal { error } => format!("fatal: {error}"),
            WorkerError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// # A worker callback did not complete normally.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("{worker}.{callback}() failed: {source}")]
    Failed {
        /// Worker module identifier.
        worker: String,
        /// Callback name (`initialize`, `on_command`, ...).
        callback: &'static str,
        /// Error returned by the worker.
        source: WorkerError,
    },

    /// The callback panicked; the panic was caught at the supervisor boundary.
    #[error("{worker}.{callback}() panicked: {info}")]
    Panicked {
        /// Worker module identifier.
        worker: String,
        /// Callback name.
        callback: &'static str,
        /// Panic payload rendered as text.
        info: String,
    },

    /// The callback did not return within its time bound.
    #[error("{worker}.{callback}() did not return within {timeout:?}")]
    TimedOut {
        /// Worker module identifier.
        worker: String,
        /// Callback name.
        callback: &'static str,
        /// Bound that was exceeded.
        timeout: Duration,
    },
}

impl CallbackError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CallbackError::Failed { .. } => "callback_failed",
            CallbackError::Panicked { .. } => "callback_panicked",
            CallbackError::TimedOut { .. } => "callback_timed_out",
        }
    }

    /// Returns the one-line operator message for this failure.
    pub fn as_message(&self) -> String {
        match self {
            CallbackError::Failed {
                worker,
                callback,
                source,
            } => format!(
                "Unhandled error in {worker}.{callback}(): {}",
                source.as_message()
            ),
            CallbackError::Panicked {
                worker,
                callback,
                info,
            } => format!("Unhandled panic in {worker}.{callback}(): {info}"),
            CallbackError::TimedOut {
                worker,
                callback,
                timeout,
            } => format!("{worker}.{callback}() did not return within {timeout:?}"),
        }
    }

    /// Name of the callback that failed.
    pub fn callback(&self) -> &'static str {
        match self {
            CallbackError::Failed { callback, .. }
            | CallbackError::Panicked { callback, .. }
            | CallbackError::TimedOut { callback, .. } => callback,
        }
    }
}

/// # Errors produced by the supervisor run.
///
/// Only module load and initialize failures abort a run; both are reported
/// after cleanup has already completed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The module loader could not produce the worker.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// `Worker::initialize` failed; `start` was never attempted.
    #[error("initialization failed: {0}")]
    Init(CallbackError),

    /// The worker stayed alive through every termination phase.
    #[error("worker {worker} could not be stopped within {waited:?}")]
    Unresponsive {
        /// Worker module identifier.
        worker: String,
        /// Total time spent waiting.
        waited: Duration,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use plugvisor::{LoadError, RuntimeError};
    ///
    /// let err = RuntimeError::from(LoadError::NotFound { identifier: "Foo".into() });
    /// assert_eq!(err.as_label(), "runtime_load_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Load(_) => "runtime_load_failed",
            RuntimeError::Init(_) => "runtime_init_failed",
            RuntimeError::Unresponsive { .. } => "runtime_worker_unresponsive",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Load(e) => e.as_message(),
            RuntimeError::Init(e) => e.as_message(),
            RuntimeError::Unresponsive { worker, waited } => {
                format!("{worker} could not be stopped (waited {waited:?})")
            }
        }
    }
}

/// # Malformed startup arguments.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    /// No module identifier was given.
    #[error("missing required parameter <ModuleName>; usage: plugvisor <ModuleName> [Debug!] [parameters...]")]
    MissingModule,
}

impl ArgsError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ArgsError::MissingModule => "args_missing_module",
        }
    }
}
