//! # Cross-platform OS termination signals.
//!
//! [`wait_for_shutdown_signal`] completes when the process receives a termination
//! signal and reports which one. The console channel turns it into a closing
//! request, which the supervisor handles exactly like `Quit!`.
//!
//! ## Signals
//! **Unix platforms:** `SIGINT` (Ctrl-C), `SIGTERM`, `SIGQUIT`
//!
//! **Other platforms:** Ctrl-C via [`tokio::signal::ctrl_c`]

use std::fmt;

/// Which termination signal arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Ctrl-C / `SIGINT`.
    Interrupt,
    /// `SIGTERM`.
    Terminate,
    /// `SIGQUIT`.
    Quit,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Quit => "SIGQUIT",
        })
    }
}

/// Waits for a termination signal.
///
/// Each call registers independent listeners; `Err` if registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<ShutdownSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let sig = tokio::select! {
        _ = sigint.recv()  => ShutdownSignal::Interrupt,
        _ = sigterm.recv() => ShutdownSignal::Terminate,
        _ = sigquit.recv() => ShutdownSignal::Quit,
    };
    Ok(sig)
}

/// Waits for a termination signal.
///
/// Each call registers independent listeners; `Err` if registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<ShutdownSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownSignal::Interrupt)
}
