//! One-shot guard for the cleanup sequence.

/// Lets the cleanup sequence run exactly once across every exit path.
///
/// The guard is owned by the supervisor loop and only touched from it, so a
/// plain flag suffices.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    done: bool,
}

impl CleanupGuard {
    /// Creates an armed guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time only; the caller then performs the cleanup.
    #[must_use]
    pub fn begin(&mut self) -> bool {
        !std::mem::replace(&mut self.done, true)
    }

    /// Whether cleanup has been started.
    pub fn is_done(&self) -> bool {
        self.done
    }
}
