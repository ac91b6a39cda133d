//! # Supervisor lifecycle state.
//!
//! ```text
//! Idle ─► Initializing ─► Running ─► StopRequested ─► Terminating ─► Terminated
//!              │                                                      ▲
//!              └──────────────── load / initialize failed ────────────┘
//! ```
//!
//! Transitions only move forward. Once `Terminating` is entered the only
//! remaining step is `Terminated`, which is final.

use std::fmt;

/// Where the supervisor is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupervisorState {
    /// Constructed, nothing loaded yet.
    Idle,
    /// Loading the module and running `initialize`.
    Initializing,
    /// Worker task started; serving the command channel.
    Running,
    /// A quit request (or its equivalent) has been accepted.
    StopRequested,
    /// The termination escalator is running.
    Terminating,
    /// Cleanup has run; final.
    Terminated,
}

impl SupervisorState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: SupervisorState) -> bool {
        use SupervisorState::*;
        matches!(
            (self, next),
            (Idle, Initializing)
                | (Initializing, Running)
                | (Initializing, Terminated)
                | (Running, StopRequested)
                | (StopRequested, Terminating)
                | (StopRequested, Terminated)
                | (Terminating, Terminated)
        )
    }

    /// Moves to `next` if the transition is legal. Returns whether it moved.
    pub fn advance(&mut self, next: SupervisorState) -> bool {
        if self.can_advance_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }

    /// Status-line text shown while in this state.
    pub fn status_text(self) -> &'static str {
        match self {
            SupervisorState::Idle => "Idle",
            SupervisorState::Initializing => "Initialization in progress",
            SupervisorState::Running => "Idle",
            SupervisorState::StopRequested => "Stop requested",
            SupervisorState::Terminating => "Termination in progress",
            SupervisorState::Terminated => "Terminated",
        }
    }

    /// `true` for [`SupervisorState::Terminated`].
    #[inline]
    pub fn is_final(self) -> bool {
        self == SupervisorState::Terminated
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
