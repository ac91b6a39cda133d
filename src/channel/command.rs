//! # Operator command classification.
//!
//! A command line is trimmed and compared, case-insensitively and by exact
//! match, against the fixed set of bang-suffixed keywords. Anything else is a
//! [`Command::Custom`] and is forwarded verbatim (after trimming) to the worker.

use std::fmt;

/// A classified operator command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `Help!`: list built-in commands.
    Help,
    /// `Quit!`: graceful shutdown.
    Quit,
    /// `Debug!`: enable verbose logging.
    Debug,
    /// `NoDebug!`: disable verbose logging.
    NoDebug,
    /// `Heartbeat!`: out-of-cycle heartbeat processing.
    Heartbeat,
    /// Anything else, forwarded to the worker.
    Custom(String),
}

impl Command {
    /// Built-in keywords with their help text, in display order.
    pub const BUILTINS: [(&'static str, &'static str); 5] = [
        ("Quit!", "Terminate the worker and the supervisor"),
        ("Debug!", "Enable debug logging to the console"),
        ("NoDebug!", "Disable debug logging to the console"),
        (
            "Heartbeat!",
            "Run heartbeat processing now (otherwise done on every channel timeout)",
        ),
        ("Help!", "Display this help text"),
    ];

    /// Classifies one line of operator input.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit!") {
            Command::Quit
        } else if line.eq_ignore_ascii_case("help!") {
            Command::Help
        } else if line.eq_ignore_ascii_case("debug!") {
            Command::Debug
        } else if line.eq_ignore_ascii_case("nodebug!") {
            Command::NoDebug
        } else if line.eq_ignore_ascii_case("heartbeat!") {
            Command::Heartbeat
        } else {
            Command::Custom(line.to_string())
        }
    }

    /// Canonical keyword of a built-in, `None` for custom commands.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Command::Quit => Some("Quit!"),
            Command::Debug => Some("Debug!"),
            Command::NoDebug => Some("NoDebug!"),
            Command::Heartbeat => Some("Heartbeat!"),
            Command::Help => Some("Help!"),
            Command::Custom(_) => None,
        }
    }

    /// `true` for every command handled by the supervisor itself.
    #[inline]
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Command::Custom(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Custom(raw) => f.write_str(raw),
            other => f.write_str(other.keyword().unwrap_or_default()),
        }
    }
}
