//! # Status lines and named statistics.
//!
//! [`StatusReporter`] is the narrow interface through which the supervisor and the
//! worker expose operator-inspectable state: one status line per owner and a flat
//! namespace of statistics. [`StatusBoard`] is the in-memory implementation used by
//! default; an embedding process may forward to any external status facility.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Value of a published statistic.
#[derive(Clone, Debug, PartialEq)]
pub enum StatValue {
    /// Free text.
    Text(String),
    /// Numeric value.
    Number(f64),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Text(s) => f.write_str(s),
            StatValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        StatValue::Text(s)
    }
}

impl From<f64> for StatValue {
    fn from(n: f64) -> Self {
        StatValue::Number(n)
    }
}

impl From<u64> for StatValue {
    fn from(n: u64) -> Self {
        StatValue::Number(n as f64)
    }
}

/// Sink for status lines and statistics.
///
/// Calls are synchronous and must return quickly; they are made from the
/// supervisor loop and from the worker task.
pub trait StatusReporter: Send + Sync + 'static {
    /// Sets the status line of `owner`, creating it if needed.
    fn set_status(&self, owner: &str, text: &str);

    /// Removes the status line of `owner`.
    fn clear_status(&self, owner: &str);

    /// Creates or replaces a statistic.
    fn publish_stat(&self, name: &str, value: StatValue);

    /// Removes a statistic.
    fn clear_stat(&self, name: &str);
}

/// In-memory [`StatusReporter`] with snapshot accessors.
#[derive(Default)]
pub struct StatusBoard {
    lines: RwLock<BTreeMap<String, String>>,
    stats: RwLock<BTreeMap<String, StatValue>>,
}

impl StatusBoard {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status line of `owner`.
    pub fn status(&self, owner: &str) -> Option<String> {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(owner)
            .cloned()
    }

    /// Current value of a statistic.
    pub fn stat(&self, name: &str) -> Option<StatValue> {
        self.stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Sorted `(name, value)` pairs of every statistic.
    pub fn stats(&self) -> Vec<(String, StatValue)> {
        self.stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Sorted `(owner, text)` pairs of every status line.
    pub fn lines(&self) -> Vec<(String, String)> {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl StatusReporter for StatusBoard {
    fn set_status(&self, owner: &str, text: &str) {
        self.lines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(owner.to_string(), text.to_string());
    }

    fn clear_status(&self, owner: &str) {
        self.lines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(owner);
    }

    fn publish_stat(&self, name: &str, value: StatValue) {
        self.stats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value);
    }

    fn clear_stat(&self, name: &str) {
        self.stats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}
