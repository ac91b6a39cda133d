//! # Memory health probe.
//!
//! The heartbeat asks a [`HealthProbe`] for a [`MemorySample`] and warns when the
//! used fraction crosses the configured high-water mark. [`SystemMemoryProbe`]
//! samples the host through `sysinfo`, honoring a cgroup limit when one applies.

use std::sync::{Mutex, PoisonError};

use sysinfo::System;

/// One memory measurement, in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemorySample {
    /// Bytes in use.
    pub used_bytes: u64,
    /// Bytes available in total (`0` if unknown).
    pub limit_bytes: u64,
}

impl MemorySample {
    /// Used fraction in `[0, 1]`; `0.0` when the limit is unknown.
    pub fn used_fraction(&self) -> f64 {
        if self.limit_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.limit_bytes as f64).clamp(0.0, 1.0)
    }

    /// Bytes in use, in KiB.
    pub fn used_kb(&self) -> u64 {
        self.used_bytes / 1024
    }

    /// Free bytes, in KiB.
    pub fn free_kb(&self) -> u64 {
        self.limit_bytes.saturating_sub(self.used_bytes) / 1024
    }

    /// Limit, in KiB.
    pub fn limit_kb(&self) -> u64 {
        self.limit_bytes / 1024
    }
}

/// Source of memory measurements.
pub trait HealthProbe: Send + Sync + 'static {
    /// Takes a fresh sample.
    fn sample(&self) -> MemorySample;
}

/// [`HealthProbe`] backed by `sysinfo`.
pub struct SystemMemoryProbe {
    system: Mutex<System>,
}

impl SystemMemoryProbe {
    /// Creates a probe; no measurement is taken until [`HealthProbe::sample`].
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthProbe for SystemMemoryProbe {
    fn sample(&self) -> MemorySample {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_memory();

        match system.cgroup_limits() {
            Some(limits) if limits.total_memory > 0 => MemorySample {
                used_bytes: limits.total_memory.saturating_sub(limits.free_memory),
                limit_bytes: limits.total_memory,
            },
            _ => MemorySample {
                used_bytes: system.used_memory(),
                limit_bytes: system.total_memory(),
            },
        }
    }
}
