//! # Module registry: identifier → worker factory.
//!
//! Worker modules are resolved by name through a [`ModuleLoader`]. The default
//! loader, [`WorkerRegistry`], maps exact (case-sensitive) identifiers to
//! constructor closures registered at start-up. Each load builds a fresh worker.
//!
//! ```text
//! LaunchArgs.module ──► ModuleLoader::load(id)
//!                          ├─ Ok(Arc<dyn Worker>)       → WorkerHandle::new
//!                          ├─ Err(LoadError::NotFound)  → run aborts before start
//!                          └─ Err(LoadError::Rejected)  → run aborts before start
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::Worker;
use crate::error::LoadError;

/// Resolves a module identifier into a worker instance.
pub trait ModuleLoader: Send + Sync + 'static {
    /// Builds the worker registered under `identifier`.
    fn load(&self, identifier: &str) -> Result<Arc<dyn Worker>, LoadError>;
}

type Factory = Box<dyn Fn() -> Result<Arc<dyn Worker>, String> + Send + Sync>;

/// Name-keyed table of worker factories.
#[derive(Default)]
pub struct WorkerRegistry {
    factories: HashMap<String, Factory>,
}

impl WorkerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an infallible factory. A later registration under the same name wins.
    pub fn register<W, F>(self, identifier: impl Into<String>, factory: F) -> Self
    where
        W: Worker,
        F: Fn() -> W + Send + Sync + 'static,
    {
        self.register_fallible(identifier, move || {
            Ok(Arc::new(factory()) as Arc<dyn Worker>)
        })
    }

    /// Registers a factory that may refuse to build the worker.
    pub fn register_fallible<F>(mut self, identifier: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Worker>, String> + Send + Sync + 'static,
    {
        self.factories.insert(identifier.into(), Box::new(factory));
        self
    }

    /// Whether `identifier` is registered (exact match).
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Sorted list of registered identifiers.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl ModuleLoader for WorkerRegistry {
    fn load(&self, identifier: &str) -> Result<Arc<dyn Worker>, LoadError> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| LoadError::NotFound {
                identifier: identifier.to_string(),
            })?;
        factory().map_err(|reason| LoadError::Rejected {
            identifier: identifier.to_string(),
            reason,
        })
    }
}
