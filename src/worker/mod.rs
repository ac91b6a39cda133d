//! # Worker modules and their supervisor-side handle.
//!
//! - [`Worker`] the contract a loadable module implements
//! - [`WorkerContext`] the worker's view back into the supervisor
//! - [`WorkerHandle`] lifecycle wrapper owned exclusively by the supervisor
//! - [`ModuleLoader`] / [`WorkerRegistry`] identifier → worker resolution

mod context;
mod handle;
mod invoke;
mod module;
mod registry;

pub(crate) use invoke::panic_message;

pub use context::WorkerContext;
pub use handle::WorkerHandle;
pub use module::Worker;
pub use registry::{ModuleLoader, WorkerRegistry};
