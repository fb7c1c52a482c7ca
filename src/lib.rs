#![doc = include_str!("../README.md")]
#![warn(missing_docs, missing_debug_implementations)]
mod concurrent;
pub mod config;
mod error;
mod handle;
mod prefab;
/// Idle queues and the instance reverse index.
pub mod registry;
/// Deferred, cancellable returns driven by the caller's clock.
pub mod scheduler;
/// Periodic spawning of pooled or directly built objects.
pub mod spawner;
mod stats;
mod thread_local;

pub use concurrent::*;
pub use error::*;
pub use handle::*;
pub use prefab::*;
pub use registry::Registry;
pub use scheduler::{ReturnScheduler, TaskId};
pub use stats::*;
pub use thread_local::*;
