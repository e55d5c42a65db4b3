#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for weft
//!
//! This crate provides the data shared by every stage of the pipeline:
//! the process-wide build context, bundler stats, and task descriptors.

pub mod context;
pub mod stats;
pub mod task;

// Re-export commonly used types
pub use context::{BuildContext, BuildState, ContextDir, WatchHandle};
pub use stats::{BundleStats, ModuleReason, StatsMessage, StatsModule};
pub use task::TaskInfo;
pub use uuid::Uuid;
