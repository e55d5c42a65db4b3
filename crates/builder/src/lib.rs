#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]
//! Build orchestration for weft
//!
//! This crate drives the external bundler in two modes. Full builds run a
//! single pass and check its report. Watch builds share one long-lived
//! watcher per context, and every request settles on the next cycle the
//! watcher reports.

pub mod bundle;
pub mod bundler;
pub mod clean;
pub mod full;
pub mod incremental;
pub mod process;
mod scope;

pub use bundle::{
    build_complete, bundled_file_paths, bundler_task_info, dependency_map, get_bundle_config,
    module_files, BundleTask,
};
pub use bundler::{BundleConfig, BundleOutput, BundleResolve, Bundler, ENV_VAR_BUNDLER_CONFIG};
pub use clean::clean;
pub use full::run_full_build;
pub use incremental::{IncrementalBuilder, PendingBuild};
pub use process::ProcessBundler;
pub use scope::TaskScope;
