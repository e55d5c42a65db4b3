#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration resolution for weft
//!
//! Every setting is resolved from, in order of precedence:
//! - CLI arguments
//! - Environment variables
//! - The `config` section of the project's `package.json`
//! - A default value
//!
//! All process-wide state (arguments, environment map, manifest cache,
//! debug flag) lives in an explicit [`ProcessConfig`] that callers pass in.

pub mod coerce;
pub mod constants;
pub mod context;
pub mod manifest;
pub mod process;
pub mod resolver;
pub mod user_config;

pub use coerce::{coerce_env_value, coerce_manifest_value, ConfigValue};
pub use context::{absolutize, generate_context};
pub use manifest::{FsManifestLoader, ManifestLoader, PackageManifest};
pub use process::ProcessConfig;
pub use resolver::ConfigKey;
pub use user_config::{fill_config_defaults, get_user_config_file, replace_path_vars};
