//! Task descriptors

use serde::{Deserialize, Serialize};

/// How a task locates its user config file through the resolver tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    /// Long CLI flag, e.g. `--bundler`
    pub full_arg: String,
    /// Short CLI flag, e.g. `-b`
    pub short_arg: Option<String>,
    /// Environment variable name
    pub env_var: String,
    /// Key inside the package manifest's `config` section
    pub package_config: String,
    /// Name of the built-in default config
    pub default_config_file: String,
}
