//! The external bundler seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use weft_errors::Error;
use weft_events::BuildEventSink;
use weft_types::{BundleStats, WatchHandle};

/// Environment variable carrying the serialized [`BundleConfig`] to the
/// bundler command.
pub const ENV_VAR_BUNDLER_CONFIG: &str = "WEFT_BUNDLER_CONFIG";

/// One section (`dev` or `prod`) of the bundler config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtool: Option<String>,
    /// A single path, a list of paths, or a map of named entries
    #[serde(default)]
    pub entry: Value,
    pub output: BundleOutput,
    #[serde(default)]
    pub resolve: BundleResolve,
    /// Program and arguments; must print JSON stats on stdout
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Environment handed to the bundler process
    #[serde(skip)]
    pub env: HashMap<String, String>,
    /// Working directory of the bundler process
    #[serde(skip)]
    pub cwd: Option<PathBuf>,
    /// Directory whose changes trigger a rebuild in watch mode
    #[serde(skip)]
    pub watch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleOutput {
    pub path: PathBuf,
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleResolve {
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub modules: Vec<String>,
}

fn default_command() -> Vec<String> {
    vec!["npx".into(), "webpack".into(), "--json".into()]
}

/// A front-end bundler driven by weft
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Run one complete, non-watching build.
    ///
    /// A report that contains errors is still `Ok`; callers decide what a
    /// failing report means.
    async fn run(&self, config: &BundleConfig) -> Result<BundleStats, Error>;

    /// Start a long-lived watcher that reports every cycle to `sink`.
    ///
    /// Must be called from within a tokio runtime.
    fn watch(&self, config: &BundleConfig, sink: BuildEventSink) -> Result<WatchHandle, Error>;
}
