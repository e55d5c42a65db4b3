//! Build error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("build failed: {message}")]
    Failed { message: String },

    #[error("bundler reported {} error(s): {}", .errors.len(), .errors.join("; "))]
    Compilation { errors: Vec<String> },

    #[error("failed to start watcher: {message}")]
    WatcherStart { message: String },

    #[error("watch {watch_id} belongs to a different orchestrator")]
    ForeignWatcher { watch_id: String },

    #[error("bundler command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("invalid bundler output: {message}")]
    InvalidStats { message: String },

    #[error("invalid bundler config: {message}")]
    InvalidBundlerConfig { message: String },

    #[error("failed to empty directory {path}: {message}")]
    CleanFailed { path: String, message: String },
}

impl BuildError {
    /// Whether this failure ends a watch session instead of a single cycle.
    ///
    /// A bad bundler config fails every request before it reaches the
    /// watcher, so no later cycle could recover from it.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::WatcherStart { .. }
                | Self::ForeignWatcher { .. }
                | Self::InvalidBundlerConfig { .. }
        )
    }
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Compilation { .. } => Some("Fix the reported compile errors; watch mode rebuilds on save."),
            Self::WatcherStart { .. } => Some("Check that the source directory exists and is readable."),
            Self::CommandFailed { .. } => {
                Some("Check the `command` entry of the bundler config and that the bundler is installed.")
            }
            Self::InvalidStats { .. } => Some("The bundler command must print its JSON stats to stdout."),
            Self::InvalidBundlerConfig { .. } => {
                Some("The bundler config must contain `dev` and `prod` sections.")
            }
            Self::CleanFailed { .. } => Some("Ensure the build directory is writable and retry."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CleanFailed { .. } | Self::CommandFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "build.failed",
            Self::Compilation { .. } => "build.compilation",
            Self::WatcherStart { .. } => "build.watcher_start",
            Self::ForeignWatcher { .. } => "build.foreign_watcher",
            Self::CommandFailed { .. } => "build.command_failed",
            Self::InvalidStats { .. } => "build.invalid_stats",
            Self::InvalidBundlerConfig { .. } => "build.invalid_bundler_config",
            Self::CleanFailed { .. } => "build.clean_failed",
        };
        Some(code)
    }
}
