#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the weft build orchestrator
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone so a single watch-cycle failure can be
//! handed to every request settled by that cycle.

use std::borrow::Cow;

use thiserror::Error;

pub mod build;
pub mod config;

// Re-export all error types at the root
pub use build::BuildError;
pub use config::ConfigError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A build failure, tagged with whether it has already been reported.
    #[error("build error: {source}")]
    Build {
        source: BuildError,
        has_been_logged: bool,
    },

    /// A pending incremental request that a newer request superseded.
    #[error("build request superseded by a newer request")]
    Stale,

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an internal error with a message
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error stands for a discarded stale result rather than a failure.
    #[must_use]
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::Stale)
    }

    /// Whether this error has already been reported to the user.
    #[must_use]
    pub fn has_been_logged(&self) -> bool {
        matches!(
            self,
            Self::Build {
                has_been_logged: true,
                ..
            }
        )
    }

    /// Whether the failure should stop a long-running session.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Build { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Wrap any error as a build failure.
    ///
    /// Build errors keep their logged flag and stale errors pass through
    /// untouched so they are never mistaken for real failures.
    #[must_use]
    pub fn into_build_error(self) -> Self {
        match self {
            Self::Build { .. } | Self::Stale => self,
            other => Self::Build {
                source: BuildError::Failed {
                    message: other.to_string(),
                },
                has_been_logged: false,
            },
        }
    }

    /// Mark a build failure as reported. Other kinds are returned unchanged.
    #[must_use]
    pub fn mark_logged(self) -> Self {
        match self {
            Self::Build { source, .. } => Self::Build {
                source,
                has_been_logged: true,
            },
            other => other,
        }
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Self::Build {
            source: err,
            has_been_logged: false,
        }
    }
}

/// Result type alias for weft operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Build { source, .. } => source.user_message(),
            Error::Config(err) => err.user_message(),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Build { source, .. } => source.user_hint(),
            Error::Config(err) => err.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Build { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Build { source, .. } => source.user_code(),
            Error::Stale => Some("error.stale"),
            Error::Internal(_) => Some("error.internal"),
        }
    }
}
