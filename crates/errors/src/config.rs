//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("package manifest unavailable at {path}: {message}")]
    ManifestUnavailable { path: String, message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestUnavailable { .. } => Some("Check that package.json is valid JSON."),
            Self::MissingField { .. } => {
                Some("Run the task through the weft CLI so the build context is fully resolved.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ManifestUnavailable { .. } => "config.manifest_unavailable",
            Self::MissingField { .. } => "config.missing_field",
        };
        Some(code)
    }
}
