use std::time::Duration;

use serde::{Deserialize, Serialize};
use weft_errors::UserFacingError;

/// Structured failure information carried by failure events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
            retryable: error.is_retryable(),
        }
    }
}

/// Task lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    Started {
        task: String,
    },
    Finished {
        task: String,
        duration: Duration,
    },
    Failed {
        task: String,
        failure: FailureContext,
        duration: Duration,
    },
}

/// Summaries of bundler cycles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildReport {
    /// A cycle finished and its stats were accepted
    Completed {
        modules: usize,
        warnings: usize,
        bundled_files: usize,
    },
    /// A request settled without a result because a newer one was pending
    Superseded,
    /// The bundler reported a warning
    Warning { message: String },
}
