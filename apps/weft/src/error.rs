//! CLI error handling

use std::fmt;

use weft_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// A task failed
    Task(weft_errors::Error),
    /// The interrupt handler could not be installed
    Signal(std::io::Error),
}

impl CliError {
    /// Whether the failure was already reported where it happened
    #[must_use]
    pub fn has_been_logged(&self) -> bool {
        match self {
            CliError::Task(e) => e.has_been_logged(),
            CliError::Signal(_) => false,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Task(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this task.")?;
                }
                Ok(())
            }
            CliError::Signal(e) => write!(f, "Signal handler error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Task(e) => Some(e),
            CliError::Signal(e) => Some(e),
        }
    }
}

impl From<weft_errors::Error> for CliError {
    fn from(e: weft_errors::Error) -> Self {
        CliError::Task(e)
    }
}
