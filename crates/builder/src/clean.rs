//! The clean task

use crate::scope::TaskScope;
use std::path::Path;
use tracing::debug;
use weft_errors::{BuildError, Result};
use weft_events::EventSender;
use weft_types::{BuildContext, ContextDir};

/// Empty the build directory, creating it if it does not exist.
///
/// # Errors
///
/// Returns `BuildError::CleanFailed` if the directory cannot be emptied, or
/// a config error if the build directory has not been resolved.
pub async fn clean(context: &BuildContext, events: Option<EventSender>) -> Result<()> {
    let scope = TaskScope::start("clean", events);
    let build_dir = match context.require_dir(ContextDir::Build) {
        Ok(dir) => dir,
        Err(e) => return Err(scope.fail(e.into_build_error())),
    };

    debug!(path = %build_dir.display(), "emptying build directory");
    match empty_dir(build_dir).await {
        Ok(()) => {
            scope.finish();
            Ok(())
        }
        Err(e) => Err(scope.fail(
            BuildError::CleanFailed {
                path: build_dir.display().to_string(),
                message: e.to_string(),
            }
            .into(),
        )),
    }
}

async fn empty_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        // file_type does not follow symlinks, so linked directories are unlinked
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
    }
    Ok(())
}
