//! One-shot builds

use crate::bundler::{BundleConfig, Bundler};
use std::sync::Arc;
use tracing::debug;
use weft_errors::{BuildError, Error, Result};
use weft_types::BundleStats;

/// Run a single build and check its report.
///
/// # Errors
///
/// Returns a build error if the bundler fails or reports any errors.
/// Warnings alone do not fail the build.
pub async fn run_full_build(bundler: &dyn Bundler, config: &BundleConfig) -> Result<Arc<BundleStats>> {
    let stats = bundler.run(config).await.map_err(Error::into_build_error)?;

    if stats.has_errors() {
        return Err(BuildError::Compilation {
            errors: stats.error_messages(),
        }
        .into());
    }
    if stats.has_warnings() {
        debug!(warnings = ?stats.warning_messages(), "bundler reported warnings");
    }

    Ok(Arc::new(stats))
}
