//! Structured logging for app events
//!
//! Task failures are already logged where they happen, so task lifecycle
//! events are only recorded at debug level here. Build reports carry the
//! user-visible summary.

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use weft_events::{AppEvent, BuildReport, EventMessage, TaskEvent};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` in debug mode
/// and `info` elsewhere.
pub fn init_tracing(json_mode: bool, debug_mode: bool) {
    let default_level = if debug_mode { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Log an `EventMessage` with its metadata as structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::Task(task_event) => match task_event {
            TaskEvent::Started { task } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    task = %task,
                    "Task started"
                );
            }
            TaskEvent::Finished { task, duration } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    task = %task,
                    duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                    "Task finished"
                );
            }
            TaskEvent::Failed {
                task,
                failure,
                duration,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    task = %task,
                    code = ?failure.code,
                    message = %failure.message,
                    retryable = failure.retryable,
                    duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                    "Task failed"
                );
            }
        },

        AppEvent::Build(report) => match report {
            BuildReport::Completed {
                modules,
                warnings,
                bundled_files,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    modules,
                    warnings,
                    bundled_files,
                    "Bundle completed"
                );
            }
            BuildReport::Superseded => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    "Bundle superseded by a newer request"
                );
            }
            BuildReport::Warning { message } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    "{message}"
                );
            }
        },
    }
}
