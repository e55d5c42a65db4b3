//! Task start/finish/failure reporting

use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use uuid::Uuid;
use weft_errors::Error;
use weft_events::{AppEvent, EventEmitter, EventMeta, EventSender};

/// Reports one task run through tracing and the app event channel
///
/// Every event emitted through the scope carries the run's id as its
/// correlation id.
#[derive(Debug)]
pub struct TaskScope {
    name: &'static str,
    run_id: Uuid,
    start: Instant,
    events: Option<EventSender>,
}

impl TaskScope {
    #[must_use]
    pub fn start(name: &'static str, events: Option<EventSender>) -> Self {
        let scope = Self {
            name,
            run_id: Uuid::new_v4(),
            start: Instant::now(),
            events,
        };
        debug!(task = name, run = %scope.run_id, "task started");
        scope.emit_task_started(name);
        scope
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) {
        let duration = self.elapsed();
        info!(task = self.name, ?duration, "{} finished", self.name);
        self.emit_task_finished(self.name, duration);
    }

    /// Report a failure at most once and hand the error back.
    ///
    /// Stale errors are returned untouched and never reported. Other errors
    /// come back marked as logged.
    #[must_use]
    pub fn fail(self, err: Error) -> Error {
        if err.is_ignorable() {
            return err;
        }

        if err.has_been_logged() {
            debug!(task = self.name, error = %err, "task failed (already reported)");
            return err;
        }

        let duration = self.elapsed();
        error!(task = self.name, "{} failed: {err}", self.name);
        self.emit_task_failed(self.name, &err, duration);
        err.mark_logged()
    }
}

impl EventEmitter for TaskScope {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }

    fn enrich_event_meta(&self, _event: &AppEvent, meta: &mut EventMeta) {
        meta.correlation_id = Some(self.run_id);
    }
}
