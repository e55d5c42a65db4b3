#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for weft
//!
//! Two channels live here. The build event bus carries watch-cycle outcomes
//! from a watcher to the requests waiting on it. The app event channel
//! carries task lifecycle and build summaries to the CLI, which is the only
//! place that renders them.

pub mod bus;
pub mod meta;
pub mod task;

pub use bus::{BuildEvent, BuildEventBus, BuildEventSink, Delivery, Subscription};
pub use meta::{EventLevel, EventMeta, EventSource};
pub use task::{BuildReport, FailureContext, TaskEvent};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use weft_errors::UserFacingError;

/// Top-level application event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    Task(TaskEvent),
    Build(BuildReport),
}

impl AppEvent {
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::Task(_) => EventSource::TASK,
            Self::Build(_) => EventSource::BUILD,
        }
    }

    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Task(TaskEvent::Failed { .. }) => Level::ERROR,
            Self::Build(BuildReport::Warning { .. }) => Level::WARN,
            Self::Build(BuildReport::Superseded) => Level::DEBUG,
            _ => Level::INFO,
        }
    }
}

/// An event together with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }
}

pub type EventSender = UnboundedSender<EventMessage>;

pub type EventReceiver = UnboundedReceiver<EventMessage>;

#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Uniform emission API for anything that may hold an `EventSender`
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    /// Hook for stamping emitter-specific data, such as a correlation id,
    /// before an event is sent.
    fn enrich_event_meta(&self, _event: &AppEvent, _meta: &mut EventMeta) {}

    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    fn emit(&self, event: AppEvent) {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        self.enrich_event_meta(&event, &mut meta);
        self.emit_with_meta(meta, event);
    }

    fn emit_task_started(&self, task: impl Into<String>) {
        self.emit(AppEvent::Task(TaskEvent::Started { task: task.into() }));
    }

    fn emit_task_finished(&self, task: impl Into<String>, duration: Duration) {
        self.emit(AppEvent::Task(TaskEvent::Finished {
            task: task.into(),
            duration,
        }));
    }

    fn emit_task_failed<E: UserFacingError + ?Sized>(
        &self,
        task: impl Into<String>,
        error: &E,
        duration: Duration,
    ) {
        self.emit(AppEvent::Task(TaskEvent::Failed {
            task: task.into(),
            failure: FailureContext::from_error(error),
            duration,
        }));
    }

    fn emit_build_completed(&self, modules: usize, warnings: usize, bundled_files: usize) {
        self.emit(AppEvent::Build(BuildReport::Completed {
            modules,
            warnings,
            bundled_files,
        }));
    }

    fn emit_build_superseded(&self) {
        self.emit(AppEvent::Build(BuildReport::Superseded));
    }

    fn emit_build_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::Build(BuildReport::Warning {
            message: message.into(),
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
