//! Watch-mode build requests
//!
//! An [`IncrementalBuilder`] owns one [`BuildEventBus`] and starts at most one
//! watcher for it. Each call to [`IncrementalBuilder::request`] joins the bus;
//! when the watcher reports a cycle, only the newest pending request gets
//! the result and every older one settles with [`Error::Stale`].

use crate::bundler::{BundleConfig, Bundler};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use tracing::{debug, info};
use uuid::Uuid;
use weft_errors::{BuildError, Error, Result};
use weft_events::BuildEventBus;
use weft_types::{BuildContext, BundleStats};

pub struct IncrementalBuilder {
    bundler: Arc<dyn Bundler>,
    bus: BuildEventBus,
    watch_id: OnceLock<Uuid>,
}

impl IncrementalBuilder {
    #[must_use]
    pub fn new(bundler: Arc<dyn Bundler>) -> Self {
        Self {
            bundler,
            bus: BuildEventBus::new(),
            watch_id: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn bus(&self) -> &BuildEventBus {
        &self.bus
    }

    /// Id of the watcher this builder started, if any.
    #[must_use]
    pub fn watch_id(&self) -> Option<Uuid> {
        self.watch_id.get().copied()
    }

    /// Issue a build request against the context's watcher.
    ///
    /// The watcher is started on the first request and reused afterwards.
    /// The request has joined the bus when this returns, so an event fired
    /// at any later point settles it.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ForeignWatcher` if the context is watched by a
    /// different builder (or this builder already drives another context),
    /// and `BuildError::WatcherStart` if the watcher cannot be started.
    pub fn request(&self, context: &mut BuildContext, config: &BundleConfig) -> Result<PendingBuild> {
        match (&context.watch, self.watch_id()) {
            (Some(handle), Some(owned)) if handle.id() == owned => {}
            (Some(handle), _) => {
                return Err(BuildError::ForeignWatcher {
                    watch_id: handle.id().to_string(),
                }
                .into())
            }
            (None, Some(owned)) => {
                return Err(BuildError::ForeignWatcher {
                    watch_id: owned.to_string(),
                }
                .into())
            }
            (None, None) => {}
        }

        let subscription = self.bus.subscribe();
        let seq = subscription.seq();

        if context.watch.is_none() {
            let handle = match self.bundler.watch(config, self.bus.sink()) {
                Ok(handle) => handle,
                Err(e) => {
                    self.bus.withdraw(seq);
                    return Err(watcher_start_error(e));
                }
            };
            info!(watch = %handle.id(), "started bundler watcher");
            // Only reachable with an empty cell, checked above
            let _ = self.watch_id.set(handle.id());
            context.watch = Some(handle);
        }

        debug!(seq, generation = subscription.generation(), "incremental build requested");
        Ok(PendingBuild {
            seq,
            inner: Box::pin(subscription.settled()),
        })
    }
}

impl fmt::Debug for IncrementalBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalBuilder")
            .field("watch_id", &self.watch_id.get())
            .field("pending", &self.bus.pending())
            .finish_non_exhaustive()
    }
}

fn watcher_start_error(error: Error) -> Error {
    match error {
        Error::Build {
            source: BuildError::WatcherStart { .. },
            ..
        } => error,
        other => BuildError::WatcherStart {
            message: other.to_string(),
        }
        .into(),
    }
}

/// An outstanding watch-mode request
///
/// Resolves with the cycle's stats, with the cycle's build error, or with
/// `Error::Stale` when a newer request was pending at the same time.
/// Dropping it discards the settlement.
pub struct PendingBuild {
    seq: u64,
    inner: BoxFuture<'static, Result<Arc<BundleStats>>>,
}

impl PendingBuild {
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Future for PendingBuild {
    type Output = Result<Arc<BundleStats>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBuild")
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}
