//! Build outcome bus shared by a watcher and its pending requests
//!
//! Every request joins the bus before its build cycle completes. When the
//! watcher publishes an outcome, the bus takes the whole pending set in one
//! step and settles each request: the newest one receives the outcome, the
//! rest are told they were superseded.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, trace};
use weft_errors::{Error, Result};
use weft_types::BundleStats;

/// Outcome of one watch cycle
#[derive(Debug, Clone)]
pub enum BuildEvent {
    Succeeded(Arc<BundleStats>),
    Failed(Error),
}

/// What a single pending request receives when the bus fires
#[derive(Debug)]
pub struct Delivery {
    pub event: BuildEvent,
    /// Sequence number of the receiving request
    pub seq: u64,
    /// Highest sequence number pending when the event fired
    pub newest_seq: u64,
    pub generation: u64,
}

impl Delivery {
    #[must_use]
    pub fn is_newest(&self) -> bool {
        self.seq == self.newest_seq
    }

    /// Resolve this delivery for its request.
    ///
    /// # Errors
    ///
    /// Returns `Error::Stale` for superseded requests and a build error when
    /// the cycle failed.
    pub fn into_outcome(self) -> Result<Arc<BundleStats>> {
        if !self.is_newest() {
            return Err(Error::Stale);
        }
        match self.event {
            BuildEvent::Succeeded(stats) => Ok(stats),
            BuildEvent::Failed(error) => Err(error.into_build_error()),
        }
    }
}

/// One in-flight request waiting for the next build event
#[derive(Debug)]
struct PendingBuildRequest {
    seq: u64,
    generation: u64,
    tx: oneshot::Sender<Delivery>,
}

#[derive(Debug, Default)]
struct BusState {
    generation: u64,
    next_seq: u64,
    waiters: Vec<PendingBuildRequest>,
}

/// Generation-counted outcome channel
#[derive(Debug, Clone, Default)]
pub struct BuildEventBus {
    state: Arc<Mutex<BusState>>,
}

impl BuildEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the current generation with the next sequence number.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = state.next_seq;
        state.next_seq += 1;
        let generation = state.generation;
        state.waiters.push(PendingBuildRequest {
            seq,
            generation,
            tx,
        });
        trace!(seq, generation, "request joined build event bus");
        Subscription {
            seq,
            generation,
            rx,
        }
    }

    /// Settle every pending request with `event`.
    ///
    /// Returns the number of requests that were pending.
    pub fn publish(&self, event: &BuildEvent) -> usize {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let waiters = std::mem::take(&mut state.waiters);
        let generation = state.generation;
        state.generation += 1;

        let Some(newest_seq) = waiters.iter().map(|waiter| waiter.seq).max() else {
            debug!(generation, "build event with no pending requests");
            return 0;
        };

        let count = waiters.len();
        for waiter in waiters {
            debug_assert_eq!(waiter.generation, generation);
            // A dropped receiver only means the caller stopped waiting
            let _ = waiter.tx.send(Delivery {
                event: event.clone(),
                seq: waiter.seq,
                newest_seq,
                generation,
            });
        }
        debug!(generation, count, newest_seq, "settled pending build requests");
        count
    }

    /// Remove a request that will never wait for its settlement.
    ///
    /// Returns whether the request was still pending.
    pub fn withdraw(&self, seq: u64) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.waiters.len();
        state.waiters.retain(|waiter| waiter.seq != seq);
        let removed = state.waiters.len() < before;
        if removed {
            trace!(seq, "request withdrawn from build event bus");
        }
        removed
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters
            .len()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Handle the watcher uses to report outcomes
    #[must_use]
    pub fn sink(&self) -> BuildEventSink {
        BuildEventSink { bus: self.clone() }
    }
}

/// A request's membership in one bus generation
#[derive(Debug)]
pub struct Subscription {
    seq: u64,
    generation: u64,
    rx: oneshot::Receiver<Delivery>,
}

impl Subscription {
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the bus to fire and resolve this request.
    ///
    /// # Errors
    ///
    /// Returns `Error::Stale` if a newer request was pending, the cycle's
    /// build error, or an internal error if the bus went away.
    pub async fn settled(self) -> Result<Arc<BundleStats>> {
        match self.rx.await {
            Ok(delivery) => delivery.into_outcome(),
            Err(_) => Err(Error::internal("build event bus closed before settling")),
        }
    }
}

/// Write side of the bus handed to a watcher
#[derive(Debug, Clone)]
pub struct BuildEventSink {
    bus: BuildEventBus,
}

impl BuildEventSink {
    pub fn emit_success(&self, stats: BundleStats) -> usize {
        self.bus.publish(&BuildEvent::Succeeded(Arc::new(stats)))
    }

    pub fn emit_failure(&self, error: impl Into<Error>) -> usize {
        self.bus.publish(&BuildEvent::Failed(error.into()))
    }
}
