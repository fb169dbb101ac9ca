use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::clock::SharedClock;
use crate::store::PositionStore;

/// Background task that persists the Offline classification.
///
/// The read path already derives staleness lazily; the sweeper exists so the
/// stored state converges too, keeping list snapshots honest even for
/// vehicles nobody is querying. It only ever narrows toward Offline, so an
/// ingestion racing a sweep always wins.
pub struct Sweeper {
    store: Arc<PositionStore>,
    clock: SharedClock,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Sweeper {
    #[must_use]
    pub fn new(
        store: Arc<PositionStore>, clock: SharedClock, period: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self { store, clock, period, shutdown }
    }

    /// Runs until the shutdown signal flips or its sender is dropped.
    /// Ticks never overlap; a tick interrupted by shutdown is safe to leave
    /// half-applied since the next pass re-derives the same transitions.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut shutdown = self.shutdown.clone();
        info!(period_secs = self.period.as_secs(), "staleness sweeper started");

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("staleness sweeper stopping");
                        return;
                    }
                }
            }
        }
    }

    /// One sweep pass. Exposed so tests drive a single tick directly.
    pub fn tick(&self) {
        let transitions = self.store.mark_offline_stale(self.clock.now());
        if transitions > 0 {
            info!(transitions, "marked stale vehicles offline");
        } else {
            debug!("sweep found no stale vehicles");
        }
    }
}
