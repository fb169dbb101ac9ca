use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::clock::SharedClock;
use crate::models::{PositionUpdate, VehiclePosition, VehicleStatus};

/// Concurrent owner of the latest known state per vehicle.
///
/// All mutation funnels through [`Self::upsert`]; readers get clones, so no
/// caller ever aliases a live record across a concurrent write. Writers to
/// the same id serialize on the map entry, writers to different ids proceed
/// independently.
pub struct PositionStore {
    records: DashMap<String, VehiclePosition>,
    clock: SharedClock,
    offline_threshold: Duration,
}

impl PositionStore {
    #[must_use]
    pub fn new(clock: SharedClock, offline_threshold: Duration) -> Self {
        Self { records: DashMap::new(), clock, offline_threshold }
    }

    /// Applies `update` to the record for `id`, creating it on first sight.
    ///
    /// Last write wins by commit order, not by the device timestamp. Route
    /// metadata sticks once associated: an update that omits it carries the
    /// existing value forward, one that repeats it is ignored.
    pub fn upsert(&self, id: &str, update: PositionUpdate) -> VehiclePosition {
        let received_at = self.clock.now();
        let mut entry = self
            .records
            .entry(id.to_string())
            .or_insert_with(|| blank_record(id, received_at));

        let record = entry.value_mut();
        record.latitude = update.latitude;
        record.longitude = update.longitude;
        record.speed = update.speed;
        record.heading = update.heading;
        record.status = update.status;
        record.route = record.route.take().or(update.route);
        record.reported_at = update.reported_at.unwrap_or(received_at);
        record.received_at = received_at;
        record.clone()
    }

    /// Current record for `id`, status recomputed against the clock.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<VehiclePosition> {
        let now = self.clock.now();
        self.records.get(id).map(|entry| self.refreshed(entry.value(), now))
    }

    /// Snapshot of every record, each with recomputed status. Order is the
    /// map's iteration order, stable within one call.
    #[must_use]
    pub fn list(&self) -> Vec<VehiclePosition> {
        let now = self.clock.now();
        self.records.iter().map(|entry| self.refreshed(entry.value(), now)).collect()
    }

    /// Filters the snapshot without touching stored state.
    pub fn search<F>(&self, predicate: F) -> Vec<VehiclePosition>
    where
        F: Fn(&VehiclePosition) -> bool,
    {
        self.list().into_iter().filter(|record| predicate(record)).collect()
    }

    /// Sweeper hook: persists the Offline classification for records the
    /// lazy read path already reports as stale. Only narrows toward Offline;
    /// ingestion is the sole path back to Active. Returns the number of
    /// transitions applied.
    pub fn mark_offline_stale(&self, now: DateTime<Utc>) -> usize {
        let mut transitions = 0;
        for mut entry in self.records.iter_mut() {
            let record = entry.value_mut();
            if !record.status.is_offline() && self.is_stale(record, now) {
                record.status = VehicleStatus::Offline;
                transitions += 1;
            }
        }
        transitions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn refreshed(&self, record: &VehiclePosition, now: DateTime<Utc>) -> VehiclePosition {
        let mut copy = record.clone();
        if self.is_stale(&copy, now) {
            copy.status = VehicleStatus::Offline;
        }
        copy
    }

    fn is_stale(&self, record: &VehiclePosition, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(record.received_at) > self.offline_threshold
    }
}

fn blank_record(id: &str, received_at: DateTime<Utc>) -> VehiclePosition {
    VehiclePosition {
        id: id.to_string(),
        latitude: 0.0,
        longitude: 0.0,
        speed: 0.0,
        heading: 0.0,
        status: VehicleStatus::Active,
        route: None,
        reported_at: received_at,
        received_at,
    }
}
