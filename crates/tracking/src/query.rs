use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::clock::SharedClock;
use crate::error::{Error, Result};
use crate::models::VehiclePosition;
use crate::store::PositionStore;

/// Fine-grained heartbeat summary for one vehicle.
///
/// Distinct from the coarse Offline classification: a vehicle can read
/// `online: false` here while still counting as Active in position reads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleLiveness {
    pub online: bool,
    pub last_update: DateTime<Utc>,
    pub seconds_since_update: i64,
}

/// Read-side operations over store snapshots.
///
/// Capability enforcement lives at the transport boundary; by the time a
/// call lands here the caller has already been admitted.
pub struct QueryService {
    store: Arc<PositionStore>,
    clock: SharedClock,
    liveness_threshold: Duration,
}

impl QueryService {
    #[must_use]
    pub fn new(store: Arc<PositionStore>, clock: SharedClock, liveness_threshold: Duration) -> Self {
        Self { store, clock, liveness_threshold }
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn get_one(&self, id: &str) -> Result<VehiclePosition> {
        self.store.get(id).ok_or_else(|| Error::NotFound(format!("vehicle {id}")))
    }

    #[must_use]
    pub fn get_all(&self) -> Vec<VehiclePosition> {
        self.store.list()
    }

    /// Case-insensitive substring match over vehicle id and route name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the query is blank; an empty
    /// query is a client mistake, not a request for everything.
    pub fn search(&self, query: &str) -> Result<Vec<VehiclePosition>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::InvalidRequest("search query required".to_string()));
        }
        Ok(self.store.search(|record| {
            record.id.to_lowercase().contains(&needle)
                || record
                    .route
                    .as_ref()
                    .is_some_and(|route| route.name.to_lowercase().contains(&needle))
        }))
    }

    /// Heartbeat check against the liveness threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn status(&self, id: &str) -> Result<VehicleLiveness> {
        let record = self.get_one(id)?;
        let elapsed = self.clock.now().signed_duration_since(record.received_at);
        Ok(VehicleLiveness {
            online: elapsed < self.liveness_threshold,
            last_update: record.received_at,
            seconds_since_update: elapsed.num_seconds().max(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use pretty_assertions::assert_eq;

    use super::QueryService;
    use crate::clock::testing::ManualClock;
    use crate::error::Error;
    use crate::models::{PositionUpdate, RouteInfo, VehicleStatus};
    use crate::store::PositionStore;

    fn seeded() -> (QueryService, ManualClock) {
        let clock = ManualClock::epoch();
        let store =
            Arc::new(PositionStore::new(Arc::new(clock.clone()), Duration::seconds(60)));
        store.upsert(
            "BUS01",
            PositionUpdate {
                latitude: 12.97,
                longitude: 77.59,
                speed: 35.0,
                heading: 90.0,
                status: VehicleStatus::Active,
                route: Some(RouteInfo { name: "Route A - Main Campus".to_string() }),
                reported_at: None,
            },
        );
        store.upsert(
            "BUS02",
            PositionUpdate {
                latitude: 12.98,
                longitude: 77.60,
                speed: 42.0,
                heading: 180.0,
                status: VehicleStatus::Active,
                route: Some(RouteInfo { name: "Route B - North Campus".to_string() }),
                reported_at: None,
            },
        );
        let queries =
            QueryService::new(store, Arc::new(clock.clone()), Duration::seconds(30));
        (queries, clock)
    }

    #[test]
    fn get_one_and_get_all() {
        let (queries, _clock) = seeded();

        assert_eq!(queries.get_one("BUS01").expect("record").latitude, 12.97);
        assert_eq!(queries.get_all().len(), 2);
        assert_eq!(
            queries.get_one("BUS99"),
            Err(Error::NotFound("vehicle BUS99".to_string()))
        );
    }

    #[test]
    fn search_is_case_insensitive_over_id_and_route() {
        let (queries, _clock) = seeded();

        let by_id = queries.search("bus01").expect("results");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, "BUS01");

        let by_route = queries.search("north campus").expect("results");
        assert_eq!(by_route.len(), 1);
        assert_eq!(by_route[0].id, "BUS02");

        assert!(queries.search("tram").expect("results").is_empty());
    }

    #[test]
    fn blank_search_is_rejected() {
        let (queries, _clock) = seeded();

        assert_eq!(queries.search("").unwrap_err().code(), "invalid_request");
        assert_eq!(queries.search("   ").unwrap_err().code(), "invalid_request");
    }

    #[test]
    fn liveness_uses_its_own_threshold() {
        let (queries, clock) = seeded();

        clock.advance(Duration::seconds(29));
        let status = queries.status("BUS01").expect("status");
        assert!(status.online);
        assert_eq!(status.seconds_since_update, 29);

        // offline for the heartbeat, but still Active for position reads
        clock.advance(Duration::seconds(2));
        let status = queries.status("BUS01").expect("status");
        assert!(!status.online);
        assert_eq!(status.seconds_since_update, 31);
        assert_eq!(
            queries.get_one("BUS01").expect("record").status,
            VehicleStatus::Active
        );

        assert_eq!(queries.status("BUS99").unwrap_err().code(), "not_found");
    }
}
