use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::fleet::FleetDirectory;
use crate::models::{PositionUpdate, VehicleStatus};
use crate::store::PositionStore;

/// Inbound report from one field device.
///
/// Coordinates are optional at the wire level so their absence can be
/// rejected with a precise reason instead of a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionReport {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub reported_at: Option<DateTime<Utc>>,
}

/// Acknowledgement returned to the device on acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    pub id: String,
    pub received_at: DateTime<Utc>,
}

/// Validates and normalizes device reports before they reach the store.
///
/// Ingest carries no capability check: field devices are vetted upstream,
/// and the gateway's own validation is the only admission control here.
pub struct IngestGateway {
    store: Arc<PositionStore>,
    fleet: FleetDirectory,
}

impl IngestGateway {
    #[must_use]
    pub fn new(store: Arc<PositionStore>, fleet: FleetDirectory) -> Self {
        Self { store, fleet }
    }

    /// Accepts or rejects a single report. The first validation failure wins
    /// and the store is left untouched on rejection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] or [`Error::OutOfRange`] describing
    /// the offending field.
    pub fn submit(&self, report: &PositionReport) -> Result<IngestReceipt> {
        let id = report.id.trim();
        if id.is_empty() {
            return Err(Error::MissingField("id".to_string()));
        }
        let Some(latitude) = report.latitude else {
            return Err(Error::MissingField("latitude".to_string()));
        };
        let Some(longitude) = report.longitude else {
            return Err(Error::MissingField("longitude".to_string()));
        };
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::OutOfRange(format!("latitude {latitude} outside [-90, 90]")));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::OutOfRange(format!("longitude {longitude} outside [-180, 180]")));
        }

        let update = PositionUpdate {
            latitude,
            longitude,
            speed: report.speed.filter(|value| *value >= 0.0).unwrap_or(0.0),
            heading: report.heading.map_or(0.0, wrap_heading),
            status: VehicleStatus::Active,
            route: self.fleet.route_for(id),
            reported_at: report.reported_at,
        };
        let record = self.store.upsert(id, update);

        info!(
            vehicle = %record.id,
            latitude = record.latitude,
            longitude = record.longitude,
            speed = record.speed,
            "position accepted"
        );

        Ok(IngestReceipt { id: record.id, received_at: record.received_at })
    }
}

// Wraps into [0, 360); non-finite values fall back to 0.
fn wrap_heading(heading: f64) -> f64 {
    if !heading.is_finite() {
        return 0.0;
    }
    let wrapped = heading.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
