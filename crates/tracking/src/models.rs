use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operational state of a tracked vehicle.
///
/// `Offline` is derived from elapsed time since the last report; ingestion
/// never writes it directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    #[default]
    Active,
    Stopped,
    Offline,
}

impl VehicleStatus {
    #[must_use]
    pub const fn is_offline(self) -> bool {
        matches!(self, Self::Offline)
    }
}

/// Static route metadata attached to a vehicle on first sighting.
/// Immutable once associated; position updates never overwrite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub name: String,
}

/// Latest known state for one vehicle.
///
/// `reported_at` is what the device claims, `received_at` is when the store
/// committed the write. Only the latter feeds staleness decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePosition {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub heading: f64,
    pub status: VehicleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteInfo>,
    pub reported_at: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
}

/// Mutable fields applied by a single store write.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub heading: f64,
    pub status: VehicleStatus,
    pub route: Option<RouteInfo>,
    pub reported_at: Option<DateTime<Utc>>,
}
