use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::models::RouteInfo;

/// Static vehicle-to-route assignments, loaded once at startup.
///
/// The core tracks an open world of devices; the directory only enriches
/// vehicles operations has pre-registered. Unknown ids are still accepted,
/// they just carry no route metadata.
#[derive(Debug, Clone, Default)]
pub struct FleetDirectory {
    routes: HashMap<String, RouteInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FleetEntry {
    id: String,
    route: String,
}

impl FleetDirectory {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads assignments from a JSON array of `{"id": ..., "route": ...}` entries.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw =
            fs::read(path).with_context(|| format!("reading fleet file {}", path.display()))?;
        let entries: Vec<FleetEntry> =
            serde_json::from_slice(&raw).context("parsing fleet file")?;
        Ok(Self::from_assignments(entries.into_iter().map(|entry| (entry.id, entry.route))))
    }

    /// Builds a directory from in-memory assignments of vehicle id to route name.
    pub fn from_assignments(assignments: impl IntoIterator<Item = (String, String)>) -> Self {
        let routes = assignments
            .into_iter()
            .map(|(id, route)| (id, RouteInfo { name: route }))
            .collect();
        Self { routes }
    }

    #[must_use]
    pub fn route_for(&self, vehicle_id: &str) -> Option<RouteInfo> {
        self.routes.get(vehicle_id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
