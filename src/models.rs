use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Position blob written by the publisher under the trip id key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct StoredPosition {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub course: i32,
    #[serde(default)]
    pub timestamp: i64,
}

impl StoredPosition {
    /// Field names match in any casing (`lat`, `Lat`, `LAT`). When one field
    /// shows up in several casings the lowercase spelling wins. `course` and
    /// `timestamp` default to zero, `lat` and `lng` are required.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(raw)?;
        let mut folded = Map::with_capacity(fields.len());
        for (name, value) in fields {
            let lower = name.to_lowercase();
            if lower == name || !folded.contains_key(&lower) {
                folded.insert(lower, value);
            }
        }
        serde_json::from_value(Value::Object(folded))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VehiclePosition {
    pub trip_id: i32,
    pub lat: f64,
    pub lng: f64,
    pub course: i32,
    /// Publisher report time. Not part of the locate response.
    pub timestamp: i64,
}

impl VehiclePosition {
    pub fn new(trip_id: i32, stored: StoredPosition) -> Self {
        Self {
            trip_id,
            lat: stored.lat,
            lng: stored.lng,
            course: stored.course,
            timestamp: stored.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Locate {
    pub trip_id: i32,
    pub lat: f64,
    pub lng: f64,
    pub course: i32,
}

impl From<VehiclePosition> for Locate {
    fn from(p: VehiclePosition) -> Self {
        Self {
            trip_id: p.trip_id,
            lat: p.lat,
            lng: p.lng,
            course: p.course,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LocateResult {
    pub locates: Vec<Locate>,
    pub timestamp: i64,
}

/// Row of the `trips` table. Text columns are fixed width and may carry padding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TripRow {
    pub route_number: String,
    pub bus_type: i32,
    pub first_stop: i32,
    pub prev_stop: i32,
    pub last_stop: i32,
    pub delay: i32,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Station {
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Stops {
    pub first_stop: String,
    pub prev_stop: String,
    pub last_stop: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TripDetails {
    pub route_number: String,
    pub bus_type: i32,
    pub stops: Stops,
    pub delay_seconds: i32,
    pub start_time: String,
    pub end_time: String,
    pub timestamp: i64,
}
