// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Flight feed data model and source abstraction.
//!
//! A feed returns one [`Snapshot`] per refresh: the complete list of aircraft
//! state vectors currently visible around a query point. The HTTP flight
//! proxy is implemented in [`http`]; anything else that can produce a
//! snapshot (recorded files, tests) implements [`FeedSource`].

mod http;

pub use http::{decode_response, HttpFeed, HttpFeedConfig};

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("invalid feed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A single aircraft as reported in one refresh cycle.
///
/// Field names follow the flight proxy's JSON; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftStateVector {
    /// ICAO 24-bit address (hex string), stable across cycles.
    #[serde(rename = "icao24", alias = "id")]
    pub id: Option<String>,
    /// Broadcast callsign, possibly blank or space padded.
    pub callsign: Option<String>,
    #[serde(rename = "originCountry")]
    pub origin_country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Geometric altitude in meters.
    #[serde(rename = "geoAltitude", alias = "altitude")]
    pub altitude: Option<f64>,
    /// Ground speed in m/s.
    #[serde(rename = "velocity", alias = "groundSpeed")]
    pub ground_speed: Option<f64>,
    /// True track in degrees (0-360, north = 0).
    #[serde(rename = "trueTrack", alias = "heading")]
    pub heading: Option<f64>,
    #[serde(rename = "onGround")]
    pub on_ground: bool,
    pub squawk: Option<String>,
    #[serde(rename = "aircraftType")]
    pub aircraft_type: Option<String>,
    /// Category hint from the feed ("Heli", "Military", ...). Independent of
    /// the classifier's own output.
    #[serde(rename = "aircraftCategory", alias = "declaredCategory")]
    pub declared_category: Option<String>,
}

impl AircraftStateVector {
    /// The aircraft id, if present and non-empty.
    #[must_use]
    pub fn icao(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Current position when both coordinates are present and finite.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    /// Callsign with surrounding padding removed; `None` when blank.
    #[must_use]
    pub fn trimmed_callsign(&self) -> Option<&str> {
        self.callsign
            .as_deref()
            .map(str::trim)
            .filter(|cs| !cs.is_empty())
    }
}

/// The complete set of aircraft received in one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub flights: Vec<AircraftStateVector>,
}

impl Snapshot {
    #[must_use]
    pub fn new(flights: Vec<AircraftStateVector>) -> Self {
        Self { flights }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Find an aircraft in this snapshot by id.
    #[must_use]
    pub fn get(&self, icao: &str) -> Option<&AircraftStateVector> {
        self.flights.iter().find(|f| f.icao() == Some(icao))
    }
}

/// Area around which a snapshot is requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedQuery {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Search radius in degrees.
    pub radius_deg: f64,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            center_lat: 26.649_509,
            center_lon: -80.185_902,
            radius_deg: 0.5,
        }
    }
}

/// Anything that can produce a snapshot for a query.
pub trait FeedSource: Send + Sync {
    /// Fetch the current snapshot around `query`.
    fn fetch(&self, query: &FeedQuery) -> impl Future<Output = Result<Snapshot, FeedError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_vector_from_feed_json() {
        let json = r#"{
            "icao24": "a1b2c3",
            "callsign": "AAL117  ",
            "originCountry": "United States",
            "latitude": 26.7,
            "longitude": -80.1,
            "geoAltitude": 3200.5,
            "velocity": 180.2,
            "trueTrack": 271.0,
            "onGround": false,
            "squawk": "1200",
            "aircraftType": "A321",
            "aircraftCategory": "Passenger",
            "lastContact": 1700000000
        }"#;
        let v: AircraftStateVector = serde_json::from_str(json).unwrap();
        assert_eq!(v.icao(), Some("a1b2c3"));
        assert_eq!(v.trimmed_callsign(), Some("AAL117"));
        assert_eq!(v.position(), Some((26.7, -80.1)));
        assert_eq!(v.heading, Some(271.0));
        assert_eq!(v.declared_category.as_deref(), Some("Passenger"));
    }

    #[test]
    fn test_state_vector_missing_fields() {
        let v: AircraftStateVector = serde_json::from_str(r#"{"icao24": "", "latitude": 1.0}"#).unwrap();
        assert_eq!(v.icao(), None);
        assert_eq!(v.position(), None);
        assert!(!v.on_ground);
        assert_eq!(v.trimmed_callsign(), None);
    }

    #[test]
    fn test_snapshot_without_flights_is_empty() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_snapshot_get_by_icao() {
        let snapshot = Snapshot::new(vec![AircraftStateVector {
            id: Some("abc123".to_string()),
            ..Default::default()
        }]);
        assert!(snapshot.get("abc123").is_some());
        assert!(snapshot.get("ffffff").is_none());
    }
}
