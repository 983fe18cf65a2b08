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

//! Bounded per-aircraft position history.
//!
//! The [`TrailStore`] turns successive snapshots into one [`Trail`] per
//! aircraft id. The latest snapshot is the only source of truth:
//!
//! - a trail starts the first time an id shows up with a position
//! - a point is appended only when it differs exactly from the previous one
//! - the oldest points are dropped once the cap is exceeded
//! - a trail is deleted the moment its id is missing from a snapshot
//!
//! There is no distance threshold and no grace period. An id that is present
//! but reports no position keeps its trail and resumes it later.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::feed::AircraftStateVector;

/// Default maximum number of points per trail.
pub const DEFAULT_MAX_TRAIL_POINTS: usize = 60;

/// Trails keyed by aircraft id.
pub type TrailMap = HashMap<String, Trail>;

/// A single `(latitude, longitude)` sample, serialized as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct TrailPoint {
    pub lat: f64,
    pub lon: f64,
}

impl TrailPoint {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<[f64; 2]> for TrailPoint {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<TrailPoint> for [f64; 2] {
    fn from(point: TrailPoint) -> Self {
        [point.lat, point.lon]
    }
}

/// Ordered position history of one aircraft, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trail {
    points: Vec<TrailPoint>,
}

impl Trail {
    #[must_use]
    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    #[must_use]
    pub fn last(&self) -> Option<&TrailPoint> {
        self.points.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A trail needs two points to be drawn as a line.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    fn push(&mut self, point: TrailPoint, dedup: DedupPolicy, cap: usize) {
        let duplicate = dedup == DedupPolicy::Exact && self.last() == Some(&point);
        if !duplicate {
            self.points.push(point);
        }

        if self.points.len() > cap {
            let excess = self.points.len() - cap;
            self.points.drain(..excess);
        }
    }
}

/// How a new point is compared to the previous one before appending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Skip the point when both coordinates equal the last point exactly.
    #[default]
    Exact,
    /// Append every reported point.
    Off,
}

/// Configuration for the trail store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Maximum points kept per trail. Values below 1 act as 1.
    pub max_points: usize,
    pub dedup: DedupPolicy,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_TRAIL_POINTS,
            dedup: DedupPolicy::Exact,
        }
    }
}

impl TrailConfig {
    fn cap(&self) -> usize {
        self.max_points.max(1)
    }
}

/// Owner of all trails. Single writer (`ingest`), many readers (`trails`).
#[derive(Debug, Default)]
pub struct TrailStore {
    config: TrailConfig,
    trails: Arc<TrailMap>,
}

impl TrailStore {
    #[must_use]
    pub fn new(config: TrailConfig) -> Self {
        Self {
            config,
            trails: Arc::new(TrailMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// Fold a snapshot into the trails.
    ///
    /// The replacement map is built off to the side and swapped in at the
    /// end, so a reader holding the previous [`trails`](Self::trails) handle
    /// never sees a half-applied update.
    pub fn ingest(&mut self, snapshot: &[AircraftStateVector]) {
        let cap = self.config.cap();
        let mut next: TrailMap = (*self.trails).clone();
        let mut seen: HashSet<&str> = HashSet::with_capacity(snapshot.len());

        for vector in snapshot {
            let Some(icao) = vector.icao() else {
                trace!("Skipping state vector without id");
                continue;
            };
            seen.insert(icao);

            let Some((lat, lon)) = vector.position() else {
                trace!("No position for {} this cycle", icao);
                continue;
            };

            next.entry(icao.to_string())
                .or_default()
                .push(TrailPoint::new(lat, lon), self.config.dedup, cap);
        }

        let before = next.len();
        next.retain(|icao, _| seen.contains(icao.as_str()));
        let removed = before - next.len();
        if removed > 0 {
            debug!("Dropped {} trail(s) for aircraft no longer reported", removed);
        }

        self.trails = Arc::new(next);
    }

    /// Shared read-only view of the current trails.
    #[must_use]
    pub fn trails(&self) -> Arc<TrailMap> {
        Arc::clone(&self.trails)
    }

    #[must_use]
    pub fn get(&self, icao: &str) -> Option<&Trail> {
        self.trails.get(icao)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }
}
