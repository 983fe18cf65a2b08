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

//! Snapshot orchestration.
//!
//! The [`SnapshotController`] owns the latest snapshot and the trail store,
//! and derives category and glyph for each aircraft on read. Refreshes are
//! sequenced: each one takes a [`RefreshTicket`] before fetching, and a
//! response that completes after a newer one has been applied is discarded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::classify::{Category, Classifier, Rule};
use crate::feed::{AircraftStateVector, FeedError, Snapshot};
use crate::glyph::{Glyph, GlyphTable};
use crate::trail::{Trail, TrailConfig, TrailMap, TrailStore};

/// Configuration for the controller and everything it owns.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub trail: TrailConfig,
    pub rules: Option<Vec<Rule>>,
    pub glyphs: GlyphTable,
}

/// Sequence number handed out when a refresh starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Outcome of applying a refresh result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The snapshot replaced the current state.
    Applied,
    /// The fetch failed; previous state is kept and the error recorded.
    Failed,
    /// A newer refresh was already applied; the result was ignored.
    Stale,
}

/// Everything the rendering layer needs for one aircraft.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedAircraft {
    pub aircraft: AircraftStateVector,
    pub trail: Option<Trail>,
    pub category: Category,
    pub glyph: Glyph,
}

/// Owner of the current snapshot and trails.
#[derive(Debug)]
pub struct SnapshotController {
    trails: TrailStore,
    classifier: Classifier,
    glyphs: GlyphTable,
    snapshot: Arc<Snapshot>,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<String>,
    next_sequence: u64,
    applied_sequence: Option<u64>,
}

impl SnapshotController {
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        let classifier = config
            .rules
            .as_deref()
            .map_or_else(Classifier::default, Classifier::new);

        Self {
            trails: TrailStore::new(config.trail),
            classifier,
            glyphs: config.glyphs,
            snapshot: Arc::new(Snapshot::default()),
            last_updated: None,
            last_error: None,
            next_sequence: 0,
            applied_sequence: None,
        }
    }

    /// Reserve a sequence number for a refresh about to start.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        let ticket = RefreshTicket(self.next_sequence);
        self.next_sequence += 1;
        ticket
    }

    /// Apply the result of the refresh identified by `ticket`.
    pub fn apply(&mut self, ticket: RefreshTicket, result: Result<Snapshot, FeedError>) -> ApplyOutcome {
        if self.applied_sequence.is_some_and(|applied| ticket.0 <= applied) {
            debug!(
                "Discarding refresh #{} (already applied #{:?})",
                ticket.0, self.applied_sequence
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(snapshot) => {
                self.applied_sequence = Some(ticket.0);
                self.ingest(snapshot);
                ApplyOutcome::Applied
            }
            Err(e) => {
                warn!("Refresh #{} failed: {}", ticket.0, e);
                self.last_error = Some(e.to_string());
                ApplyOutcome::Failed
            }
        }
    }

    /// Replace the current snapshot and fold it into the trails.
    pub fn ingest(&mut self, snapshot: Snapshot) {
        self.trails.ingest(&snapshot.flights);
        self.snapshot = Arc::new(snapshot);
        self.last_updated = Some(Utc::now());
        self.last_error = None;

        info!(
            "Snapshot applied: {} aircraft, {} trails",
            self.snapshot.len(),
            self.trails.len()
        );
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    #[must_use]
    pub fn trails(&self) -> Arc<TrailMap> {
        self.trails.trails()
    }

    #[must_use]
    pub fn classify(&self, callsign: Option<&str>) -> Category {
        self.classifier.classify(callsign)
    }

    /// Category of an aircraft in the current snapshot.
    #[must_use]
    pub fn category_of(&self, icao: &str) -> Option<Category> {
        self.snapshot
            .get(icao)
            .map(|v| self.classifier.classify(v.callsign.as_deref()))
    }

    #[must_use]
    pub fn glyph_for(&self, vector: &AircraftStateVector) -> Glyph {
        let category = self.classifier.classify(vector.callsign.as_deref());
        self.glyphs.select(vector, category)
    }

    /// Current aircraft with trail, category and glyph, optionally filtered
    /// to a single category. Order follows the snapshot.
    #[must_use]
    pub fn frame(&self, filter: Option<Category>) -> Vec<TrackedAircraft> {
        let trails = self.trails.trails();
        self.snapshot
            .flights
            .iter()
            .filter_map(|vector| {
                let category = self.classifier.classify(vector.callsign.as_deref());
                if filter.is_some_and(|f| f != category) {
                    return None;
                }
                Some(TrackedAircraft {
                    aircraft: vector.clone(),
                    trail: vector.icao().and_then(|icao| trails.get(icao).cloned()),
                    category,
                    glyph: self.glyphs.select(vector, category),
                })
            })
            .collect()
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Message of the most recent failed refresh, cleared on success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    #[must_use]
    pub fn glyph_table(&self) -> &GlyphTable {
        &self.glyphs
    }
}

impl Default for SnapshotController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
