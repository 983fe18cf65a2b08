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

//! Trail tracking and classification for polled flight-position feeds.
//!
//! Each refresh delivers a complete [`Snapshot`] of the aircraft around a
//! point. This library keeps what is worth keeping between refreshes and
//! derives what the display needs:
//!
//! - **Feed layer**: snapshot data model and the HTTP flight proxy client
//! - **Trail layer**: bounded per-aircraft position history
//! - **Classification**: ordered callsign rules producing a [`Category`]
//! - **Glyphs**: marker symbol and rotation per aircraft
//! - **Controller / poller**: sequenced refreshes feeding all of the above
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::{Arc, RwLock};
//! use std::time::Duration;
//! use flight_feed::{HttpFeed, HttpFeedConfig, Poller, PollerConfig, SnapshotController};
//!
//! #[tokio::main]
//! async fn main() {
//!     let feed = HttpFeed::new(HttpFeedConfig::default()).unwrap();
//!     let controller = Arc::new(RwLock::new(SnapshotController::default()));
//!     let poller = Poller::new(feed, Arc::clone(&controller), PollerConfig {
//!         interval: Some(Duration::from_secs(15)),
//!         ..Default::default()
//!     });
//!     poller.start();
//!
//!     let mut events = poller.subscribe();
//!     while events.recv().await.is_ok() {
//!         for tracked in controller.read().unwrap().frame(None) {
//!             println!("{:?} {} {}", tracked.aircraft.icao(), tracked.category, tracked.glyph.symbol);
//!         }
//!     }
//! }
//! ```
//!
//! # Trail Layer Only
//!
//! ```
//! use flight_feed::{AircraftStateVector, TrailStore};
//!
//! let mut store = TrailStore::default();
//! store.ingest(&[AircraftStateVector {
//!     id: Some("a1b2c3".to_string()),
//!     latitude: Some(10.0),
//!     longitude: Some(20.0),
//!     ..Default::default()
//! }]);
//! assert_eq!(store.trails()["a1b2c3"].len(), 1);
//! ```

pub mod classify;
pub mod controller;
pub mod feed;
pub mod glyph;
pub mod poller;
pub mod trail;

pub use classify::{default_rules, Category, Classifier, Rule, UnknownCategory};
pub use controller::{ApplyOutcome, ControllerConfig, RefreshTicket, SnapshotController, TrackedAircraft};
pub use feed::{
    decode_response, AircraftStateVector, FeedError, FeedQuery, FeedSource, HttpFeed, HttpFeedConfig,
    Snapshot,
};
pub use glyph::{select_glyph, Glyph, GlyphTable};
pub use poller::{PollEvent, Poller, PollerConfig};
pub use trail::{DedupPolicy, Trail, TrailConfig, TrailMap, TrailPoint, TrailStore, DEFAULT_MAX_TRAIL_POINTS};
