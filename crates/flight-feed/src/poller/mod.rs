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

//! Refresh scheduling.
//!
//! The [`Poller`] drives a [`FeedSource`] and feeds its results into a shared
//! [`SnapshotController`]. It refreshes once on [`start`](Poller::start) and
//! then on a fixed interval when one is configured; [`refresh_once`](Poller::refresh_once)
//! can be called at any time for a manual refresh.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use log::{error, info};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::controller::{ApplyOutcome, SnapshotController};
use crate::feed::{FeedQuery, FeedSource};

/// Configuration for the poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub query: FeedQuery,
    /// Interval between automatic refreshes. `None` refreshes only at start.
    pub interval: Option<Duration>,
    /// Broadcast channel capacity for refresh events.
    pub event_channel_capacity: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            query: FeedQuery::default(),
            interval: None,
            event_channel_capacity: 16,
        }
    }
}

/// Emitted after every completed refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Refreshed { sequence: u64, outcome: ApplyOutcome },
}

/// Shared state between the poller handle and its background task.
struct Shared<S> {
    source: S,
    controller: Arc<RwLock<SnapshotController>>,
    query: RwLock<FeedQuery>,
    in_flight: AtomicUsize,
    event_tx: broadcast::Sender<PollEvent>,
}

impl<S: FeedSource> Shared<S> {
    async fn refresh(&self) -> ApplyOutcome {
        let ticket = match self.controller.write() {
            Ok(mut controller) => controller.begin_refresh(),
            Err(_) => {
                error!("Snapshot controller lock poisoned");
                return ApplyOutcome::Failed;
            }
        };
        let query = self
            .query
            .read()
            .map(|q| *q)
            .unwrap_or_default();

        let result = {
            let _busy = InFlight::enter(&self.in_flight);
            self.source.fetch(&query).await
        };

        let outcome = match self.controller.write() {
            Ok(mut controller) => controller.apply(ticket, result),
            Err(_) => {
                error!("Snapshot controller lock poisoned");
                ApplyOutcome::Failed
            }
        };

        let _ = self.event_tx.send(PollEvent::Refreshed {
            sequence: ticket.sequence(),
            outcome,
        });
        outcome
    }
}

/// Counts a fetch as in flight until dropped, including when the refresh
/// future is cancelled mid-fetch.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle to a refresh scheduler.
pub struct Poller<S> {
    shared: Arc<Shared<S>>,
    interval: Option<Duration>,
    task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl<S> std::fmt::Debug for Poller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("interval", &self.interval)
            .field("in_flight", &self.shared.in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<S: FeedSource + 'static> Poller<S> {
    #[must_use]
    pub fn new(source: S, controller: Arc<RwLock<SnapshotController>>, config: PollerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));

        Self {
            shared: Arc::new(Shared {
                source,
                controller,
                query: RwLock::new(config.query),
                in_flight: AtomicUsize::new(0),
                event_tx,
            }),
            interval: config.interval,
            task: Mutex::new(None),
        }
    }

    /// Start background refreshing. Does nothing if already running.
    pub fn start(&self) {
        let Ok(mut task) = self.task.lock() else {
            error!("Poller task lock poisoned");
            return;
        };
        if task.as_ref().is_some_and(|(_, handle)| !handle.is_finished()) {
            return;
        }

        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            poll_loop(shared, interval, task_cancel).await;
        });

        *task = Some((cancel_token, handle));
    }

    /// Stop background refreshing. In-flight fetches are abandoned.
    pub fn stop(&self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some((cancel_token, _)) = task.take() {
                cancel_token.cancel();
            }
        }
    }

    /// Whether the background task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .map(|t| t.as_ref().is_some_and(|(_, handle)| !handle.is_finished()))
            .unwrap_or(false)
    }

    /// Fetch and apply one snapshot now.
    pub async fn refresh_once(&self) -> ApplyOutcome {
        self.shared.refresh().await
    }

    /// Whether any refresh is currently waiting on the feed.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Change the query used by subsequent refreshes.
    pub fn set_query(&self, query: FeedQuery) {
        if let Ok(mut q) = self.shared.query.write() {
            *q = query;
        }
    }

    #[must_use]
    pub fn query(&self) -> FeedQuery {
        self.shared.query.read().map(|q| *q).unwrap_or_default()
    }

    #[must_use]
    pub fn controller(&self) -> Arc<RwLock<SnapshotController>> {
        Arc::clone(&self.shared.controller)
    }

    /// Subscribe to refresh events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.shared.event_tx.subscribe()
    }
}

impl<S> Drop for Poller<S> {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some((cancel_token, _)) = task.take() {
                cancel_token.cancel();
            }
        }
    }
}

async fn poll_loop<S: FeedSource>(
    shared: Arc<Shared<S>>,
    interval: Option<Duration>,
    cancel_token: CancellationToken,
) {
    let Some(period) = interval else {
        tokio::select! {
            _ = shared.refresh() => {}
            () = cancel_token.cancelled() => {}
        }
        return;
    };

    info!("Polling feed every {} seconds", period.as_secs_f32());
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = cancel_token.cancelled() => {
                info!("Polling stopped");
                return;
            }
        }

        tokio::select! {
            _ = shared.refresh() => {}
            () = cancel_token.cancelled() => {
                info!("Polling stopped during refresh");
                return;
            }
        }
    }
}
