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

//! HTTP flight proxy client.
//!
//! Request format:
//! ```text
//! GET <base_url>/api/flights?lat=<lat>&lon=<lon>&radiusDeg=<radius>
//! ```
//!
//! A successful response is `{ "flights": [...] }`. Failures come back with a
//! non-success status and `{ "error": "<message>" }`.

use std::time::Duration;

use log::debug;
use serde::Deserialize;

use super::{FeedError, FeedQuery, FeedSource, Snapshot};

const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

/// Configuration for the HTTP feed client.
#[derive(Debug, Clone)]
pub struct HttpFeedConfig {
    /// Base URL of the flight proxy, without the `/api/flights` path.
    pub base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for HttpFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Some(Duration::from_secs(15)),
        }
    }
}

/// Flight feed backed by the local HTTP proxy.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeed {
    pub fn new(config: HttpFeedConfig) -> Result<Self, FeedError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of the snapshot endpoint for a query.
    #[must_use]
    pub fn snapshot_url(&self, query: &FeedQuery) -> String {
        format!(
            "{}/api/flights?lat={}&lon={}&radiusDeg={}",
            self.base_url, query.center_lat, query.center_lon, query.radius_deg
        )
    }
}

impl FeedSource for HttpFeed {
    async fn fetch(&self, query: &FeedQuery) -> Result<Snapshot, FeedError> {
        let url = self.snapshot_url(query);
        debug!("Fetching snapshot from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        decode_response(status.as_u16(), &body)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Turn a raw status code and body into a snapshot or a feed error.
///
/// Non-success statuses use the body's `error` message when one can be
/// extracted, falling back to a generic message.
pub fn decode_response(status: u16, body: &[u8]) -> Result<Snapshot, FeedError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        return Err(FeedError::Status { status, message });
    }

    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_url() {
        let feed = HttpFeed::new(HttpFeedConfig {
            base_url: "http://localhost:8000/".to_string(),
            timeout: None,
        })
        .unwrap();
        let url = feed.snapshot_url(&FeedQuery {
            center_lat: 26.5,
            center_lon: -80.25,
            radius_deg: 0.5,
        });
        assert_eq!(url, "http://localhost:8000/api/flights?lat=26.5&lon=-80.25&radiusDeg=0.5");
    }

    #[test]
    fn test_decode_success() {
        let body = br#"{"flights":[{"icao24":"abc123","latitude":10.0,"longitude":20.0}]}"#;
        let snapshot = decode_response(200, body).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.flights[0].position(), Some((10.0, 20.0)));
    }

    #[test]
    fn test_decode_error_payload() {
        let err = decode_response(502, br#"{"error":"upstream unavailable"}"#).unwrap_err();
        assert!(matches!(
            &err,
            FeedError::Status { status: 502, message } if message == "upstream unavailable"
        ));
        assert_eq!(err.to_string(), "upstream unavailable (HTTP 502)");
    }

    #[test]
    fn test_decode_error_without_message() {
        let err = decode_response(500, b"<html>oops</html>").unwrap_err();
        assert!(matches!(
            err,
            FeedError::Status { status: 500, ref message } if message == "Request failed"
        ));
    }

    #[test]
    fn test_decode_garbage_body() {
        let err = decode_response(200, b"not json").unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
    }
}
