//! REST client for the remote realtime database.
//!
//! The store speaks a Firebase-RTDB-style dialect: the whole tree is read
//! with one `GET {base}/.json`, and partial updates go through `PATCH` on
//! the node's `.json` path. Writes carry no transactional guarantee — a
//! failed room write does not roll back earlier ones in the same cycle.

use async_trait::async_trait;
use firewatch_types::HazardLevel;
use serde_json::Value;
use tracing::debug;

use crate::snapshot::{StoreSnapshot, parse_snapshot};
use crate::{RemoteStore, StoreError};

/// Reqwest-backed [`RemoteStore`] implementation.
///
/// Construct once and reuse across polling cycles; the inner
/// [`reqwest::Client`] pools connections.
///
/// # Example
///
/// ```rust,no_run
/// use firewatch_store::RtdbClient;
///
/// let client = RtdbClient::new("https://monitoring.example.firebaseio.com");
/// // client.fetch_snapshot().await? inside the collector loop.
/// ```
pub struct RtdbClient {
    base_url: String,
    client: reqwest::Client,
}

impl RtdbClient {
    /// Create a client for the store rooted at `base_url` (trailing slash
    /// optional).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn root_url(&self) -> String {
        format!("{}/.json", self.base_url)
    }

    fn location_url(&self, location: &str) -> String {
        format!("{}/{location}.json", self.base_url)
    }

    fn room_url(&self, location: &str, room: &str) -> String {
        format!("{}/{location}/{room}.json", self.base_url)
    }

    async fn patch(&self, url: &str, body: &Value) -> Result<(), StoreError> {
        debug!(url = %url, body = %body, "store patch");
        self.client
            .patch(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for RtdbClient {
    async fn fetch_snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let raw: Value = self
            .client
            .get(self.root_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // An empty database answers `null`; nothing to monitor is a
        // condition the collector should log, not an empty success.
        if raw.is_null() {
            return Err(StoreError::BadResponse(
                "store returned no data".to_string(),
            ));
        }

        Ok(StoreSnapshot::new(parse_snapshot(&raw)))
    }

    async fn write_room_level(
        &self,
        location: &str,
        room: &str,
        level: HazardLevel,
    ) -> Result<(), StoreError> {
        let body = serde_json::json!({ "level": level.as_u8() });
        self.patch(&self.room_url(location, room), &body).await
    }

    async fn write_location_alarm(&self, location: &str, alarm: bool) -> Result<(), StoreError> {
        let body = serde_json::json!({ "alarm": alarm_flag(alarm) });
        self.patch(&self.location_url(location), &body).await
    }
}

/// The store schema keeps the alarm as a string digit, not a boolean.
fn alarm_flag(alarm: bool) -> &'static str {
    if alarm { "1" } else { "0" }
}
