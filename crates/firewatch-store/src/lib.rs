//! `firewatch-store` – The Remote Store Boundary
//!
//! Firewatch never owns sensor state; a remote realtime database does. This
//! crate is the only place that knows the store's REST dialect. Everything
//! else consumes the [`RemoteStore`] trait, which also makes the collector
//! testable against an in-memory mock.
//!
//! # Modules
//!
//! - [`client`] – [`RtdbClient`][client::RtdbClient]: reqwest-backed
//!   implementation speaking the Firebase-RTDB-style REST dialect
//!   (`GET {base}/.json`, `PATCH {base}/{location}/{room}.json`).
//! - [`snapshot`] – pure parsing of one fetched JSON tree into typed
//!   [`StoreSnapshot`][snapshot::StoreSnapshot] values.

use async_trait::async_trait;
use firewatch_types::HazardLevel;
use thiserror::Error;

pub mod client;
pub mod snapshot;

pub use client::RtdbClient;
pub use snapshot::{LocationSnapshot, StoreSnapshot};

/// Errors that can arise from remote store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The HTTP request failed or the store answered non-2xx.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The store answered 2xx but the payload is unusable.
    #[error("unexpected response from store: {0}")]
    BadResponse(String),
}

/// Reader/writer contract against the remote store.
///
/// All three operations are fire-and-forget from the collector's point of
/// view: outcomes are logged, never retried within a cycle.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the full tree: every location with its configuration and rooms.
    async fn fetch_snapshot(&self) -> Result<StoreSnapshot, StoreError>;

    /// Persist one room's evaluated hazard level.
    async fn write_room_level(
        &self,
        location: &str,
        room: &str,
        level: HazardLevel,
    ) -> Result<(), StoreError>;

    /// Persist one location's alarm flag (stored as `"1"` / `"0"`).
    async fn write_location_alarm(&self, location: &str, alarm: bool) -> Result<(), StoreError>;
}
