//! The polling collector loop.
//!
//! One tick = fetch the full store snapshot, evaluate every location,
//! write room levels and location alarms back, then sleep. Ticks never
//! overlap: the next fetch only starts after the previous pass fully
//! completed, so each tick owns its snapshot and no locking is needed.
//!
//! The loop is best-effort. A failed fetch skips the tick; a failed write
//! is logged and the pass moves on (no rollback of earlier writes, no
//! retry within the tick).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use firewatch_model::RiskClassifier;
use firewatch_store::{RemoteStore, StoreError};
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::evaluator::evaluate_location;

/// Default seconds between polling cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// What one completed cycle touched. Returned by [`Collector::tick`] for
/// logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched_at: DateTime<Utc>,
    /// Locations that had a configuration and were evaluated.
    pub locations: usize,
    /// Rooms evaluated across all locations.
    pub rooms: usize,
    /// Locations whose alarm flag was raised this cycle.
    pub alarms: usize,
}

/// The fetch–evaluate–write orchestrator.
///
/// Owns handles to the remote store and the risk model; call
/// [`Collector::run`] to poll until the shutdown flag flips, or
/// [`Collector::tick`] to drive a single pass (tests, one-shot tools).
pub struct Collector {
    store: Arc<dyn RemoteStore>,
    classifier: Arc<dyn RiskClassifier>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Collector {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        classifier: Arc<dyn RiskClassifier>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            classifier,
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use an externally owned shutdown flag (builder-style).
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Poll until the shutdown flag is set.
    ///
    /// Each cycle runs under a tracing span carrying a fresh cycle id so
    /// every room/location log line of one pass correlates.
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "collector started");

        while !self.shutdown.load(Ordering::SeqCst) {
            let cycle_id = Uuid::new_v4();
            let span = tracing::info_span!("cycle", %cycle_id);

            match self.tick().instrument(span).await {
                Ok(report) => info!(
                    locations = report.locations,
                    rooms = report.rooms,
                    alarms = report.alarms,
                    "cycle complete"
                ),
                Err(e) => error!(error = %e, "cycle failed; waiting for next tick"),
            }

            tokio::time::sleep(self.interval).await;
        }

        info!("collector stopped");
    }

    /// Run one fetch–evaluate–write pass.
    ///
    /// # Errors
    ///
    /// Only the snapshot fetch is fatal to a tick. Everything downstream —
    /// a location without configuration, a failed room or alarm write — is
    /// logged and skipped without aborting the pass.
    pub async fn tick(&self) -> Result<CycleReport, StoreError> {
        info!("checking sensors");
        let snapshot = self.store.fetch_snapshot().await?;

        let mut report = CycleReport {
            fetched_at: snapshot.fetched_at,
            locations: 0,
            rooms: 0,
            alarms: 0,
        };

        for (location, location_snapshot) in &snapshot.locations {
            let Some(result) =
                evaluate_location(location, location_snapshot, self.classifier.as_ref())
            else {
                continue;
            };
            report.locations += 1;

            for room_result in &result.rooms {
                report.rooms += 1;
                match self
                    .store
                    .write_room_level(location, &room_result.room, room_result.level)
                    .await
                {
                    Ok(()) => info!(
                        location,
                        room = %room_result.room,
                        level = %room_result.level,
                        "room level written"
                    ),
                    Err(e) => error!(
                        location,
                        room = %room_result.room,
                        error = %e,
                        "failed to write room level"
                    ),
                }
            }

            if result.alarm {
                report.alarms += 1;
            }
            match self.store.write_location_alarm(location, result.alarm).await {
                Ok(()) => info!(location, alarm = result.alarm, "location alarm written"),
                Err(e) => error!(location, error = %e, "failed to write location alarm"),
            }
        }

        Ok(report)
    }
}
