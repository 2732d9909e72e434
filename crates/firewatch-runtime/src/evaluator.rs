//! Room and location evaluation.
//!
//! Per room, the decision order is strict:
//!
//! 1. Aggregate raw readings ([`firewatch_engine::aggregate`]).
//! 2. Fire short-circuit — a positive fire signal is critical, full stop;
//!    neither the model nor the voter is consulted.
//! 3. With the full `[temp, humidity, gas]` triad, ask the predictive
//!    model; a risk verdict forces critical, a nominal verdict falls
//!    through to the escalation vote.
//! 4. Otherwise vote on whatever factor subset exists (possibly empty —
//!    the voter's defaults handle that).
//!
//! Evaluation is pure given a snapshot, a config and a classifier:
//! re-running on the same inputs yields identical results. There is no
//! "no verdict" state to guard against — [`HazardLevel`] has no zero, and
//! the vote always produces at least `Normal`.

use firewatch_engine::{aggregate, vote};
use firewatch_model::{RiskClassifier, RiskLabel};
use firewatch_store::LocationSnapshot;
use firewatch_types::{HazardLevel, LocationConfig, LocationResult, RoomData, RoomResult};
use tracing::{error, info, warn};

/// Decide one room's hazard level.
pub fn evaluate_room(
    data: &RoomData,
    config: &LocationConfig,
    classifier: &dyn RiskClassifier,
) -> HazardLevel {
    let processed = aggregate(data);

    if processed.fire {
        warn!("fire signal present; room is critical");
        return HazardLevel::Critical;
    }

    if let Some(features) = processed.feature_vector() {
        match classifier.classify(features) {
            Ok(RiskLabel::Risk) => {
                warn!("predictive model flagged risk; room is critical");
                return HazardLevel::Critical;
            }
            Ok(RiskLabel::Nominal) => {}
            // A sick model must not take the thresholds down with it; the
            // vote still has three healthy factors to work from.
            Err(e) => {
                error!(error = %e, "predictive classification failed; falling back to vote")
            }
        }
    }

    vote(&processed.factors, config)
}

/// Evaluate every room of a location and roll the levels up into the
/// alarm flag.
///
/// Returns `None` when the location carries no configuration — it is
/// skipped for this cycle (logged, not fatal), and nothing is written
/// back for it.
pub fn evaluate_location(
    location: &str,
    snapshot: &LocationSnapshot,
    classifier: &dyn RiskClassifier,
) -> Option<LocationResult> {
    let Some(config) = &snapshot.config else {
        error!(location, "no configuration for location; skipping");
        return None;
    };

    let rooms: Vec<RoomResult> = snapshot
        .rooms
        .iter()
        .map(|(room, data)| {
            let level = evaluate_room(data, config, classifier);
            info!(location, room = %room, level = %level, "room evaluated");
            RoomResult {
                room: room.clone(),
                level,
            }
        })
        .collect();

    Some(LocationResult::new(location, rooms))
}
