//! Snapshot parsing.
//!
//! The store's root fetch returns one JSON object per location. Inside a
//! location, the `"configuration"` key holds the escalation policy and
//! every `room*` key holds one room's raw readings; anything else
//! (`"alarm"`, bookkeeping fields) is ignored. Parsing is pure and
//! lossy-by-design: malformed entries are skipped with a warning, never
//! fatal, and the raw value is left untouched — re-parsing the same tree
//! yields the same snapshot.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use firewatch_types::{LocationConfig, RoomData, SensorKind, SensorValue, ThresholdBand};
use serde_json::Value;
use tracing::{debug, warn};

/// Prefix identifying room entries inside a location ("room1", "roomA", …).
pub const ROOM_KEY_PREFIX: &str = "room";

/// `true` when a location entry names a room.
pub fn is_room_key(key: &str) -> bool {
    key.starts_with(ROOM_KEY_PREFIX)
}

/// The full store tree for one polling cycle.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub locations: BTreeMap<String, LocationSnapshot>,
}

impl StoreSnapshot {
    /// Stamp a freshly parsed location map with the current time.
    pub fn new(locations: BTreeMap<String, LocationSnapshot>) -> Self {
        Self {
            fetched_at: Utc::now(),
            locations,
        }
    }
}

/// One location's configuration and rooms.
#[derive(Debug, Clone)]
pub struct LocationSnapshot {
    /// `None` when the location has no `"configuration"` entry at all —
    /// the evaluator skips such locations for the cycle.
    pub config: Option<LocationConfig>,
    pub rooms: BTreeMap<String, RoomData>,
}

/// Parse the root fetch payload into per-location snapshots.
///
/// Non-object location values are skipped with a warning.
pub fn parse_snapshot(raw: &Value) -> BTreeMap<String, LocationSnapshot> {
    let Some(locations) = raw.as_object() else {
        warn!("store root is not an object; treating as empty");
        return BTreeMap::new();
    };

    locations
        .iter()
        .filter_map(|(location, value)| {
            if !value.is_object() {
                warn!(location = %location, "location entry is not an object; skipping");
                return None;
            }
            Some((location.clone(), parse_location(value)))
        })
        .collect()
}

/// Parse one location object: optional configuration plus its rooms.
pub fn parse_location(raw: &Value) -> LocationSnapshot {
    let config = raw.get("configuration").map(parse_config);

    let mut rooms = BTreeMap::new();
    if let Some(entries) = raw.as_object() {
        for (key, value) in entries {
            if !is_room_key(key) {
                continue;
            }
            match value.as_object() {
                Some(_) => {
                    rooms.insert(key.clone(), parse_room(value));
                }
                None => warn!(room = %key, "room entry is not an object; skipping"),
            }
        }
    }

    LocationSnapshot { config, rooms }
}

/// Parse one room object into raw readings.
///
/// Non-scalar entries (nested objects, arrays, nulls) are dropped; they
/// cannot be sensor readings.
fn parse_room(raw: &Value) -> RoomData {
    let mut room = RoomData::new();
    if let Some(entries) = raw.as_object() {
        for (key, value) in entries {
            match serde_json::from_value::<SensorValue>(value.clone()) {
                Ok(reading) => {
                    room.insert(key.clone(), reading);
                }
                Err(_) => debug!(sensor = %key, "non-scalar room entry; ignoring"),
            }
        }
    }
    room
}

/// Parse a location's `"configuration"` value.
///
/// This is the configuration ingress point: keys are normalized through
/// [`SensorKind::from_str`] (which folds the legacy `"temperature"` alias
/// into `temp`), band edges and ranks are coerced through
/// [`SensorValue::as_f64`], and unusable entries are skipped with a
/// warning. A thresholds/priorities block that is absent stays `None` so
/// the voter can fail closed.
pub fn parse_config(raw: &Value) -> LocationConfig {
    let thresholds = raw.get("thresholds").map(parse_thresholds);
    let priorities = raw.get("priorities").map(parse_priorities);
    LocationConfig::new(thresholds, priorities)
}

fn parse_thresholds(raw: &Value) -> BTreeMap<SensorKind, ThresholdBand> {
    let mut bands = BTreeMap::new();
    let Some(entries) = raw.as_object() else {
        warn!("thresholds block is not an object");
        return bands;
    };

    for (key, value) in entries {
        let Ok(kind) = SensorKind::from_str(key) else {
            debug!(key = %key, "unknown threshold key; skipping");
            continue;
        };
        let (Some(medium), Some(maximum)) = (
            value.get("medium").and_then(coerce_number),
            value.get("maximum").and_then(coerce_number),
        ) else {
            warn!(factor = %kind, "threshold band missing or non-numeric; skipping");
            continue;
        };
        bands.insert(kind, ThresholdBand { medium, maximum });
    }
    bands
}

fn parse_priorities(raw: &Value) -> BTreeMap<SensorKind, f64> {
    let mut ranks = BTreeMap::new();
    let Some(entries) = raw.as_object() else {
        warn!("priorities block is not an object");
        return ranks;
    };

    for (key, value) in entries {
        let Ok(kind) = SensorKind::from_str(key) else {
            debug!(key = %key, "unknown priority key; skipping");
            continue;
        };
        match coerce_number(value) {
            Some(rank) => {
                ranks.insert(kind, rank);
            }
            None => warn!(factor = %kind, "priority rank is not numeric; skipping"),
        }
    }
    ranks
}

/// Coerce a JSON scalar to a float through the reading rules (numbers,
/// numeric strings, booleans).
fn coerce_number(value: &Value) -> Option<f64> {
    serde_json::from_value::<SensorValue>(value.clone())
        .ok()
        .and_then(|v| v.as_f64())
}
