//! Sensor aggregation.
//!
//! A room reports several physical sensors per kind ("temp1", "temp2", …).
//! [`aggregate`] collapses them into one representative value per
//! [`SensorKind`] — the arithmetic mean of every reading that coerces to a
//! number — and folds all fire contacts into a single boolean.
//!
//! Readings that fail coercion are dropped individually; a kind with no
//! usable readings is simply absent from the output, never zero.
//!
//! # Example
//!
//! ```rust
//! use firewatch_engine::aggregate;
//! use firewatch_types::{RoomData, SensorKind, SensorValue};
//!
//! let mut room = RoomData::new();
//! room.insert("temp1".into(), SensorValue::Number(20.0));
//! room.insert("temp2".into(), SensorValue::Number(30.0));
//!
//! let processed = aggregate(&room);
//! assert_eq!(processed.factors.get(&SensorKind::Temp), Some(&25.0));
//! assert!(!processed.fire);
//! ```

use firewatch_types::{ProcessedRoomData, RoomData, SensorKind};
use tracing::warn;

/// Key prefix shared by all fire contacts ("fire1", "fire2", …).
const FIRE_PREFIX: &str = "fire";

/// Collapse one room's raw readings into [`ProcessedRoomData`].
pub fn aggregate(room: &RoomData) -> ProcessedRoomData {
    let mut processed = ProcessedRoomData::default();

    for kind in SensorKind::ALL {
        if let Some(mean) = mean_for_kind(room, kind) {
            processed.factors.insert(kind, mean);
        }
    }
    processed.fire = fire_detected(room);

    processed
}

/// A sensor id belongs to `prefix` when it is exactly the prefix followed
/// by one or more digits: "temp2" matches "temp", "temp" and "tempX" do not.
fn is_indexed_key(key: &str, prefix: &str) -> bool {
    key.strip_prefix(prefix)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Mean of every coercible reading of `kind`, or `None` when the room has
/// no usable sensors of that kind.
fn mean_for_kind(room: &RoomData, kind: SensorKind) -> Option<f64> {
    let mut values = Vec::new();
    for (key, value) in room {
        if !is_indexed_key(key, kind.name()) {
            continue;
        }
        match value.as_f64() {
            Some(v) => values.push(v),
            None => warn!(sensor = %key, value = ?value, "unreadable sensor value; dropping"),
        }
    }

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// `true` when any fire contact in the room reports the positive signal.
///
/// Negative readings are not forwarded: a room whose fire contacts all
/// read "0" looks identical to a room without fire contacts.
fn fire_detected(room: &RoomData) -> bool {
    for (key, value) in room {
        if is_indexed_key(key, FIRE_PREFIX) && value.is_fire_positive() {
            warn!(sensor = %key, "fire reported");
            return true;
        }
    }
    false
}
