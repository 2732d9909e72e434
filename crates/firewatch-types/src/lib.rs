use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical sensor families a room can report.
///
/// Remote configurations may still use the legacy key `"temperature"`;
/// [`SensorKind::from_str`] accepts it as an alias for [`SensorKind::Temp`].
/// That alias handling is the single normalization point in the system —
/// configuration snapshots are never rewritten after ingress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temp,
    Humidity,
    Gas,
}

impl SensorKind {
    /// All non-fire kinds, in feature-vector order: temp, humidity, gas.
    pub const ALL: [SensorKind; 3] = [SensorKind::Temp, SensorKind::Humidity, SensorKind::Gas];

    /// Canonical key prefix used by sensor ids in room data ("temp1", "gas2", …).
    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Temp => "temp",
            SensorKind::Humidity => "humidity",
            SensorKind::Gas => "gas",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a configuration key names no known sensor kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sensor kind: {0}")]
pub struct UnknownSensorKind(pub String);

impl FromStr for SensorKind {
    type Err = UnknownSensorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temp" | "temperature" => Ok(SensorKind::Temp),
            "humidity" => Ok(SensorKind::Humidity),
            "gas" => Ok(SensorKind::Gas),
            other => Err(UnknownSensorKind(other.to_string())),
        }
    }
}

/// A raw reading as stored remotely: devices write plain numbers, numeric
/// strings, or (for fire contacts) booleans, depending on firmware version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl SensorValue {
    /// Coerce the reading to a float, if it represents one.
    ///
    /// `Text` must parse as a decimal number; `Flag` maps to 1.0/0.0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SensorValue::Number(n) => Some(*n),
            SensorValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            SensorValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Whether this reading is a positive fire signal.
    ///
    /// Fire contacts report the literal string `"1"`; integral numeric `1`
    /// is accepted as the same signal. Anything else — including boolean
    /// `true` — is treated as no signal.
    pub fn is_fire_positive(&self) -> bool {
        match self {
            SensorValue::Text(s) => s == "1",
            SensorValue::Number(n) => *n == 1.0,
            SensorValue::Flag(_) => false,
        }
    }
}

/// One room's raw readings for a single polling cycle, keyed by sensor id
/// (e.g. `"temp1"`, `"fire2"`).
pub type RoomData = BTreeMap<String, SensorValue>;

/// A room's readings after aggregation: at most one value per kind (the
/// arithmetic mean of that kind's sensors), plus the collapsed fire signal.
///
/// `fire` is `true` only when at least one fire sensor reported `"1"`;
/// rooms without fire sensors and rooms whose fire sensors all read `"0"`
/// are indistinguishable here, which is exactly what downstream consumers
/// require.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessedRoomData {
    pub factors: BTreeMap<SensorKind, f64>,
    pub fire: bool,
}

impl ProcessedRoomData {
    /// The ordered `[temp, humidity, gas]` feature vector, available only
    /// when all three kinds were reported.
    pub fn feature_vector(&self) -> Option<[f64; 3]> {
        Some([
            *self.factors.get(&SensorKind::Temp)?,
            *self.factors.get(&SensorKind::Humidity)?,
            *self.factors.get(&SensorKind::Gas)?,
        ])
    }
}

/// Per-kind escalation thresholds. `medium` opens the elevated band,
/// `maximum` the critical band; `medium < maximum` is expected but not
/// enforced — classification follows the comparison chain either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub medium: f64,
    pub maximum: f64,
}

/// A location's escalation policy, immutable for one evaluation pass.
///
/// Either block may be absent from the remote configuration; the voter
/// fails closed to [`HazardLevel::Normal`] in that case. Priority ranks are
/// ordinal: the numerically lowest rank wins a tie-break.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationConfig {
    thresholds: Option<BTreeMap<SensorKind, ThresholdBand>>,
    priorities: Option<BTreeMap<SensorKind, f64>>,
}

impl LocationConfig {
    pub fn new(
        thresholds: Option<BTreeMap<SensorKind, ThresholdBand>>,
        priorities: Option<BTreeMap<SensorKind, f64>>,
    ) -> Self {
        Self {
            thresholds,
            priorities,
        }
    }

    pub fn thresholds(&self) -> Option<&BTreeMap<SensorKind, ThresholdBand>> {
        self.thresholds.as_ref()
    }

    pub fn priorities(&self) -> Option<&BTreeMap<SensorKind, f64>> {
        self.priorities.as_ref()
    }
}

/// Discrete hazard level for a room. Totally ordered; `Critical` wins any
/// comparison and forces the location alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardLevel {
    Normal = 1,
    Elevated = 2,
    Critical = 3,
}

impl HazardLevel {
    /// Numeric code persisted to the remote store (1, 2 or 3).
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HazardLevel::Normal => f.write_str("normal"),
            HazardLevel::Elevated => f.write_str("elevated"),
            HazardLevel::Critical => f.write_str("critical"),
        }
    }
}

impl TryFrom<u8> for HazardLevel {
    type Error = FirewatchError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(HazardLevel::Normal),
            2 => Ok(HazardLevel::Elevated),
            3 => Ok(HazardLevel::Critical),
            other => Err(FirewatchError::Level(other)),
        }
    }
}

/// One room's evaluated level for a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomResult {
    pub room: String,
    pub level: HazardLevel,
}

/// A location's evaluated rooms and the derived alarm flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationResult {
    pub location: String,
    pub alarm: bool,
    pub rooms: Vec<RoomResult>,
}

impl LocationResult {
    /// Build a result from evaluated rooms; the alarm raises iff any room
    /// reached [`HazardLevel::Critical`].
    pub fn new(location: impl Into<String>, rooms: Vec<RoomResult>) -> Self {
        let alarm = rooms.iter().any(|r| r.level == HazardLevel::Critical);
        Self {
            location: location.into(),
            alarm,
            rooms,
        }
    }
}

/// Faults shared across crate boundaries.
#[derive(Error, Debug)]
pub enum FirewatchError {
    #[error("invalid hazard level code: {0}")]
    Level(u8),

    #[error("status endpoint error: {0}")]
    Status(String),
}
