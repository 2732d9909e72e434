//! `firewatch-model` – The Predictive Override
//!
//! Binary risk classification over the `[temp, humidity, gas]` feature
//! vector. The rest of the system only sees the [`RiskClassifier`] trait;
//! the shipped implementation is [`ForestClassifier`][forest::ForestClassifier],
//! a random forest evaluated over trees exported as JSON arrays, with a
//! [`StandardScaler`][scaler::StandardScaler] applied first.
//!
//! Training and model selection are out of scope — only inference lives
//! here. Artifact loading is strict: a missing or malformed artifact is a
//! startup-fatal [`ModelError`], never a silent fallback.
//!
//! # Modules
//!
//! - [`scaler`] – [`StandardScaler`][scaler::StandardScaler]: `(x - mean) / scale`
//!   feature normalization.
//! - [`forest`] – [`ForestClassifier`][forest::ForestClassifier]: majority
//!   vote over sklearn-style flattened decision trees.

use thiserror::Error;

pub mod forest;
pub mod scaler;

pub use forest::ForestClassifier;
pub use scaler::StandardScaler;

/// Width of the feature vector: temp, humidity, gas — in that order.
pub const FEATURE_COUNT: usize = 3;

/// Errors that can arise from model loading or inference.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The artifact file could not be read.
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The artifact file is not valid JSON for its expected shape.
    #[error("malformed model artifact {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// The artifact parsed but its contents are internally inconsistent.
    #[error("inconsistent model artifact: {0}")]
    Inconsistent(String),
    /// The caller supplied a feature vector of the wrong width.
    #[error("feature vector mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },
}

/// Outcome of a binary risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLabel {
    /// Class 0 — no predicted hazard.
    Nominal,
    /// Class 1 — predicted hazard; forces critical escalation upstream.
    Risk,
}

/// The external classifier contract consumed by the evaluator.
///
/// Implementations receive the ordered `[temp, humidity, gas]` vector and
/// return a binary label. Scaling, if any, is the implementation's concern.
pub trait RiskClassifier: Send + Sync {
    fn classify(&self, features: [f64; FEATURE_COUNT]) -> Result<RiskLabel, ModelError>;
}
