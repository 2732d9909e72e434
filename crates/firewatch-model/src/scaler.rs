//! Feature scaling.
//!
//! The forest was trained on standardized features; raw room means must
//! pass through the same `(x - mean) / scale` transform before inference.
//! The scaler artifact carries the per-feature means and scales captured
//! at training time.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Per-feature standardization parameters.
///
/// # Example
///
/// ```rust
/// use firewatch_model::StandardScaler;
///
/// let scaler = StandardScaler {
///     mean: vec![20.0, 50.0, 2.0],
///     scale: vec![5.0, 10.0, 1.0],
/// };
/// let scaled = scaler.transform(&[25.0, 40.0, 2.0]).unwrap();
/// assert_eq!(scaled, vec![1.0, -1.0, 0.0]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Validate internal consistency against the expected feature width.
    pub(crate) fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(ModelError::Inconsistent(format!(
                "scaler covers {} means / {} scales, model expects {n_features} features",
                self.mean.len(),
                self.scale.len(),
            )));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ModelError::Inconsistent(
                "scaler contains a zero or non-finite scale".to_string(),
            ));
        }
        Ok(())
    }

    /// Standardize `features`: `(x - mean) / scale`, element-wise.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.mean.len() {
            return Err(ModelError::FeatureMismatch {
                expected: self.mean.len(),
                got: features.len(),
            });
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
