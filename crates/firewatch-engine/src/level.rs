//! Threshold banding.
//!
//! Maps one aggregated sensor value to a [`HazardLevel`] through a
//! `(medium, maximum)` band. Boundaries are half-open on the lower side:
//! reaching `medium` enters the elevated band, reaching `maximum` enters
//! the critical band.

use firewatch_types::{HazardLevel, ThresholdBand};

/// Classify `value` against `band`.
///
/// `value < medium` → Normal; `medium ≤ value < maximum` → Elevated;
/// `value ≥ maximum` → Critical. There is no clamping: negative and
/// extreme values follow the same comparison chain, and a non-comparable
/// value (NaN) falls through both comparisons into the critical arm.
pub fn classify(value: f64, band: &ThresholdBand) -> HazardLevel {
    if value < band.medium {
        HazardLevel::Normal
    } else if value < band.maximum {
        HazardLevel::Elevated
    } else {
        HazardLevel::Critical
    }
}
