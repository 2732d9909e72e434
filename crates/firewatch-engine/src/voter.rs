//! Escalation voting.
//!
//! Combines the per-kind levels of one room into a single verdict:
//!
//! 1. A missing thresholds or priorities block fails closed to
//!    [`HazardLevel::Normal`].
//! 2. Every factor with a configured band is classified via
//!    [`classify`][crate::level::classify].
//! 3. Any critical factor ends the vote immediately — one critical sensor
//!    overrides majority sentiment.
//! 4. With two or more factor levels the statistical mode decides; a modal
//!    tie defers to the factor with the numerically lowest priority rank.
//! 5. A single factor level passes through unchanged; no usable factors
//!    default to Normal.
//!
//! The mode/tie decision is an explicit two-step total function
//! ([`Majority`]) rather than an exception-driven branch.

use std::collections::BTreeMap;

use firewatch_types::{HazardLevel, LocationConfig, SensorKind};
use tracing::{debug, info, warn};

use crate::level::classify;

/// Outcome of the mode computation over two or more factor levels.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Majority {
    /// Exactly one level occurs most often.
    Unique(HazardLevel),
    /// Two or more levels share the highest count, in ascending order.
    Tied(Vec<HazardLevel>),
}

/// Decide one room's hazard level from its aggregated factors.
pub fn vote(factors: &BTreeMap<SensorKind, f64>, config: &LocationConfig) -> HazardLevel {
    let (Some(thresholds), Some(priorities)) = (config.thresholds(), config.priorities()) else {
        warn!("location configuration missing thresholds or priorities; failing closed");
        return HazardLevel::Normal;
    };

    let mut factor_levels: BTreeMap<SensorKind, HazardLevel> = BTreeMap::new();
    for (kind, value) in factors {
        // Factors without a configured band do not take part in the vote.
        let Some(band) = thresholds.get(kind) else {
            debug!(factor = %kind, "no threshold band configured; skipping factor");
            continue;
        };
        let level = classify(*value, band);
        debug!(factor = %kind, value, level = %level, "factor classified");
        factor_levels.insert(*kind, level);
    }

    if factor_levels.values().any(|l| *l == HazardLevel::Critical) {
        warn!("critical factor level; immediate escalation");
        return HazardLevel::Critical;
    }

    match factor_levels.len() {
        0 => {
            warn!("no valid sensor data; defaulting to normal");
            HazardLevel::Normal
        }
        1 => factor_levels
            .values()
            .next()
            .copied()
            .unwrap_or(HazardLevel::Normal),
        _ => {
            let levels: Vec<HazardLevel> = factor_levels.values().copied().collect();
            match majority(&levels) {
                Majority::Unique(level) => {
                    info!(level = %level, "majority level determined");
                    level
                }
                Majority::Tied(tied) => tie_break(&factor_levels, priorities, &tied),
            }
        }
    }
}

/// Compute the statistical mode of `levels`.
fn majority(levels: &[HazardLevel]) -> Majority {
    let mut counts: BTreeMap<HazardLevel, usize> = BTreeMap::new();
    for level in levels {
        *counts.entry(*level).or_default() += 1;
    }

    let best = counts.values().copied().max().unwrap_or(0);
    let modal: Vec<HazardLevel> = counts
        .iter()
        .filter(|(_, count)| **count == best)
        .map(|(level, _)| *level)
        .collect();

    if let [single] = modal.as_slice() {
        Majority::Unique(*single)
    } else {
        Majority::Tied(modal)
    }
}

/// Resolve a modal tie by sensor priority.
///
/// Candidates are every leveled factor that has a priority entry; the
/// numerically lowest rank wins (rank ties break on kind order for
/// determinism). When no leveled factor carries a priority, the lowest
/// tied level is returned.
fn tie_break(
    factor_levels: &BTreeMap<SensorKind, HazardLevel>,
    priorities: &BTreeMap<SensorKind, f64>,
    tied: &[HazardLevel],
) -> HazardLevel {
    let winner = factor_levels
        .iter()
        .filter_map(|(kind, level)| priorities.get(kind).map(|rank| (*rank, *kind, *level)))
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    match winner {
        Some((_, kind, level)) => {
            info!(factor = %kind, level = %level, "no unique mode; deferring to highest-priority factor");
            level
        }
        None => {
            let fallback = tied.iter().copied().min().unwrap_or(HazardLevel::Normal);
            warn!(level = %fallback, "modal tie with no prioritized factor; taking lowest tied level");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firewatch_types::ThresholdBand;

    fn band(medium: f64, maximum: f64) -> ThresholdBand {
        ThresholdBand { medium, maximum }
    }

    /// Thresholds where a value of 1.0 → Normal, 2.0 → Elevated, 3.0 → Critical.
    fn unit_thresholds() -> BTreeMap<SensorKind, ThresholdBand> {
        SensorKind::ALL
            .into_iter()
            .map(|kind| (kind, band(2.0, 3.0)))
            .collect()
    }

    fn config_with(priorities: &[(SensorKind, f64)]) -> LocationConfig {
        LocationConfig::new(
            Some(unit_thresholds()),
            Some(priorities.iter().copied().collect()),
        )
    }

    fn factors(entries: &[(SensorKind, f64)]) -> BTreeMap<SensorKind, f64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn missing_thresholds_fails_closed() {
        let config = LocationConfig::new(None, Some(BTreeMap::new()));
        let input = factors(&[(SensorKind::Temp, 3.0)]);
        assert_eq!(vote(&input, &config), HazardLevel::Normal);
    }

    #[test]
    fn missing_priorities_fails_closed() {
        let config = LocationConfig::new(Some(unit_thresholds()), None);
        let input = factors(&[(SensorKind::Temp, 3.0)]);
        assert_eq!(vote(&input, &config), HazardLevel::Normal);
    }

    #[test]
    fn any_critical_factor_escalates_immediately() {
        let config = config_with(&[]);
        // Two normals cannot outvote one critical.
        let input = factors(&[
            (SensorKind::Temp, 1.0),
            (SensorKind::Humidity, 1.0),
            (SensorKind::Gas, 3.0),
        ]);
        assert_eq!(vote(&input, &config), HazardLevel::Critical);
    }

    #[test]
    fn unique_mode_wins() {
        let config = config_with(&[]);
        let input = factors(&[
            (SensorKind::Temp, 2.0),
            (SensorKind::Humidity, 2.0),
            (SensorKind::Gas, 1.0),
        ]);
        assert_eq!(vote(&input, &config), HazardLevel::Elevated);
    }

    #[test]
    fn modal_tie_defers_to_highest_priority_factor() {
        // temp=Normal, gas=Elevated: tied one vote each. Gas outranks temp.
        let config = config_with(&[(SensorKind::Temp, 2.0), (SensorKind::Gas, 1.0)]);
        let input = factors(&[(SensorKind::Temp, 1.0), (SensorKind::Gas, 2.0)]);
        assert_eq!(vote(&input, &config), HazardLevel::Elevated);

        // Flip the ranks and the verdict flips with them.
        let config = config_with(&[(SensorKind::Temp, 1.0), (SensorKind::Gas, 2.0)]);
        assert_eq!(vote(&input, &config), HazardLevel::Normal);
    }

    #[test]
    fn tie_break_candidates_are_all_leveled_factors_not_just_tied_ones() {
        // temp=Normal vs humidity=Elevated tie. Gas carries the best rank
        // but reported nothing, so it cannot decide; humidity (rank 2)
        // beats temp (rank 3).
        let config = config_with(&[
            (SensorKind::Gas, 1.0),
            (SensorKind::Humidity, 2.0),
            (SensorKind::Temp, 3.0),
        ]);
        let input = factors(&[(SensorKind::Temp, 1.0), (SensorKind::Humidity, 2.0)]);
        assert_eq!(vote(&input, &config), HazardLevel::Elevated);
    }

    #[test]
    fn modal_tie_without_prioritized_factors_takes_lowest_tied_level() {
        let config = config_with(&[]);
        let input = factors(&[(SensorKind::Temp, 1.0), (SensorKind::Gas, 2.0)]);
        assert_eq!(vote(&input, &config), HazardLevel::Normal);
    }

    #[test]
    fn singleton_factor_passes_through() {
        let config = config_with(&[]);
        assert_eq!(
            vote(&factors(&[(SensorKind::Gas, 2.0)]), &config),
            HazardLevel::Elevated
        );
        assert_eq!(
            vote(&factors(&[(SensorKind::Gas, 1.0)]), &config),
            HazardLevel::Normal
        );
    }

    #[test]
    fn no_usable_factors_defaults_to_normal() {
        let config = config_with(&[]);
        assert_eq!(vote(&BTreeMap::new(), &config), HazardLevel::Normal);
    }

    #[test]
    fn factors_without_a_band_are_ignored() {
        let mut thresholds = unit_thresholds();
        thresholds.remove(&SensorKind::Gas);
        let config = LocationConfig::new(Some(thresholds), Some(BTreeMap::new()));

        // Gas would be critical, but it has no band, so temp decides alone.
        let input = factors(&[(SensorKind::Temp, 1.0), (SensorKind::Gas, 100.0)]);
        assert_eq!(vote(&input, &config), HazardLevel::Normal);
    }

    #[test]
    fn majority_identifies_unique_and_tied_modes() {
        assert_eq!(
            majority(&[HazardLevel::Elevated, HazardLevel::Elevated, HazardLevel::Normal]),
            Majority::Unique(HazardLevel::Elevated)
        );
        assert_eq!(
            majority(&[HazardLevel::Normal, HazardLevel::Elevated]),
            Majority::Tied(vec![HazardLevel::Normal, HazardLevel::Elevated])
        );
    }
}
