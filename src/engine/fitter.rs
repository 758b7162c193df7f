//! Distribution fitting from historical per-game observations.
//!
//! The fitter is where "not enough history" is absorbed: thin game logs are
//! an expected, common case (rookies, trades, injuries), so they fall back
//! to a deterministic per-stat league-average fit instead of raising.

use crate::engine::scenario::Scenario;
use crate::models::{FitSource, FittedDistribution, Observation, StatType};

/// Std-dev used on the league-average fallback path, as a fraction of the
/// fallback mean. Conservative: wide enough that the simulator never treats
/// an unknown player as a sure thing.
const FALLBACK_RELATIVE_SPREAD: f64 = 0.3;

/// Absolute std-dev substituted when the relative floor degenerates
/// (a player whose every observed value is 0 — never attempts the stat).
const ABSOLUTE_MIN_STD_DEV: f64 = 0.5;

/// Fitting policy knobs. Defaults match the production configuration.
#[derive(Debug, Clone, Copy)]
pub struct FitterConfig {
    /// Below this many games the league-average fallback is used
    pub min_games_required: usize,
    /// Variance floor: std_dev >= mean * this, preventing degenerate
    /// zero-spread fits from short, too-consistent histories
    pub min_relative_spread: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        FitterConfig {
            min_games_required: 5,
            min_relative_spread: 0.15,
        }
    }
}

/// Turns an observation sequence into fitted distribution parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionFitter {
    pub config: FitterConfig,
}

impl DistributionFitter {
    pub fn new(config: FitterConfig) -> Self {
        DistributionFitter { config }
    }

    /// Fit a distribution for `stat` from `observations`, scaled by the
    /// scenario's multipliers.
    ///
    /// With fewer than `min_games_required` observations this returns the
    /// per-stat league-average fallback unchanged — deterministic, no error,
    /// and no scenario scaling (the fallback is already a population-wide
    /// estimate rather than a player-specific one).
    pub fn fit(
        &self,
        stat: StatType,
        observations: &[Observation],
        scenario: Scenario,
    ) -> FittedDistribution {
        if observations.len() < self.config.min_games_required {
            let mean = stat.league_average();
            return FittedDistribution {
                family: stat.family(),
                mean,
                std_dev: mean * FALLBACK_RELATIVE_SPREAD,
                sample_size: observations.len(),
                source: FitSource::LeagueAverage,
            };
        }

        let n = observations.len() as f64;
        let mean = observations.iter().map(|o| o.value).sum::<f64>() / n;
        // Population formula (divide by N, not N-1) — matches the historical
        // model this engine reproduces
        let variance = observations
            .iter()
            .map(|o| (o.value - mean).powi(2))
            .sum::<f64>()
            / n;
        let mut std_dev = variance.sqrt();

        // Variance floor so an all-identical history still simulates with
        // spread. When mean is 0 the relative floor degenerates to 0, so an
        // absolute minimum takes over.
        std_dev = std_dev.max(mean * self.config.min_relative_spread);
        if std_dev <= 0.0 {
            std_dev = ABSOLUTE_MIN_STD_DEV;
        }

        let adj = scenario.adjustment();
        FittedDistribution {
            family: stat.family(),
            mean: mean * adj.mean_multiplier,
            std_dev: std_dev * adj.spread_multiplier,
            sample_size: observations.len(),
            source: FitSource::PlayerHistory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn obs(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Observation {
                value,
                occurred_at: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
                    + chrono::Days::new(i as u64),
                is_home: i % 2 == 0,
                rest_days: 1,
                opponent_id: 100 + i as u64,
            })
            .collect()
    }

    #[test]
    fn empty_history_falls_back_to_league_average() {
        let fitter = DistributionFitter::default();
        let fit = fitter.fit(StatType::Points, &[], Scenario::Normal);
        assert_eq!(fit.source, FitSource::LeagueAverage);
        assert_eq!(fit.sample_size, 0);
        assert_relative_eq!(fit.mean, 12.0);
        assert_relative_eq!(fit.std_dev, 12.0 * 0.3);
    }

    #[test]
    fn short_history_falls_back_to_league_average() {
        let fitter = DistributionFitter::default();
        let fit = fitter.fit(StatType::Rebounds, &obs(&[8.0, 9.0, 7.0]), Scenario::Normal);
        assert_eq!(fit.source, FitSource::LeagueAverage);
        assert_eq!(fit.sample_size, 3);
        assert_relative_eq!(fit.mean, 5.0);
    }

    #[test]
    fn sufficient_history_uses_population_moments() {
        let fitter = DistributionFitter::default();
        let fit = fitter.fit(
            StatType::Points,
            &obs(&[18.0, 15.0, 20.0, 16.0, 19.0]),
            Scenario::Normal,
        );
        assert_eq!(fit.source, FitSource::PlayerHistory);
        assert_relative_eq!(fit.mean, 17.6, epsilon = 1e-12);
        // Population std = sqrt(17.2/5) ≈ 1.8547, below the 15% relative
        // floor (2.64), so the floor wins
        assert_relative_eq!(fit.std_dev, 17.6 * 0.15, epsilon = 1e-12);
    }

    #[test]
    fn wide_history_keeps_its_own_spread() {
        let fitter = DistributionFitter::default();
        let fit = fitter.fit(
            StatType::Points,
            &obs(&[5.0, 30.0, 10.0, 25.0, 15.0]),
            Scenario::Normal,
        );
        // mean 17, population std ≈ 9.27 — well above the floor
        assert_relative_eq!(fit.mean, 17.0, epsilon = 1e-12);
        assert!(fit.std_dev > 17.0 * 0.15);
    }

    #[test]
    fn identical_values_hit_the_relative_spread_floor() {
        let fitter = DistributionFitter::default();
        let fit = fitter.fit(
            StatType::Points,
            &obs(&[10.0, 10.0, 10.0, 10.0, 10.0]),
            Scenario::Normal,
        );
        assert!(fit.std_dev > 0.0);
        assert_relative_eq!(fit.std_dev, 10.0 * 0.15, epsilon = 1e-12);
    }

    #[test]
    fn zero_mean_history_gets_the_absolute_minimum_spread() {
        let fitter = DistributionFitter::default();
        let fit = fitter.fit(
            StatType::Blocks,
            &obs(&[0.0, 0.0, 0.0, 0.0, 0.0]),
            Scenario::Normal,
        );
        assert_relative_eq!(fit.mean, 0.0);
        assert_relative_eq!(fit.std_dev, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn scenario_multipliers_scale_the_fit() {
        let fitter = DistributionFitter::default();
        let base = fitter.fit(
            StatType::Points,
            &obs(&[18.0, 15.0, 20.0, 16.0, 19.0]),
            Scenario::Normal,
        );
        let blowout = fitter.fit(
            StatType::Points,
            &obs(&[18.0, 15.0, 20.0, 16.0, 19.0]),
            Scenario::Blowout,
        );
        assert_relative_eq!(blowout.mean, base.mean * 0.85, epsilon = 1e-12);
        assert_relative_eq!(blowout.std_dev, base.std_dev * 1.15, epsilon = 1e-12);
    }

    #[test]
    fn fallback_ignores_scenario_multipliers() {
        let fitter = DistributionFitter::default();
        let fit = fitter.fit(StatType::Points, &[], Scenario::Blowout);
        assert_relative_eq!(fit.mean, 12.0);
    }
}
