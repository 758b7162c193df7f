use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A player stat category we predict props for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StatType {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    ThreesMade,
    Minutes,
}

impl StatType {
    /// League-average per-game mean used when a player has too little history.
    /// These fallbacks are fixed and deterministic per stat.
    pub fn league_average(self) -> f64 {
        match self {
            StatType::Points => 12.0,
            StatType::Rebounds => 5.0,
            StatType::Assists => 3.0,
            StatType::Steals => 1.0,
            StatType::Blocks => 0.5,
            StatType::ThreesMade => 1.5,
            StatType::Minutes => 24.0,
        }
    }

    /// Distribution family used to model this stat. Rare counting events
    /// (steals, blocks, threes) are Poisson; high-volume stats are close
    /// enough to symmetric that a clamped Normal fits better.
    pub fn family(self) -> DistributionFamily {
        match self {
            StatType::Steals | StatType::Blocks | StatType::ThreesMade => {
                DistributionFamily::Poisson
            }
            _ => DistributionFamily::Normal,
        }
    }
}

/// One historical per-game outcome for a (player, stat) pair.
///
/// Sequences are ordered chronologically, most-recent-last, and sourced from
/// the external history store — the engine never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// The stat value recorded in that game (e.g. 23.0 points)
    pub value: f64,
    pub occurred_at: NaiveDate,
    pub is_home: bool,
    /// Full rest days before the game (0 = back-to-back)
    pub rest_days: u32,
    pub opponent_id: u64,
}

/// Distribution family a fit can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionFamily {
    Normal,
    Poisson,
    Binomial,
}

/// Where the fitted parameters came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitSource {
    /// Estimated from the player's own game log
    PlayerHistory,
    /// Too little history — per-stat league-average fallback substituted
    LeagueAverage,
}

/// Fitted distribution parameters fed to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedDistribution {
    pub family: DistributionFamily,
    pub mean: f64,
    pub std_dev: f64,
    /// Number of observations the fit was estimated from (0 on fallback)
    pub sample_size: usize,
    pub source: FitSource,
}

/// Optional per-game context multipliers supplied by opponent/team analytics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameContext {
    /// Expected game pace relative to league average (1.0 = average)
    pub pace_factor: f64,
    /// Opponent defensive quality as a direct mean multiplier
    /// (>1.0 = weak defense inflates production)
    pub opponent_defense_rating: f64,
    pub home_court: bool,
    /// Full rest days before tip-off (0 = second night of a back-to-back)
    pub rest_days: u32,
}

/// Fixed percentile cuts reported for every simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// A symmetric (low, high) interval around the sample center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

/// The three nested confidence intervals reported for every simulation.
/// Invariant: ci90 ⊆ ci95 ⊆ ci99.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceIntervals {
    pub ci90: Interval,
    pub ci95: Interval,
    pub ci99: Interval,
}

/// One equal-width histogram bin over the simulated sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub bin_start: f64,
    /// Share of samples landing in this bin, in percent
    pub probability_pct: f64,
}

/// One candidate betting line with its simulated over/under probabilities
/// and the edge against the assumed break-even probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverUnderRow {
    pub line: f64,
    pub over_prob: f64,
    pub under_prob: f64,
    pub ev_over: f64,
    pub ev_under: f64,
}

impl OverUnderRow {
    /// Build a row from the over probability; under is its complement so
    /// `over_prob + under_prob == 1.0` holds by construction.
    pub fn from_over_prob(line: f64, over_prob: f64, breakeven: f64) -> Self {
        let under_prob = 1.0 - over_prob;
        OverUnderRow {
            line,
            over_prob,
            under_prob,
            ev_over: over_prob - breakeven,
            ev_under: under_prob - breakeven,
        }
    }
}

/// Summary of one Monte Carlo run. The raw sample array is reduced here and
/// discarded; only the summary leaves the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub iterations: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub std_dev: f64,
    pub skewness: f64,
    /// Fourth standardized moment (3.0 = normal reference, not excess)
    pub kurtosis: f64,
    pub percentiles: Percentiles,
    pub confidence_intervals: ConfidenceIntervals,
    pub histogram: Vec<HistogramBin>,
    pub over_under_table: Vec<OverUnderRow>,
}

/// Final recommendation for a betting line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Over,
    Under,
    Avoid,
}

/// The artifact handed back to callers — one prediction per
/// (player, stat, line) request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub player_id: u64,
    pub stat_type: StatType,
    /// The betting line the recommendation is judged against
    pub line: f64,
    pub predicted_value: f64,
    /// Historical-consistency score in [0, 1] gating the recommendation
    pub confidence: f64,
    pub probability_over: f64,
    pub probability_under: f64,
    pub recommendation: Recommendation,
    /// Edge over the break-even probability, scaled by confidence
    pub expected_value: f64,
}

impl Prediction {
    /// Validate request inputs before any computation is done.
    pub fn validate_request(player_id: u64, line: f64) -> Result<(), EngineError> {
        if player_id == 0 {
            return Err(EngineError::Validation(
                "player_id must be positive".into(),
            ));
        }
        if !line.is_finite() || line < 0.0 {
            return Err(EngineError::Validation(format!(
                "line must be a non-negative number, got {line}"
            )));
        }
        Ok(())
    }
}
