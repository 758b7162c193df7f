//! Monte Carlo simulation core.
//!
//! Draws N independent samples from a fitted distribution, then reduces the
//! empirical sample into the summary that leaves this module: moments,
//! percentiles, nested confidence intervals, a histogram, and an over/under
//! probability table for a set of candidate betting lines. The raw sample
//! array never escapes.
//!
//! Determinism: with the same fitted distribution, iteration count and a
//! seeded RNG, two runs produce bit-identical summaries. The reduction is a
//! single sort plus index arithmetic — no hash iteration, no parallelism.

use rand::Rng;

use crate::engine::sampler;
use crate::error::EngineError;
use crate::models::{
    ConfidenceIntervals, DistributionFamily, FittedDistribution, HistogramBin, Interval,
    OverUnderRow, Percentiles, SimulationResult,
};

/// Number of equal-width histogram bins spanning [min, max] of the sample.
const HISTOGRAM_BINS: usize = 50;

/// Kurtosis of a normal distribution; the sentinel reported when the sample
/// is too small (or too flat) for the fourth moment to be meaningful.
const NORMAL_KURTOSIS: f64 = 3.0;

/// Simulation policy knobs. Defaults match the production configuration.
#[derive(Debug, Clone, Copy)]
pub struct SimulatorConfig {
    /// Iterations used when the caller does not specify a count
    pub default_iterations: usize,
    /// Hard ceiling capping worst-case CPU time per call
    pub max_iterations: usize,
    /// Break-even win probability implied by standard -110 vig odds;
    /// EV columns are computed as `probability − breakeven`
    pub breakeven_probability: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            default_iterations: 10_000,
            max_iterations: 100_000,
            breakeven_probability: 0.5238,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MonteCarloSimulator {
    pub config: SimulatorConfig,
}

impl MonteCarloSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        MonteCarloSimulator { config }
    }

    /// Run `iterations` draws from `fitted` and reduce them to a summary.
    ///
    /// When `candidate_lines` is `None` the over/under table defaults to
    /// `{mean−2, mean−1, mean, mean+1, mean+2}` around the fitted mean.
    pub fn run<R: Rng + ?Sized>(
        &self,
        fitted: &FittedDistribution,
        iterations: usize,
        candidate_lines: Option<&[f64]>,
        rng: &mut R,
    ) -> Result<SimulationResult, EngineError> {
        if iterations == 0 {
            return Err(EngineError::Validation("iterations must be positive".into()));
        }
        if iterations > self.config.max_iterations {
            return Err(EngineError::Validation(format!(
                "iterations {} exceeds ceiling {}",
                iterations, self.config.max_iterations
            )));
        }
        if !fitted.mean.is_finite() || fitted.mean < 0.0 {
            return Err(EngineError::Domain(format!(
                "fitted mean must be finite and non-negative, got {}",
                fitted.mean
            )));
        }
        if fitted.family == DistributionFamily::Normal
            && (!fitted.std_dev.is_finite() || fitted.std_dev <= 0.0)
        {
            return Err(EngineError::Domain(format!(
                "fitted std_dev must be positive for a normal fit, got {}",
                fitted.std_dev
            )));
        }

        let mut samples = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            samples.push(draw(fitted, rng));
        }
        samples.sort_unstable_by(f64::total_cmp);

        let default_lines;
        let lines: &[f64] = match candidate_lines {
            Some(lines) => lines,
            None => {
                default_lines = [
                    fitted.mean - 2.0,
                    fitted.mean - 1.0,
                    fitted.mean,
                    fitted.mean + 1.0,
                    fitted.mean + 2.0,
                ];
                &default_lines
            }
        };

        Ok(self.summarize(&samples, lines))
    }

    /// Reduce a sorted sample into the reported summary.
    fn summarize(&self, sorted: &[f64], lines: &[f64]) -> SimulationResult {
        let n = sorted.len();
        let nf = n as f64;

        let mean = sorted.iter().sum::<f64>() / nf;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / nf;
        let std_dev = variance.sqrt();

        // Third/fourth standardized population moments. Sentinels (0 skew,
        // 3 kurtosis) below minimum sample size or on a flat sample — the
        // moments are 0/0 there.
        let skewness = if n < 3 || std_dev == 0.0 {
            0.0
        } else {
            sorted
                .iter()
                .map(|x| ((x - mean) / std_dev).powi(3))
                .sum::<f64>()
                / nf
        };
        let kurtosis = if n < 4 || std_dev == 0.0 {
            NORMAL_KURTOSIS
        } else {
            sorted
                .iter()
                .map(|x| ((x - mean) / std_dev).powi(4))
                .sum::<f64>()
                / nf
        };

        let pct = |p: f64| sorted[((nf * p) as usize).min(n - 1)];
        let percentiles = Percentiles {
            p5: pct(0.05),
            p10: pct(0.10),
            p25: pct(0.25),
            p50: pct(0.50),
            p75: pct(0.75),
            p90: pct(0.90),
            p95: pct(0.95),
        };

        // Symmetric interval around the center: index bounds at
        // floor(N(1−level)/2) and floor(N(1+level)/2)
        let ci = |level: f64| Interval {
            low: sorted[((nf * (1.0 - level) / 2.0) as usize).min(n - 1)],
            high: sorted[((nf * (1.0 + level) / 2.0) as usize).min(n - 1)],
        };
        let confidence_intervals = ConfidenceIntervals {
            ci90: ci(0.90),
            ci95: ci(0.95),
            ci99: ci(0.99),
        };

        let histogram = build_histogram(sorted);
        // Mode: midpoint of the densest histogram bin
        let bin_width = (sorted[n - 1] - sorted[0]) / HISTOGRAM_BINS as f64;
        let mode = histogram
            .iter()
            .max_by(|a, b| a.probability_pct.total_cmp(&b.probability_pct))
            .map(|bin| bin.bin_start + bin_width / 2.0)
            .unwrap_or(mean);

        let over_under_table = lines
            .iter()
            .map(|&line| {
                let over_prob = count_over(sorted, line) as f64 / nf;
                OverUnderRow::from_over_prob(line, over_prob, self.config.breakeven_probability)
            })
            .collect();

        SimulationResult {
            iterations: n,
            mean,
            median: pct(0.50),
            mode,
            std_dev,
            skewness,
            kurtosis,
            percentiles,
            confidence_intervals,
            histogram,
            over_under_table,
        }
    }
}

/// One draw from the fitted family. Normal draws are clamped non-negative
/// inside the sampler; count families cannot go negative.
fn draw<R: Rng + ?Sized>(fitted: &FittedDistribution, rng: &mut R) -> f64 {
    match fitted.family {
        DistributionFamily::Normal => sampler::sample_normal(fitted.mean, fitted.std_dev, rng),
        DistributionFamily::Poisson => sampler::sample_poisson(fitted.mean, rng) as f64,
        DistributionFamily::Binomial => {
            // Moment-matching: mean = np, var = np(1−p). When the sample
            // variance is not below the mean no binomial matches; a Poisson
            // draw is the closest count model.
            let variance = fitted.std_dev * fitted.std_dev;
            let p = 1.0 - variance / fitted.mean.max(f64::MIN_POSITIVE);
            if p > 0.0 && p < 1.0 {
                let trials = (fitted.mean / p).round().max(1.0) as u64;
                sampler::sample_binomial(trials, p, rng) as f64
            } else {
                sampler::sample_poisson(fitted.mean, rng) as f64
            }
        }
    }
}

/// Number of samples strictly above `line` in a sorted sample, by binary
/// search (partition point of `x <= line`).
fn count_over(sorted: &[f64], line: f64) -> usize {
    sorted.len() - sorted.partition_point(|&x| x <= line)
}

/// 50 equal-width bins spanning [min, max]; each bin's value is the share of
/// samples in it, in percent. A zero-span sample collapses to one bin.
fn build_histogram(sorted: &[f64]) -> Vec<HistogramBin> {
    let n = sorted.len();
    let (min, max) = (sorted[0], sorted[n - 1]);
    let span = max - min;
    if span <= 0.0 {
        return vec![HistogramBin {
            bin_start: min,
            probability_pct: 100.0,
        }];
    }

    let width = span / HISTOGRAM_BINS as f64;
    let mut counts = [0usize; HISTOGRAM_BINS];
    for &x in sorted {
        let idx = (((x - min) / width) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBin {
            bin_start: min + i as f64 * width,
            probability_pct: count as f64 / n as f64 * 100.0,
        })
        .collect()
}
