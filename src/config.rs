use clap::Args;

use crate::engine::{FitterConfig, SimulatorConfig};

/// Engine tuning knobs, shared by every caller of the prediction core.
/// Flattened into the binary's CLI; each knob also reads an env fallback.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Minimum games of history before trusting a player-specific fit
    #[arg(long, env = "MIN_GAMES_REQUIRED", default_value = "5")]
    pub min_games_required: usize,

    /// Variance floor as a fraction of the mean (std_dev >= mean * this)
    #[arg(long, env = "MIN_RELATIVE_SPREAD", default_value = "0.15")]
    pub min_relative_spread: f64,

    /// Monte Carlo iterations per prediction
    #[arg(long, env = "ITERATIONS", default_value = "10000")]
    pub iterations: usize,

    /// Hard ceiling on iterations (caps worst-case CPU time per call)
    #[arg(long, env = "MAX_ITERATIONS", default_value = "100000")]
    pub max_iterations: usize,

    /// Break-even win probability implied by standard -110 vig odds
    #[arg(long, env = "BREAKEVEN_PROBABILITY", default_value = "0.5238")]
    pub breakeven_probability: f64,

    /// RNG seed for reproducible runs (omit for entropy seeding)
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_games_required == 0 {
            anyhow::bail!("min_games_required must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.min_relative_spread) {
            anyhow::bail!("min_relative_spread must be between 0.0 and 1.0");
        }
        if self.iterations == 0 {
            anyhow::bail!("iterations must be positive");
        }
        if self.iterations > self.max_iterations {
            anyhow::bail!(
                "iterations ({}) must not exceed max_iterations ({})",
                self.iterations,
                self.max_iterations
            );
        }
        if !(0.0..1.0).contains(&self.breakeven_probability) {
            anyhow::bail!("breakeven_probability must be in [0.0, 1.0)");
        }
        Ok(())
    }

    pub fn fitter_config(&self) -> FitterConfig {
        FitterConfig {
            min_games_required: self.min_games_required,
            min_relative_spread: self.min_relative_spread,
        }
    }

    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            default_iterations: self.iterations,
            max_iterations: self.max_iterations,
            breakeven_probability: self.breakeven_probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            min_games_required: 5,
            min_relative_spread: 0.15,
            iterations: 10_000,
            max_iterations: 100_000,
            breakeven_probability: 0.5238,
            seed: None,
        }
    }

    #[test]
    fn default_settings_validate() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let mut c = base();
        c.min_relative_spread = 1.5;
        assert!(c.validate().is_err());

        let mut c = base();
        c.iterations = 0;
        assert!(c.validate().is_err());

        let mut c = base();
        c.iterations = 200_000;
        assert!(c.validate().is_err());

        let mut c = base();
        c.breakeven_probability = 1.0;
        assert!(c.validate().is_err());
    }
}
