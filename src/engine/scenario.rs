//! Named game-scenario multipliers applied to a fitted distribution before
//! simulation.
//!
//! The catalogue is a const table keyed by the `Scenario` enum — loaded once
//! at compile time, never mutated at runtime. Multipliers are calibrated from
//! league-wide splits: blowouts bleed starter minutes (lower mean, noisier
//! outcomes), close games extend them, overtime adds a period, and the second
//! night of a back-to-back drags efficiency down.

use serde::{Deserialize, Serialize};

/// A named game situation that scales the fitted mean/spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Normal,
    Blowout,
    Close,
    Overtime,
    BackToBack,
}

/// Multipliers applied to a fitted distribution for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAdjustment {
    pub mean_multiplier: f64,
    pub spread_multiplier: f64,
}

/// Catalogue rows, indexed by `Scenario` discriminant order.
const CATALOGUE: [ScenarioAdjustment; 5] = [
    // Normal
    ScenarioAdjustment {
        mean_multiplier: 1.0,
        spread_multiplier: 1.0,
    },
    // Blowout: starters sit in garbage time
    ScenarioAdjustment {
        mean_multiplier: 0.85,
        spread_multiplier: 1.15,
    },
    // Close: full rotations, tight variance
    ScenarioAdjustment {
        mean_multiplier: 1.05,
        spread_multiplier: 0.95,
    },
    // Overtime: extra period inflates everything
    ScenarioAdjustment {
        mean_multiplier: 1.12,
        spread_multiplier: 1.10,
    },
    // BackToBack: fatigue on the second night
    ScenarioAdjustment {
        mean_multiplier: 0.92,
        spread_multiplier: 1.08,
    },
];

impl Scenario {
    /// Look up this scenario's multipliers in the static catalogue.
    pub fn adjustment(self) -> ScenarioAdjustment {
        CATALOGUE[self as usize]
    }
}
