//! Player-prop prediction engine for NBA box-score stats.
//!
//! Fits a distribution to a player's historical game log, runs a Monte Carlo
//! simulation under a named game scenario, and turns the simulated
//! distribution plus a betting line into an over/under/avoid recommendation
//! with an expected-value estimate.
//!
//! The engine is synchronous, CPU-bound and stateless across calls; callers
//! fetch history up front, inject it through [`engine::ObservationSource`],
//! and own their RNG instance per call for reproducibility.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use engine::{PredictionEngine, PredictionRequest};
pub use error::EngineError;
pub use models::{Prediction, Recommendation, StatType};
