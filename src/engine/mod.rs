pub mod fitter;
pub mod predictor;
pub mod probability;
pub mod sampler;
pub mod scenario;
pub mod simulator;

pub use fitter::{DistributionFitter, FitterConfig};
pub use predictor::{
    InMemorySource, ObservationSource, PredictionEngine, PredictionOutcome, PredictionRequest,
};
pub use scenario::{Scenario, ScenarioAdjustment};
pub use simulator::{MonteCarloSimulator, SimulatorConfig};
