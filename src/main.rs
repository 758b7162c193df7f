use anyhow::Result;
use chrono::{Days, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use props_engine::config::Config;
use props_engine::engine::{
    DistributionFitter, InMemorySource, MonteCarloSimulator, PredictionEngine, PredictionRequest,
    Scenario,
};
use props_engine::models::{GameContext, Observation, StatType};

/// Run one prop prediction from a supplied game log and print it as JSON.
///
/// This binary is the job/caller layer around the engine: it owns config,
/// logging and the RNG; the engine itself is a pure function of its inputs.
#[derive(Parser, Debug)]
#[command(name = "props-engine", version, about)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Player identifier (positive)
    #[arg(long, default_value = "1")]
    player_id: u64,

    /// Stat category to predict
    #[arg(long, value_enum)]
    stat: StatType,

    /// Betting line to judge over/under against
    #[arg(long)]
    line: f64,

    /// Historical per-game values, oldest first (e.g. --history 18,15,20,16,19)
    #[arg(long, value_delimiter = ',')]
    history: Vec<f64>,

    /// Game scenario applied to the fit
    #[arg(long, value_enum, default_value = "normal")]
    scenario: Scenario,

    /// Expected game pace relative to league average
    #[arg(long)]
    pace_factor: Option<f64>,

    /// Opponent defensive rating as a mean multiplier
    #[arg(long)]
    defense_rating: Option<f64>,

    /// Treat the game as a home game (only read when context is supplied)
    #[arg(long, default_value = "false")]
    home: bool,

    /// Rest days before tip-off (0 = back-to-back)
    #[arg(long, default_value = "1")]
    rest_days: u32,
}

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    cli.config.validate()?;

    // Synthesize an ordered game log from the supplied values: one game
    // every other day, most-recent-last, ending yesterday.
    let today = Utc::now().date_naive();
    let n = cli.history.len() as u64;
    let observations: Vec<Observation> = cli
        .history
        .iter()
        .enumerate()
        .map(|(i, &value)| Observation {
            value,
            occurred_at: today - Days::new(1 + 2 * (n - 1 - i as u64)),
            is_home: i % 2 == 0,
            rest_days: 1,
            opponent_id: 1 + i as u64,
        })
        .collect();
    info!(
        "Predicting {:?} for player {} against line {} ({} games of history, scenario {:?})",
        cli.stat,
        cli.player_id,
        cli.line,
        observations.len(),
        cli.scenario
    );

    let mut source = InMemorySource::default();
    source.insert(cli.player_id, cli.stat, observations);

    let context = match (cli.pace_factor, cli.defense_rating) {
        (None, None) => None,
        (pace, defense) => Some(GameContext {
            pace_factor: pace.unwrap_or(1.0),
            opponent_defense_rating: defense.unwrap_or(1.0),
            home_court: cli.home,
            rest_days: cli.rest_days,
        }),
    };

    let engine = PredictionEngine::new(
        DistributionFitter::new(cli.config.fitter_config()),
        MonteCarloSimulator::new(cli.config.simulator_config()),
    );
    let request = PredictionRequest {
        player_id: cli.player_id,
        stat_type: cli.stat,
        line: cli.line,
        scenario: cli.scenario,
        context,
        iterations: Some(cli.config.iterations),
    };

    let mut rng = match cli.config.seed {
        Some(seed) => {
            info!("Seeded RNG with {seed} — run is reproducible");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let outcome = engine.predict(&source, &request, &mut rng)?;
    info!(
        "{:?} (confidence {:.2}, P(over) {:.3}, EV {:+.4})",
        outcome.prediction.recommendation,
        outcome.prediction.confidence,
        outcome.prediction.probability_over,
        outcome.prediction.expected_value
    );

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
