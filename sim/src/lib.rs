pub mod evolution;
pub mod fitness;
pub mod grid;
pub mod population;
pub mod simulator;

pub use evolution::{Evolution, EvolutionConfig, Phase};
pub use fitness::{fitness, fitness_report, TILE_THRESHOLDS};
pub use grid::{GameState, Grid};
pub use population::{evaluate_population, generate_population, next_generation, select_parents};
pub use simulator::{play_on, simulate, simulate_symbols, GameConfig, GameOutcome};

use shared::{EvolutionError, GenerationReport, Individual, RunResult};

/// Evolve move sequences on a standard 4x4 board to 2048.
///
/// Returns the best fitness ever observed and the individual that earned it.
/// Parameters are validated before any game is simulated.
pub fn run(
    generations: u32,
    population_size: usize,
    individual_size: usize,
    mutation_rate: f64,
    trials: u32,
) -> Result<(f64, Individual), EvolutionError> {
    let config = EvolutionConfig {
        generations,
        population_size,
        individual_size,
        mutation_rate,
        trials,
        ..Default::default()
    };

    let result = run_with(config, |_| {})?;
    Ok((result.best_fitness, result.best_individual))
}

/// Run with full configuration, passing each generation's report to `observer`
pub fn run_with<F>(config: EvolutionConfig, observer: F) -> Result<RunResult, EvolutionError>
where
    F: FnMut(&GenerationReport),
{
    Evolution::new(config)?.run(observer)
}
