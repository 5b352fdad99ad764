use crate::simulator::{simulate, GameConfig};
use rand::Rng;
use shared::{EvolutionError, FitnessReport, Individual};

/// Tile values counted in a [`FitnessReport`]
pub const TILE_THRESHOLDS: [u32; 5] = [128, 256, 512, 1024, 2048];

/// Monte Carlo fitness: mean highest tile over `trials` fresh games.
///
/// An empty individual or zero trials scores 0.
pub fn fitness<R: Rng + ?Sized>(
    individual: &Individual,
    trials: u32,
    game: &GameConfig,
    rng: &mut R,
) -> Result<f64, EvolutionError> {
    if individual.is_empty() || trials == 0 {
        return Ok(0.0);
    }

    let mut total: u64 = 0;
    for _ in 0..trials {
        total += simulate(individual.genes(), game, rng)?.max_tile as u64;
    }
    Ok(total as f64 / trials as f64)
}

/// Richer breakdown of the same simulations, for reporting
pub fn fitness_report<R: Rng + ?Sized>(
    individual: &Individual,
    trials: u32,
    game: &GameConfig,
    rng: &mut R,
) -> Result<FitnessReport, EvolutionError> {
    let mut hits = [0u32; TILE_THRESHOLDS.len()];
    let mut report = FitnessReport {
        trials,
        mean_max_tile: 0.0,
        mean_effective_moves: 0.0,
        best_tile: 0,
        threshold_hits: Vec::new(),
    };

    if !individual.is_empty() && trials > 0 {
        let mut tile_total: u64 = 0;
        let mut move_total: u64 = 0;

        for _ in 0..trials {
            let outcome = simulate(individual.genes(), game, rng)?;
            tile_total += outcome.max_tile as u64;
            move_total += outcome.effective_moves as u64;
            report.best_tile = report.best_tile.max(outcome.max_tile);

            for (count, &threshold) in hits.iter_mut().zip(TILE_THRESHOLDS.iter()) {
                if outcome.max_tile >= threshold {
                    *count += 1;
                }
            }
        }

        report.mean_max_tile = tile_total as f64 / trials as f64;
        report.mean_effective_moves = move_total as f64 / trials as f64;
    }

    report.threshold_hits = TILE_THRESHOLDS.iter().copied().zip(hits).collect();
    Ok(report)
}
