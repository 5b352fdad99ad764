use crate::Individual;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the evolutionary core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolutionError {
    /// A numeric input is outside its documented domain
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Crossover was asked to recombine genomes of different lengths
    #[error("cannot cross genomes of different lengths ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    /// A board needs at least two cells per side to seed two tiles
    #[error("grid size {size} is too small, need at least 2")]
    GridTooSmall { size: usize },
}

/// An individual paired with its fitness score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub individual: Individual,
    pub fitness: f64,
}

impl EvaluationRecord {
    pub fn new(individual: Individual, fitness: f64) -> Self {
        Self {
            individual,
            fitness,
        }
    }
}

/// Distribution of simulated outcomes for one individual.
///
/// Used for reporting only; selection ranks on the scalar fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    /// Number of simulated games
    pub trials: u32,

    /// Mean of the highest tile over all trials (equals the scalar fitness)
    pub mean_max_tile: f64,

    /// Mean number of moves that changed the board
    pub mean_effective_moves: f64,

    /// Highest tile seen in any trial
    pub best_tile: u32,

    /// `(threshold, trials whose highest tile reached it)`, ascending
    pub threshold_hits: Vec<(u32, u32)>,
}

/// Descriptive statistics of one generation's fitness values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub best: f64,
    pub worst: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub q3: f64,

    /// Best of this generation minus best of the previous one (0 for the first)
    pub convergence: f64,
}

impl GenerationStats {
    /// Summarise a set of fitness values.
    ///
    /// Empty input yields all zeros. Standard deviation is the sample
    /// deviation and is 0 for fewer than two values. Quartiles use linear
    /// interpolation between closest ranks.
    pub fn from_fitness(values: &[f64], previous_best: Option<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let best = sorted[n - 1];
        let worst = sorted[0];
        let mean = sorted.iter().sum::<f64>() / n as f64;

        let std_dev = if n > 1 {
            let variance =
                sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let convergence = previous_best.map(|prev| best - prev).unwrap_or(0.0);

        Self {
            best,
            worst,
            mean,
            median: quantile(&sorted, 0.5),
            std_dev,
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
            convergence,
        }
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Everything a reporting collaborator needs about one finished generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Zero-based generation index
    pub generation: u32,

    pub stats: GenerationStats,

    /// Wall time spent evaluating this generation
    pub elapsed: Duration,

    /// Best fitness seen so far across the whole run
    pub best_ever: f64,

    /// Outcome distribution of this generation's best individual
    pub best_report: Option<FitnessReport>,
}

/// Final outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: Uuid,

    pub best_fitness: f64,

    pub best_individual: Individual,

    pub generations_completed: u32,

    /// One entry per evaluated generation, in order
    pub history: Vec<GenerationReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_extremes() {
        let stats = GenerationStats::from_fitness(&[0.3, 0.5, 0.0, 0.9, 0.99], None);
        assert_eq!(stats.best, 0.99);
        assert_eq!(stats.worst, 0.0);
        assert_eq!(stats.median, 0.5);
        assert!((stats.mean - 0.538).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty_is_zero() {
        let stats = GenerationStats::from_fitness(&[], Some(10.0));
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.median, 0.0);
        assert_eq!(stats.convergence, 0.0);
    }

    #[test]
    fn test_stats_single_value() {
        let stats = GenerationStats::from_fitness(&[64.0], None);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.median, 64.0);
        assert_eq!(stats.q1, 64.0);
        assert_eq!(stats.q3, 64.0);
    }

    #[test]
    fn test_stats_quartiles_and_spread() {
        let stats = GenerationStats::from_fitness(&[4.0, 1.0, 3.0, 2.0], None);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q1, 1.75);
        assert_eq!(stats.q3, 3.25);
        // sample variance of 1..=4 is 5/3
        assert!((stats.std_dev - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_stats_convergence() {
        let stats = GenerationStats::from_fitness(&[100.0, 128.0], Some(96.0));
        assert_eq!(stats.convergence, 32.0);
    }

    #[test]
    fn test_error_messages() {
        let err = EvolutionError::LengthMismatch { left: 3, right: 4 };
        assert_eq!(
            err.to_string(),
            "cannot cross genomes of different lengths (3 vs 4)"
        );

        let err = EvolutionError::InvalidParameter {
            name: "mutation_rate",
            reason: "must lie in [0, 1]".to_string(),
        };
        assert!(err.to_string().contains("mutation_rate"));
    }

    #[test]
    fn test_run_result_serialization() {
        let result = RunResult {
            run_id: Uuid::new_v4(),
            best_fitness: 128.0,
            best_individual: Individual::new(vec![crate::Move::Up, crate::Move::Left]),
            generations_completed: 1,
            history: vec![GenerationReport {
                generation: 0,
                stats: GenerationStats::from_fitness(&[128.0, 64.0], None),
                elapsed: Duration::from_millis(12),
                best_ever: 128.0,
                best_report: None,
            }],
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""best_individual":["up","left"]"#));

        let decoded: RunResult = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.run_id, result.run_id);
        assert_eq!(decoded.best_individual, result.best_individual);
        assert_eq!(decoded.history.len(), 1);
        assert_eq!(decoded.history[0].elapsed, Duration::from_millis(12));
    }
}
