use crate::fitness::fitness_report;
use crate::population::{evaluate_population, generate_population, next_generation};
use crate::simulator::GameConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{EvaluationRecord, EvolutionError, GenerationReport, GenerationStats, Individual, RunResult};
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    pub generations: u32,
    pub population_size: usize,
    pub individual_size: usize,
    pub mutation_rate: f64,
    /// Simulated games per fitness evaluation
    pub trials: u32,
    /// Elites kept each generation; `None` means half the population, at least 2
    pub num_parents: Option<usize>,
    pub game: GameConfig,
    /// Fixed seed for a reproducible run; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generations: 50,
            population_size: 50,
            individual_size: 200,
            mutation_rate: 0.05,
            trials: 10,
            num_parents: None,
            game: GameConfig::default(),
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Number of elites actually used
    pub fn parents(&self) -> usize {
        // Capped at the population so a population of one still breeds
        self.num_parents
            .unwrap_or_else(|| (self.population_size / 2).max(2).min(self.population_size))
    }

    /// Check every parameter against its domain before any game is played
    pub fn validate(&self) -> Result<(), EvolutionError> {
        fn invalid(name: &'static str, reason: impl Into<String>) -> Result<(), EvolutionError> {
            Err(EvolutionError::InvalidParameter {
                name,
                reason: reason.into(),
            })
        }

        if self.generations == 0 {
            return invalid("generations", "must be positive");
        }
        if self.population_size == 0 {
            return invalid("population_size", "must be positive");
        }
        if self.individual_size == 0 {
            return invalid("individual_size", "must be positive");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid(
                "mutation_rate",
                format!("{} is outside [0, 1]", self.mutation_rate),
            );
        }
        if self.trials == 0 {
            return invalid("trials", "must be positive");
        }
        let parents = self.parents();
        if parents == 0 || parents > self.population_size {
            return invalid(
                "num_parents",
                format!(
                    "{} must lie in 1..={}",
                    parents, self.population_size
                ),
            );
        }
        if self.game.grid_size < 2 {
            return Err(EvolutionError::GridTooSmall {
                size: self.game.grid_size,
            });
        }
        if self.game.win_tile < 4 || !self.game.win_tile.is_power_of_two() {
            return invalid(
                "win_tile",
                format!("{} is not a power of two >= 4", self.game.win_tile),
            );
        }
        Ok(())
    }
}

/// Where the generational loop currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Evaluating,
    Evolving,
    Terminal,
}

/// Generational driver.
///
/// Each call to [`Evolution::step`] performs one phase transition; a
/// [`GenerationReport`] comes back whenever a generation finishes scoring.
pub struct Evolution {
    config: EvolutionConfig,
    rng: StdRng,
    run_id: Uuid,
    phase: Phase,
    generation: u32,
    population: Vec<Individual>,
    evaluated: Vec<EvaluationRecord>,
    best: Option<EvaluationRecord>,
    previous_best: Option<f64>,
    history: Vec<GenerationReport>,
}

impl Evolution {
    /// Validate `config` and prepare a run; no simulation happens yet
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            rng,
            run_id: Uuid::new_v4(),
            phase: Phase::Initializing,
            generation: 0,
            population: Vec::new(),
            evaluated: Vec::new(),
            best: None,
            previous_best: None,
            history: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Best individual seen so far
    pub fn best(&self) -> Option<&EvaluationRecord> {
        self.best.as_ref()
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Advance by one phase
    pub fn step(&mut self) -> Result<Option<GenerationReport>, EvolutionError> {
        match self.phase {
            Phase::Initializing => {
                self.population = generate_population(
                    self.config.population_size,
                    self.config.individual_size,
                    &mut self.rng,
                );
                self.best = None;
                self.phase = Phase::Evaluating;
                Ok(None)
            }
            Phase::Evaluating => {
                let report = self.evaluate()?;
                self.phase = Phase::Evolving;
                Ok(Some(report))
            }
            Phase::Evolving => {
                if self.generation < self.config.generations {
                    self.population = next_generation(
                        &self.evaluated,
                        self.config.population_size,
                        self.config.mutation_rate,
                        self.config.parents(),
                        &mut self.rng,
                    )?;
                    self.phase = Phase::Evaluating;
                } else {
                    self.phase = Phase::Terminal;
                }
                Ok(None)
            }
            Phase::Terminal => Ok(None),
        }
    }

    /// Drive the loop to completion, handing each report to `observer`
    pub fn run<F>(mut self, mut observer: F) -> Result<RunResult, EvolutionError>
    where
        F: FnMut(&GenerationReport),
    {
        let span = tracing::info_span!("evolution", run_id = %self.run_id);
        let _enter = span.enter();

        while self.phase != Phase::Terminal {
            if let Some(report) = self.step()? {
                observer(&report);
            }
        }

        self.into_result()
    }

    fn evaluate(&mut self) -> Result<GenerationReport, EvolutionError> {
        let started = Instant::now();

        self.evaluated = evaluate_population(
            &self.population,
            self.config.trials,
            &self.config.game,
            &mut self.rng,
        )?;

        let scores: Vec<f64> = self.evaluated.iter().map(|r| r.fitness).collect();
        let stats = GenerationStats::from_fitness(&scores, self.previous_best);
        self.previous_best = Some(stats.best);

        // First record holding the top score
        let generation_best = self
            .evaluated
            .iter()
            .fold(None::<&EvaluationRecord>, |acc, rec| match acc {
                Some(top) if top.fitness >= rec.fitness => Some(top),
                _ => Some(rec),
            })
            .cloned();

        let mut best_report = None;
        if let Some(top) = generation_best {
            let mut stream = StdRng::seed_from_u64(self.rng.gen());
            best_report = Some(fitness_report(
                &top.individual,
                self.config.trials,
                &self.config.game,
                &mut stream,
            )?);

            let improved = self
                .best
                .as_ref()
                .map_or(true, |best| top.fitness > best.fitness);
            if improved {
                tracing::debug!(
                    generation = self.generation,
                    fitness = top.fitness,
                    "new best individual"
                );
                self.best = Some(top);
            }
        }

        let report = GenerationReport {
            generation: self.generation,
            stats,
            elapsed: started.elapsed(),
            best_ever: self.best.as_ref().map_or(0.0, |b| b.fitness),
            best_report,
        };

        tracing::debug!(
            generation = report.generation,
            best = stats.best,
            mean = stats.mean,
            std_dev = stats.std_dev,
            "generation evaluated"
        );

        self.history.push(report.clone());
        self.generation += 1;
        Ok(report)
    }

    fn into_result(self) -> Result<RunResult, EvolutionError> {
        let best = self.best.ok_or_else(|| EvolutionError::InvalidParameter {
            name: "generations",
            reason: "no generation was evaluated".to_string(),
        })?;

        Ok(RunResult {
            run_id: self.run_id,
            best_fitness: best.fitness,
            best_individual: best.individual,
            generations_completed: self.generation,
            history: self.history,
        })
    }
}
