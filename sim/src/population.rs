use crate::fitness::fitness;
use crate::simulator::GameConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::{EvaluationRecord, EvolutionError, Individual};

/// `pop_size` random individuals of `individual_size` moves each
pub fn generate_population<R: Rng + ?Sized>(
    pop_size: usize,
    individual_size: usize,
    rng: &mut R,
) -> Vec<Individual> {
    (0..pop_size)
        .map(|_| Individual::random(individual_size, rng))
        .collect()
}

/// Score every individual, preserving input order.
///
/// Each individual plays on its own `StdRng` seeded from `rng`, so results
/// depend only on the seed drawn for it and not on evaluation order.
pub fn evaluate_population<R: Rng + ?Sized>(
    population: &[Individual],
    trials: u32,
    game: &GameConfig,
    rng: &mut R,
) -> Result<Vec<EvaluationRecord>, EvolutionError> {
    population
        .iter()
        .map(|individual| {
            let mut stream = StdRng::seed_from_u64(rng.gen());
            let score = fitness(individual, trials, game, &mut stream)?;
            Ok(EvaluationRecord::new(individual.clone(), score))
        })
        .collect()
}

/// Elitist selection: the `n` fittest individuals, best first.
///
/// The sort is stable, so equal fitness keeps evaluation order.
pub fn select_parents(evaluated: &[EvaluationRecord], n: usize) -> Vec<Individual> {
    let mut ranked: Vec<&EvaluationRecord> = evaluated.iter().collect();
    ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

    ranked
        .into_iter()
        .take(n)
        .map(|record| record.individual.clone())
        .collect()
}

/// Build the next population of exactly `target_size` individuals.
///
/// The `num_parents` elites are carried over unchanged; the rest are
/// mutated children of parent pairs drawn uniformly with replacement.
pub fn next_generation<R: Rng + ?Sized>(
    evaluated: &[EvaluationRecord],
    target_size: usize,
    mutation_rate: f64,
    num_parents: usize,
    rng: &mut R,
) -> Result<Vec<Individual>, EvolutionError> {
    let parents = select_parents(evaluated, num_parents);
    let mut population: Vec<Individual> = parents.iter().take(target_size).cloned().collect();

    if population.len() < target_size && parents.is_empty() {
        return Err(EvolutionError::InvalidParameter {
            name: "num_parents",
            reason: "no parents available to breed offspring".to_string(),
        });
    }

    while population.len() < target_size {
        let (Some(a), Some(b)) = (parents.choose(rng), parents.choose(rng)) else {
            break;
        };
        let (child1, child2) = a.crossover(b, rng)?;

        population.push(child1.mutate(mutation_rate, rng));
        if population.len() < target_size {
            population.push(child2.mutate(mutation_rate, rng));
        }
    }

    Ok(population)
}
