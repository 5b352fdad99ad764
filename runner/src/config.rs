use anyhow::{Context, Result};
use sim::EvolutionConfig;
use std::env;
use std::str::FromStr;

pub const GENERATIONS_VAR: &str = "EVO2048_GENERATIONS";
pub const POPULATION_VAR: &str = "EVO2048_POPULATION";
pub const INDIVIDUAL_SIZE_VAR: &str = "EVO2048_INDIVIDUAL_SIZE";
pub const MUTATION_RATE_VAR: &str = "EVO2048_MUTATION_RATE";
pub const TRIALS_VAR: &str = "EVO2048_TRIALS";
pub const PARENTS_VAR: &str = "EVO2048_PARENTS";
pub const GRID_SIZE_VAR: &str = "EVO2048_GRID_SIZE";
pub const WIN_TILE_VAR: &str = "EVO2048_WIN_TILE";
pub const SEED_VAR: &str = "EVO2048_SEED";

/// Build the run configuration from the process environment
pub fn from_env() -> Result<EvolutionConfig> {
    from_lookup(|key| env::var(key).ok())
}

/// Overlay variables found by `lookup` onto the defaults.
///
/// Unset variables keep their default; a set but unparsable one is an error.
pub fn from_lookup<F>(lookup: F) -> Result<EvolutionConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = EvolutionConfig::default();

    if let Some(v) = parse_var(&lookup, GENERATIONS_VAR)? {
        config.generations = v;
    }
    if let Some(v) = parse_var(&lookup, POPULATION_VAR)? {
        config.population_size = v;
    }
    if let Some(v) = parse_var(&lookup, INDIVIDUAL_SIZE_VAR)? {
        config.individual_size = v;
    }
    if let Some(v) = parse_var(&lookup, MUTATION_RATE_VAR)? {
        config.mutation_rate = v;
    }
    if let Some(v) = parse_var(&lookup, TRIALS_VAR)? {
        config.trials = v;
    }
    if let Some(v) = parse_var(&lookup, PARENTS_VAR)? {
        config.num_parents = Some(v);
    }
    if let Some(v) = parse_var(&lookup, GRID_SIZE_VAR)? {
        config.game.grid_size = v;
    }
    if let Some(v) = parse_var(&lookup, WIN_TILE_VAR)? {
        config.game.win_tile = v;
    }
    if let Some(v) = parse_var(&lookup, SEED_VAR)? {
        config.seed = Some(v);
    }

    Ok(config)
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse()
                .with_context(|| format!("Failed to parse {}={:?}", key, raw))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}
