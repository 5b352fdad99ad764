use crate::EvolutionError;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single directional command in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a symbol is not one of the four directions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown move symbol {0:?}")]
pub struct UnknownMove(pub String);

impl FromStr for Move {
    type Err = UnknownMove;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Move::Up),
            "down" => Ok(Move::Down),
            "left" => Ok(Move::Left),
            "right" => Ok(Move::Right),
            other => Err(UnknownMove(other.to_string())),
        }
    }
}

/// Uniform over the four directions, so `rng.gen::<Move>()` works.
impl Distribution<Move> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Move {
        Move::ALL[rng.gen_range(0..Move::ALL.len())]
    }
}

/// An individual is a fixed-length sequence of moves played in order.
///
/// Genetic operators never touch an individual in place: `crossover` and
/// `mutate` both hand back fresh sequences, which keeps elites carried into
/// the next generation bit-for-bit identical to their evaluated selves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Individual {
    genes: Vec<Move>,
}

impl Individual {
    pub fn new(genes: Vec<Move>) -> Self {
        Self { genes }
    }

    /// Create a random individual of `len` moves
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        Self {
            genes: (0..len).map(|_| rng.gen()).collect(),
        }
    }

    pub fn genes(&self) -> &[Move] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Single-point crossover at a random cut in `1..len`.
    ///
    /// Parents shorter than two genes have no interior cut point; the
    /// children are then plain copies of the parents.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        other: &Individual,
        rng: &mut R,
    ) -> Result<(Individual, Individual), EvolutionError> {
        self.check_same_length(other)?;
        if self.len() < 2 {
            return Ok((self.clone(), other.clone()));
        }
        let cut = rng.gen_range(1..self.len());
        self.crossover_at(other, cut)
    }

    /// Swap the tails of two equal-length parents at `cut`, which must lie in `1..len`.
    ///
    /// `child1 = self[..cut] + other[cut..]`, `child2 = other[..cut] + self[cut..]`.
    pub fn crossover_at(
        &self,
        other: &Individual,
        cut: usize,
    ) -> Result<(Individual, Individual), EvolutionError> {
        self.check_same_length(other)?;
        if cut == 0 || cut >= self.len() {
            return Err(EvolutionError::InvalidParameter {
                name: "cut",
                reason: format!("cut point {} must lie in 1..{}", cut, self.len()),
            });
        }

        let (a_head, a_tail) = self.genes.split_at(cut);
        let (b_head, b_tail) = other.genes.split_at(cut);

        let child1 = a_head.iter().chain(b_tail).copied().collect();
        let child2 = b_head.iter().chain(a_tail).copied().collect();

        Ok((Individual::new(child1), Individual::new(child2)))
    }

    /// Return a copy where each gene is redrawn uniformly with probability `rate`.
    ///
    /// A redrawn gene may land on its old value.
    pub fn mutate<R: Rng + ?Sized>(&self, rate: f64, rng: &mut R) -> Individual {
        let genes = self
            .genes
            .iter()
            .map(|&gene| if rng.gen::<f64>() < rate { rng.gen() } else { gene })
            .collect();
        Individual::new(genes)
    }

    fn check_same_length(&self, other: &Individual) -> Result<(), EvolutionError> {
        if self.len() != other.len() {
            return Err(EvolutionError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<Move>> for Individual {
    fn from(genes: Vec<Move>) -> Self {
        Self::new(genes)
    }
}

impl FromIterator<Move> for Individual {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.genes.iter().map(Move::as_str).collect();
        write!(f, "[{}]", symbols.join(", "))
    }
}
