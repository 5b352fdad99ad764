use rand::seq::SliceRandom;
use rand::Rng;
use shared::{EvolutionError, Move, FOUR_PROBABILITY};

/// Outcome of inspecting a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Continue,
    Win,
    Lose,
}

/// Square board of tile values, 0 meaning empty.
///
/// Every non-zero cell holds a power of two >= 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<u32>>,
}

impl Grid {
    /// Create an empty board
    pub fn empty(size: usize) -> Self {
        Grid {
            size,
            cells: vec![vec![0; size]; size],
        }
    }

    /// Build a board from explicit rows (row-major, top row first)
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, EvolutionError> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return Err(EvolutionError::InvalidParameter {
                name: "rows",
                reason: "board must be square".to_string(),
            });
        }
        if let Some(bad) = rows
            .iter()
            .flatten()
            .find(|&&tile| tile != 0 && (tile < 2 || !tile.is_power_of_two()))
        {
            return Err(EvolutionError::InvalidParameter {
                name: "rows",
                reason: format!("tile {} is not a power of two >= 2", bad),
            });
        }
        Ok(Grid { size, cells: rows })
    }

    /// Start a game: an empty board seeded with two random tiles
    pub fn new_game<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, EvolutionError> {
        if size < 2 {
            return Err(EvolutionError::GridTooSmall { size });
        }
        let mut grid = Grid::empty(size);
        grid.add_two(rng);
        grid.add_two(rng);
        Ok(grid)
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.cells
    }

    /// Positions of all empty cells, row-major
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut empty = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, &tile) in row.iter().enumerate() {
                if tile == 0 {
                    empty.push((r, c));
                }
            }
        }
        empty
    }

    /// Highest tile on the board (0 for an empty board)
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Drop a 2 (or, rarely, a 4) on a uniformly chosen empty cell.
    ///
    /// A full board is left untouched.
    pub fn add_two<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(&(r, c)) = self.empty_cells().choose(rng) else {
            return;
        };
        self.cells[r][c] = if rng.gen::<f64>() < FOUR_PROBABILITY {
            4
        } else {
            2
        };
    }

    /// Slide every tile toward `direction`, merging equal neighbours once.
    ///
    /// Returns the resulting board and whether anything moved.
    pub fn shift(&self, direction: Move) -> (Grid, bool) {
        let mut next = self.clone();

        for line in 0..self.size {
            let coords = line_coords(direction, line, self.size);
            let tiles: Vec<u32> = coords.iter().map(|&(r, c)| self.cells[r][c]).collect();
            let collapsed = collapse_line(&tiles);
            for (&(r, c), tile) in coords.iter().zip(collapsed) {
                next.cells[r][c] = tile;
            }
        }

        let changed = next.cells != self.cells;
        (next, changed)
    }

    /// Classify the board against `win_tile`.
    ///
    /// A win is checked first, so a full board holding the target tile wins.
    pub fn game_state(&self, win_tile: u32) -> GameState {
        if self.max_tile() >= win_tile {
            return GameState::Win;
        }
        if !self.empty_cells().is_empty() {
            return GameState::Continue;
        }
        if Move::ALL.iter().any(|&m| self.shift(m).1) {
            GameState::Continue
        } else {
            GameState::Lose
        }
    }
}

/// Cells of one row or column, ordered from the edge tiles slide toward
fn line_coords(direction: Move, line: usize, size: usize) -> Vec<(usize, usize)> {
    match direction {
        Move::Left => (0..size).map(|c| (line, c)).collect(),
        Move::Right => (0..size).rev().map(|c| (line, c)).collect(),
        Move::Up => (0..size).map(|r| (r, line)).collect(),
        Move::Down => (0..size).rev().map(|r| (r, line)).collect(),
    }
}

/// Compact a line toward index 0, merging each equal pair at most once
fn collapse_line(line: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(line.len());
    let mut pending: Option<u32> = None;

    for &tile in line.iter().filter(|&&t| t != 0) {
        match pending {
            Some(prev) if prev == tile => {
                out.push(prev * 2);
                pending = None;
            }
            Some(prev) => {
                out.push(prev);
                pending = Some(tile);
            }
            None => pending = Some(tile),
        }
    }
    out.extend(pending);
    out.resize(line.len(), 0);
    out
}
