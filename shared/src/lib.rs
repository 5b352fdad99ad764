pub mod genes;
pub mod protocol;

pub use genes::*;
pub use protocol::*;

/// Side length of the board in the classic game
pub const DEFAULT_GRID_SIZE: usize = 4;

/// Reaching this tile wins the game
pub const WIN_TILE: u32 = 2048;

/// Chance that a spawned tile is a 4 rather than a 2
pub const FOUR_PROBABILITY: f64 = 0.1;
