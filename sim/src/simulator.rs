use crate::grid::{GameState, Grid};
use rand::Rng;
use shared::{EvolutionError, Move, DEFAULT_GRID_SIZE, WIN_TILE};

/// Board dimensions and winning tile for simulated games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub grid_size: usize,
    pub win_tile: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            win_tile: WIN_TILE,
        }
    }
}

/// Result of replaying one move sequence on one board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    /// Strongest tile on the board when play stopped
    pub max_tile: u32,

    /// Moves that actually changed the board
    pub effective_moves: u32,

    /// State of the board when play stopped
    pub final_state: GameState,
}

/// Play `moves` in order on a fresh board.
///
/// Play stops as soon as the board is won or lost. A move that leaves the
/// board unchanged spawns nothing and is not counted.
pub fn simulate<R: Rng + ?Sized>(
    moves: &[Move],
    game: &GameConfig,
    rng: &mut R,
) -> Result<GameOutcome, EvolutionError> {
    replay(moves.iter().copied().map(Some), game, rng)
}

/// Like [`simulate`], but over raw symbols; unknown symbols are skipped.
pub fn simulate_symbols<S: AsRef<str>, R: Rng + ?Sized>(
    symbols: &[S],
    game: &GameConfig,
    rng: &mut R,
) -> Result<GameOutcome, EvolutionError> {
    replay(
        symbols.iter().map(|s| s.as_ref().parse::<Move>().ok()),
        game,
        rng,
    )
}

fn replay<I, R>(moves: I, game: &GameConfig, rng: &mut R) -> Result<GameOutcome, EvolutionError>
where
    I: IntoIterator<Item = Option<Move>>,
    R: Rng + ?Sized,
{
    let mut grid = Grid::new_game(game.grid_size, rng)?;
    Ok(play_on(&mut grid, moves.into_iter().flatten(), game.win_tile, rng))
}

/// Play `moves` on an existing board, updating it in place.
///
/// Only moves that change the board spawn a tile and count as effective.
pub fn play_on<I, R>(grid: &mut Grid, moves: I, win_tile: u32, rng: &mut R) -> GameOutcome
where
    I: IntoIterator<Item = Move>,
    R: Rng + ?Sized,
{
    let mut effective_moves = 0;
    let mut state = grid.game_state(win_tile);

    for direction in moves {
        if state != GameState::Continue {
            break;
        }

        let (next, changed) = grid.shift(direction);
        if changed {
            *grid = next;
            grid.add_two(rng);
            effective_moves += 1;
            state = grid.game_state(win_tile);
        }
    }

    GameOutcome {
        // Includes the seed tiles, so never 0 even when nothing moved
        max_tile: grid.max_tile(),
        effective_moves,
        final_state: state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::Individual;

    #[test]
    fn test_empty_sequence_reports_seed_tiles() {
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = simulate(&[], &GameConfig::default(), &mut rng).unwrap();

        assert_eq!(outcome.effective_moves, 0);
        assert!(outcome.max_tile == 2 || outcome.max_tile == 4);
        assert_eq!(outcome.final_state, GameState::Continue);
    }

    #[test]
    fn test_blocked_moves_neither_spawn_nor_count() {
        let mut rng = StdRng::seed_from_u64(12);
        let start = Grid::from_rows(vec![vec![2, 4], vec![0, 0]]).unwrap();
        let mut board = start.clone();

        let outcome = play_on(&mut board, [Move::Left, Move::Left, Move::Up], 2048, &mut rng);

        assert_eq!(outcome.effective_moves, 0);
        assert_eq!(outcome.max_tile, 4);
        assert_eq!(board, start);
    }

    #[test]
    fn test_effective_move_spawns_one_tile() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut board = Grid::from_rows(vec![vec![2, 4], vec![0, 0]]).unwrap();

        let outcome = play_on(&mut board, [Move::Down], 2048, &mut rng);

        assert_eq!(outcome.effective_moves, 1);
        assert_eq!(board.rows()[1], vec![2, 4]);
        assert_eq!(board.empty_cells().len(), 1);
    }

    #[test]
    fn test_invalid_symbols_are_skipped() {
        let mut rng = StdRng::seed_from_u64(2);
        let symbols = ["jump", "", "UP", "sideways"];
        let outcome = simulate_symbols(&symbols, &GameConfig::default(), &mut rng).unwrap();
        assert_eq!(outcome.effective_moves, 0);
        assert!(outcome.max_tile >= 2);
    }

    #[test]
    fn test_symbols_match_typed_moves() {
        let symbols = ["up", "bogus", "left", "down", "right", "left"];
        let typed = [Move::Up, Move::Left, Move::Down, Move::Right, Move::Left];
        let game = GameConfig::default();

        let from_symbols = simulate_symbols(&symbols, &game, &mut StdRng::seed_from_u64(8)).unwrap();
        let from_typed = simulate(&typed, &game, &mut StdRng::seed_from_u64(8)).unwrap();

        assert_eq!(from_symbols, from_typed);
    }

    #[test]
    fn test_tiny_grid_is_an_error() {
        let mut rng = StdRng::seed_from_u64(3);
        let game = GameConfig {
            grid_size: 1,
            ..Default::default()
        };
        let err = simulate(&[Move::Up], &game, &mut rng).unwrap_err();
        assert_eq!(err, EvolutionError::GridTooSmall { size: 1 });
    }

    #[test]
    fn test_low_target_stops_play() {
        // A 4 is reachable with a single merge, so play must stop early
        let game = GameConfig {
            grid_size: 2,
            win_tile: 4,
        };
        let mut rng = StdRng::seed_from_u64(4);
        let moves: Vec<Move> = Move::ALL.iter().copied().cycle().take(400).collect();

        for _ in 0..20 {
            let outcome = simulate(&moves, &game, &mut rng).unwrap();
            assert_ne!(outcome.final_state, GameState::Continue);
            assert!(outcome.effective_moves < 400);
        }
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let mut gen_rng = StdRng::seed_from_u64(10);
        let individual = Individual::random(300, &mut gen_rng);
        let game = GameConfig::default();

        let a = simulate(individual.genes(), &game, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = simulate(individual.genes(), &game, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_outcome_bounds(len in 0usize..200, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let individual = Individual::random(len, &mut rng);
            let outcome = simulate(individual.genes(), &GameConfig::default(), &mut rng).unwrap();

            prop_assert!(outcome.max_tile >= 2);
            prop_assert!(outcome.max_tile.is_power_of_two());
            prop_assert!(outcome.max_tile <= WIN_TILE);
            prop_assert!(outcome.effective_moves as usize <= len);
        }
    }
}
