use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Coord, Grid, Move, Score, Spawn, Tile};
use crate::error::{EngineError, Result};

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Playing,
    /// The win target appeared; moves are rejected until `continue_after_win`.
    Won,
    /// No empty cell and no mergeable neighbors. Final until restart.
    Lost,
}

/// Board size and win target for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig")]
pub struct GameConfig {
    size: usize,
    win_target: Tile,
}

#[derive(Deserialize)]
struct RawGameConfig {
    #[serde(default = "defaults::size")]
    size: usize,
    #[serde(default = "defaults::win_target")]
    win_target: Tile,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = EngineError;

    fn try_from(raw: RawGameConfig) -> Result<Self> {
        GameConfig::new(raw.size, raw.win_target)
    }
}

impl GameConfig {
    pub const DEFAULT_WIN_TARGET: Tile = 2048;

    /// Validate `size >= 2` and `win_target` a power of two >= 4.
    pub fn new(size: usize, win_target: Tile) -> Result<Self> {
        if size < Grid::MIN_SIZE {
            return Err(EngineError::InvalidConfig(format!(
                "board size must be at least {}, got {size}",
                Grid::MIN_SIZE
            )));
        }
        if win_target < 4 || !win_target.is_power_of_two() {
            return Err(EngineError::InvalidConfig(format!(
                "win target must be a power of two >= 4, got {win_target}"
            )));
        }
        Ok(GameConfig { size, win_target })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn win_target(&self) -> Tile {
        self.win_target
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            size: defaults::size(),
            win_target: defaults::win_target(),
        }
    }
}

mod defaults {
    use super::{Grid, GameConfig, Tile};

    pub fn size() -> usize {
        Grid::DEFAULT_SIZE
    }

    pub fn win_target() -> Tile {
        GameConfig::DEFAULT_WIN_TARGET
    }
}

/// What a single `apply_move` call did.
///
/// `merged` and `spawned` carry enough for a host to mark merged and new
/// tiles; the engine keeps no record of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub changed: bool,
    pub score_gained: Score,
    pub spawned: Option<Spawn>,
    pub merged: Vec<Coord>,
    pub status: Status,
}

impl MoveOutcome {
    fn rejected(status: Status) -> Self {
        MoveOutcome {
            changed: false,
            score_gained: 0,
            spawned: None,
            merged: Vec::new(),
            status,
        }
    }
}

/// Complete state of one game session.
///
/// Every mutation goes through `apply_move`, `continue_after_win` or
/// `reset`; each either commits fully or leaves the state untouched.
///
/// Deserializing re-checks the saved state: the grid must match the
/// configured size, `Won` implies the target is on the board, `Lost` implies
/// no move is left, and a `Playing` state is re-evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameState")]
pub struct GameState {
    grid: Grid,
    score: Score,
    status: Status,
    config: GameConfig,
    /// Latched once the win target has been reached in this game.
    target_reached: bool,
}

#[derive(Deserialize)]
struct RawGameState {
    grid: Grid,
    score: Score,
    status: Status,
    config: GameConfig,
    #[serde(default)]
    target_reached: bool,
}

impl TryFrom<RawGameState> for GameState {
    type Error = EngineError;

    fn try_from(raw: RawGameState) -> Result<Self> {
        if raw.grid.size() != raw.config.size {
            return Err(EngineError::InvalidConfig(format!(
                "saved grid is {0}x{0} but the board size is {1}",
                raw.grid.size(),
                raw.config.size
            )));
        }
        match raw.status {
            Status::Won if !raw.grid.has_value(raw.config.win_target) => {
                return Err(EngineError::InvalidConfig(format!(
                    "saved as won but no {} tile on the board",
                    raw.config.win_target
                )));
            }
            Status::Lost if raw.grid.has_any_mergeable_neighbor() => {
                return Err(EngineError::InvalidConfig(
                    "saved as lost but moves remain".to_string(),
                ));
            }
            _ => {}
        }
        let mut state = GameState {
            target_reached: raw.target_reached || raw.status == Status::Won,
            grid: raw.grid,
            score: raw.score,
            status: raw.status,
            config: raw.config,
        };
        state.evaluate_status();
        Ok(state)
    }
}

impl GameState {
    /// Start a game: empty board plus two random tiles.
    ///
    /// ```
    /// use twenty48_core::engine::{GameConfig, GameState, Status};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let game = GameState::new(&GameConfig::default(), &mut rng);
    /// assert_eq!(game.grid().count_empty(), 14);
    /// assert_eq!(game.score(), 0);
    /// assert_eq!(game.status(), Status::Playing);
    /// ```
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let mut grid = Grid::empty(config.size);
        grid.spawn_random(rng);
        grid.spawn_random(rng);
        let mut state = GameState {
            grid,
            score: 0,
            status: Status::Playing,
            config: *config,
            target_reached: false,
        };
        state.evaluate_status();
        debug!(
            "new {0}x{0} game, win target {1}",
            config.size, config.win_target
        );
        state
    }

    /// Wrap an existing grid (e.g. a restored save) and evaluate its status.
    pub fn from_grid(grid: Grid, score: Score, win_target: Tile) -> Result<Self> {
        let config = GameConfig::new(grid.size(), win_target)?;
        let mut state = GameState {
            grid,
            score,
            status: Status::Playing,
            config,
            target_reached: false,
        };
        state.evaluate_status();
        Ok(state)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// True once the win target has appeared, even after continuing.
    pub fn target_reached(&self) -> bool {
        self.target_reached
    }

    /// True while moves are accepted.
    pub fn is_playing(&self) -> bool {
        self.status == Status::Playing
    }

    /// Which directions would change the board, in `Move::ALL` order.
    ///
    /// All false unless the game is `Playing`.
    pub fn legal_moves(&self) -> [bool; 4] {
        let mut mask = [false; 4];
        if self.is_playing() {
            for (slot, dir) in mask.iter_mut().zip(Move::ALL) {
                *slot = self.grid.can_shift(dir);
            }
        }
        mask
    }

    /// Slide the board in `direction`, spawn a tile if anything moved, then
    /// check for loss and win.
    ///
    /// A move that changes nothing, or any move while `Lost` or `Won`
    /// (without `continue_after_win`), is a no-op with `changed == false`.
    pub fn apply_move<R: Rng + ?Sized>(&mut self, direction: Move, rng: &mut R) -> MoveOutcome {
        if !self.is_playing() {
            debug!("move {direction} rejected in status {:?}", self.status);
            return MoveOutcome::rejected(self.status);
        }

        let shifted = self.grid.shift(direction);
        if !shifted.changed {
            return MoveOutcome::rejected(self.status);
        }

        let mut grid = shifted.grid;
        let spawned = grid.spawn_random(rng);
        self.grid = grid;
        self.score += shifted.score;
        self.evaluate_status();

        MoveOutcome {
            changed: true,
            score_gained: shifted.score,
            spawned,
            merged: shifted.merged,
            status: self.status,
        }
    }

    /// Re-run the terminal checks on the current grid.
    ///
    /// Loss takes precedence. A win is declared only the first time the
    /// target appears; after `continue_after_win` the game can still be lost.
    /// Does nothing once the game is terminal.
    pub fn evaluate_status(&mut self) -> Status {
        if self.status != Status::Playing {
            return self.status;
        }
        if !self.grid.has_any_mergeable_neighbor() {
            debug!("no moves left, final score {}", self.score);
            self.status = Status::Lost;
        } else if !self.target_reached && self.grid.has_value(self.config.win_target) {
            debug!("reached {} with score {}", self.config.win_target, self.score);
            self.target_reached = true;
            self.status = Status::Won;
        }
        self.status
    }

    /// Keep playing after a win, leaving grid and score as they are.
    pub fn continue_after_win(&mut self) -> Result<()> {
        if self.status != Status::Won {
            return Err(EngineError::InvalidTransition(format!(
                "can only continue a won game, status is {:?}",
                self.status
            )));
        }
        self.status = Status::Playing;
        debug!("continuing after win at score {}", self.score);
        Ok(())
    }

    /// Discard this game and start over with the same configuration.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = GameState::new(&self.config, rng);
    }
}

/// Start a new game, validating `size` and `win_target`.
pub fn new_game<R: Rng + ?Sized>(size: usize, win_target: Tile, rng: &mut R) -> Result<GameState> {
    let config = GameConfig::new(size, win_target)?;
    Ok(GameState::new(&config, rng))
}

/// Same as `new_game`; the caller drops its previous state.
pub fn restart<R: Rng + ?Sized>(size: usize, win_target: Tile, rng: &mut R) -> Result<GameState> {
    new_game(size, win_target, rng)
}
