//! Engine module: N x N 2048 board, line/grid shift ops, and the game
//! lifecycle built on top of them.
//!
//! - `Grid` is the board with structural queries and random spawning.
//! - `transform_line` / `shift` are the pure slide-and-merge algorithm.
//! - `GameState` owns grid, score and status and applies moves atomically.

pub mod game;
mod ops;
pub mod state;

pub use game::{new_game, restart, GameConfig, GameState, MoveOutcome, Status};
pub use ops::{can_shift, shift, transform_line, LineShift, Shift};
pub use state::{Coord, Grid, Move, Score, Spawn, Tile};
