//! twenty48-core: rule engine for the 2048 sliding-tile puzzle
//!
//! This crate provides:
//! - A square `Grid` of any side length >= 2 with spawn and terminal-state scans
//! - The slide/merge transform (`engine::transform_line`, `engine::shift`)
//! - `GameState`, which applies moves, accumulates score and tracks win/loss
//!
//! Randomness is always passed in, so seeded RNGs give reproducible games.
//!
//! Quick start:
//! ```
//! use twenty48_core::engine::{new_game, Move, Status};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut game = new_game(4, 2048, &mut rng).unwrap();
//!
//! // Play until nothing moves or the game ends (keep doctests fast)
//! let mut moves = 0u32;
//! while game.status() == Status::Playing && moves < 8 {
//!     let out = game.apply_move(Move::ALL[moves as usize % 4], &mut rng);
//!     if out.changed {
//!         assert!(out.spawned.is_some());
//!     }
//!     moves += 1;
//! }
//! let _final_score = game.score();
//! ```
//!
pub mod engine;
pub mod error;

pub use error::{EngineError, Result};
