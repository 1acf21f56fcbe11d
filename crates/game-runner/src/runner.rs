use log::{debug, warn};
use rand::SeedableRng;
use serde::Serialize;
use twenty48_core::engine::{GameState, Status, Tile};

use crate::config::{Config, PolicyKind};
use crate::policy;

/// Per-game actor that drives a single board to completion by
/// asking the configured policy for moves.
pub struct GameActor {
    pub game_id: u32,
    pub seed: u64,
    pub state: GameState,
    pub policy: PolicyKind,
    pub max_steps: Option<u64>,
    pub keep_playing: bool,
    rng: rand::rngs::StdRng,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub game_id: u32,
    pub seed: u64,
    pub steps: u64,
    pub score: u64,
    pub highest_tile: Tile,
    pub status: Status,
    pub reached_target: bool,
}

impl GameActor {
    pub fn new(game_id: u32, seed: u64, config: &Config) -> Self {
        // Same RNG drives the opening tiles, spawns and the policy.
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let state = GameState::new(&config.board, &mut rng);
        Self {
            game_id,
            seed,
            state,
            policy: config.policy,
            max_steps: config.max_steps,
            keep_playing: config.keep_playing,
            rng,
        }
    }

    /// Run the actor loop to completion and return the result.
    pub fn run(mut self) -> GameResult {
        let mut steps: u64 = 0;

        loop {
            match self.state.status() {
                Status::Lost => break,
                Status::Won if self.keep_playing => {
                    if let Err(err) = self.state.continue_after_win() {
                        warn!("game {}: {err}", self.game_id);
                        break;
                    }
                    debug!("game {}: reached target at step {steps}, continuing", self.game_id);
                }
                Status::Won => break,
                Status::Playing => {}
            }
            if self.max_steps.is_some_and(|max| steps >= max) {
                debug!("game {}: step cap {steps} reached", self.game_id);
                break;
            }

            let legal = self.state.legal_moves();
            let Some(mv) = policy::select_move(self.policy, &legal, &mut self.rng) else {
                break;
            };
            let out = self.state.apply_move(mv, &mut self.rng);
            if !out.changed {
                // Legal mask said this move would change the board.
                warn!("game {}: move {mv} was rejected at step {steps}", self.game_id);
                break;
            }
            steps += 1;
        }

        GameResult {
            game_id: self.game_id,
            seed: self.seed,
            steps,
            score: self.state.score(),
            highest_tile: self.state.grid().highest_tile(),
            status: self.state.status(),
            reached_target: self.state.target_reached(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twenty48_core::engine::GameConfig;

    fn config(policy: PolicyKind) -> Config {
        Config {
            policy,
            ..Config::default()
        }
    }

    #[test]
    fn game_runs_until_lost() {
        let result = GameActor::new(0, 17, &config(PolicyKind::Random)).run();
        assert_eq!(result.status, Status::Lost);
        assert!(result.steps > 0);
        assert!(result.score > 0);
        assert!(result.highest_tile >= 8);
    }

    #[test]
    fn same_seed_same_result() {
        let cfg = config(PolicyKind::Corner);
        let a = GameActor::new(1, 99, &cfg).run();
        let b = GameActor::new(1, 99, &cfg).run();
        assert_eq!(a, b);
    }

    #[test]
    fn step_cap_stops_game() {
        let cfg = Config {
            max_steps: Some(5),
            ..config(PolicyKind::Random)
        };
        let result = GameActor::new(2, 3, &cfg).run();
        assert_eq!(result.steps, 5);
        assert_eq!(result.status, Status::Playing);
    }

    #[test]
    fn stops_on_win_unless_keep_playing() {
        // A 3x3 board of only 2s always has a merge, so target 4 is always reached.
        let board = GameConfig::new(3, 4).unwrap();
        let stop = Config {
            board,
            keep_playing: false,
            ..config(PolicyKind::Corner)
        };
        let result = GameActor::new(3, 5, &stop).run();
        assert_eq!(result.status, Status::Won);
        assert!(result.reached_target);

        let go_on = Config {
            board,
            keep_playing: true,
            ..config(PolicyKind::Corner)
        };
        let result = GameActor::new(3, 5, &go_on).run();
        assert_eq!(result.status, Status::Lost);
        assert!(result.reached_target);
        assert!(result.highest_tile >= 4);
    }
}
