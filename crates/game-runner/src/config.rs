use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use twenty48_core::engine::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Uniform over legal moves
    #[default]
    Random,
    /// Fixed preference Down > Left > Right > Up
    Corner,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default = "defaults::num_games")]
    pub num_games: u32,
    /// Game `i` is seeded with `seed + i`.
    #[serde(default)]
    pub seed: u64,
    /// Stop a game after this many accepted moves.
    #[serde(default)]
    pub max_steps: Option<u64>,
    /// Continue after reaching the win target instead of stopping.
    #[serde(default = "defaults::keep_playing")]
    pub keep_playing: bool,
    #[serde(default)]
    pub policy: PolicyKind,

    #[serde(default)]
    pub board: GameConfig,
    #[serde(default)]
    pub report: Report,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Report {
    #[serde(default)]
    pub results_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_games: defaults::num_games(),
            seed: 0,
            max_steps: None,
            keep_playing: defaults::keep_playing(),
            policy: PolicyKind::default(),
            board: GameConfig::default(),
            report: Report::default(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(cfg)
    }
}

mod defaults {
    pub fn num_games() -> u32 {
        1
    }

    pub fn keep_playing() -> bool {
        true
    }
}
