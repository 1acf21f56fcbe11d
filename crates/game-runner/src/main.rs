mod config;
mod policy;
mod runner;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use config::Config;
use runner::{GameActor, GameResult};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play seeded 2048 games headlessly and report results")]
struct Args {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long, value_name = "FILE", value_parser = clap::value_parser!(PathBuf))]
    config: Option<PathBuf>,

    /// Override the number of games to play
    #[arg(long, value_name = "N")]
    games: Option<u32>,

    /// Override the base seed
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Write one JSON line per game to this file
    #[arg(long, value_name = "FILE")]
    results: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = match &args.config {
        Some(path) => {
            info!("Using configuration file: {}", path.display());
            Config::from_toml(path)?
        }
        None => Config::default(),
    };
    if let Some(n) = args.games {
        config.num_games = n;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(path) = args.results {
        config.report.results_file = Some(path);
    }

    let mut writer = match &config.report.results_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    info!(
        "Playing {} game(s) on {}x{} board, target {}, policy {:?}",
        config.num_games,
        config.board.size(),
        config.board.size(),
        config.board.win_target(),
        config.policy
    );

    let mut results: Vec<GameResult> = Vec::with_capacity(config.num_games as usize);
    for game_id in 0..config.num_games {
        let seed = config.seed.wrapping_add(u64::from(game_id));
        let result = GameActor::new(game_id, seed, &config).run();
        info!(
            "game {} (seed {}): {:?} after {} moves, score {}, highest tile {}",
            result.game_id, result.seed, result.status, result.steps, result.score, result.highest_tile
        );
        if let Some(w) = writer.as_mut() {
            serde_json::to_writer(&mut *w, &result).context("failed to encode result")?;
            writeln!(w).context("failed to write results")?;
        }
        results.push(result);
    }

    if let Some(mut w) = writer {
        w.flush().context("failed to flush results")?;
    }

    if !results.is_empty() {
        let total: u64 = results.iter().map(|r| r.score).sum();
        let best = results.iter().map(|r| r.score).max().unwrap_or(0);
        let wins = results.iter().filter(|r| r.reached_target).count();
        info!(
            "Completed {} game(s): mean score {:.1}, best {}, reached target {}/{}",
            results.len(),
            total as f64 / results.len() as f64,
            best,
            wins,
            results.len()
        );
    }
    Ok(())
}
