//! Headless umbra runner
//!
//! Builds a small demonstration floor, lets the player wander it for a
//! number of ticks and prints what happened.

mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use umbra_core::action::{ActionResult, move_player};
use umbra_core::dungeon::DIRECTIONS;
use umbra_core::world::{EngineOptions, Registry};
use umbra_core::{GameLoop, GameLoopResult};

/// Run the monster scheduler on a demonstration floor
#[derive(Parser, Debug)]
#[command(name = "umbra-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Random seed
    #[arg(short = 's', long = "seed", default_value_t = 42)]
    seed: u64,

    /// Number of ticks to run
    #[arg(short = 'n', long = "ticks", default_value_t = 200)]
    ticks: u32,

    /// Dungeon level of the floor
    #[arg(short = 'd', long = "depth", default_value_t = 5)]
    depth: i32,

    /// Engine options JSON file
    #[arg(long = "options")]
    options: Option<PathBuf>,

    /// Directory with terrain.json, races.json, dungeons.json and traps.json
    #[arg(long = "data")]
    data: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let registry = match &args.data {
        Some(dir) => Registry::load_from_dir(dir)
            .with_context(|| format!("loading catalogs from {}", dir.display()))?,
        None => Registry::standard()?,
    };
    let mut state = demo::build(Arc::new(registry), args.seed, args.depth)?;
    if let Some(path) = &args.options {
        state.options = EngineOptions::load_from_file(path)
            .with_context(|| format!("loading options from {}", path.display()))?;
    }
    tracing::info!(seed = args.seed, ticks = args.ticks, "starting simulation");

    let mut game = GameLoop::new(state);
    let mut dispatched = 0usize;
    for _ in 0..args.ticks {
        let state = game.state_mut();
        let dir = state.rng.rn2(DIRECTIONS.len() as i32) as usize;
        if let ActionResult::Died(killer) = move_player(state, DIRECTIONS[dir]) {
            tracing::info!(%killer, "player died on the move");
        }

        let report = game.tick();
        dispatched += report.sweep.dispatched.len();
        let state = game.state_mut();
        let turn = state.world.game_turn;
        for msg in state.take_messages() {
            println!("[{turn:>4}] {msg}");
        }

        match report.result {
            GameLoopResult::Continue => {}
            GameLoopResult::PlayerDied(killer) => {
                println!("You were killed by {killer}.");
                break;
            }
            GameLoopResult::FloorChange(change) => {
                println!("The floor changes ({change}).");
                break;
            }
            GameLoopResult::Stopped => break,
        }
    }

    let state = game.into_state();
    println!(
        "{} turns, {} monster turns, {} monsters left, player hp {}/{}",
        state.world.game_turn,
        dispatched,
        state.floor.monster_count(),
        state.player.hp,
        state.player.mhp
    );
    for entry in &state.diary {
        println!("diary: {entry}");
    }
    Ok(())
}
