//! umbra-core: monster turn scheduling, traps and monster light
//!
//! This crate contains the simulation core with no I/O beyond optional
//! JSON configuration loading. It is designed to be pure and testable:
//! every random draw goes through a seeded [`GameRng`].

pub mod action;
pub mod dungeon;
pub mod error;
pub mod monster;
pub mod player;
pub mod vision;
pub mod world;

mod consts;
mod gameloop;
mod rng;

#[cfg(test)]
mod test_support;

pub use consts::*;
pub use error::{EngineError, EngineResult};
pub use gameloop::{
    FloorChange, GameLoop, GameLoopResult, GameState, SoundCue, TickReport, UpdateFlags, capitalize,
};
pub use rng::GameRng;
