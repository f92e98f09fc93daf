//! World context (state outside the current floor)

use serde::{Deserialize, Serialize};

use crate::monster::MonsterId;

/// Session-wide state consulted by the scheduler and the light pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldContext {
    /// Game turn counter, advanced once per sweep
    pub game_turn: u64,

    /// Daylight on surface floors
    pub daytime: bool,

    /// The player is travelling the overworld map; floor monsters are frozen
    pub wild_mode: bool,

    /// Spectator mode (monster arena betting); the player is not a participant
    pub phase_out: bool,

    /// A monster has stopped time; monster light is suppressed while set
    pub timewalk: Option<MonsterId>,
}

impl WorldContext {
    pub fn is_wild_mode(&self) -> bool {
        self.wild_mode
    }

    pub fn is_phase_out(&self) -> bool {
        self.phase_out
    }

    pub fn is_daytime(&self) -> bool {
        self.daytime
    }
}
