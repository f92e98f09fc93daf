//! What the player has learned about each race

use bitflags::bitflags;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::race::RaceId;

bitflags! {
    /// Abilities the player has seen a race use
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LoreFlags: u8 {
        const MULTIPLY = 0x01;
        const SPECIAL = 0x02;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RaceLore {
    /// Times the player has seen one wake up
    pub wake: u8,
    pub learned: LoreFlags,
}

/// Lore for every race the player has observed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lore {
    races: HashMap<RaceId, RaceLore>,
}

impl Lore {
    pub fn get(&self, race: RaceId) -> RaceLore {
        self.races.get(&race).copied().unwrap_or_default()
    }

    /// Count a wake-up, saturating at `cap`
    pub fn note_wake(&mut self, race: RaceId, cap: u8) {
        let entry = self.races.entry(race).or_default();
        if entry.wake < cap {
            entry.wake += 1;
        }
    }

    pub fn learn(&mut self, race: RaceId, flag: LoreFlags) {
        self.races.entry(race).or_default().learned.insert(flag);
    }

    pub fn knows(&self, race: RaceId, flag: LoreFlags) -> bool {
        self.get(race).learned.contains(flag)
    }
}
