//! The player record consumed by the simulation core

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::stats::Stats;
use crate::consts::NORMAL_SPEED;
use crate::dungeon::Pos;
use crate::monster::MonsterId;

bitflags! {
    /// Intrinsic and equipment-granted abilities
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PlayerFlags: u16 {
        const LEVITATION = 0x0001;
        const FREE_ACT = 0x0002;
        /// Sees in the dark without light
        const SEE_NOCTO = 0x0004;
        /// Cloak of shadows: monsters may fail to notice the player
        const SUPER_STEALTH = 0x0008;
        /// Wakes and angers everything nearby
        const AGGRAVATE = 0x0010;
        /// Lazy personality: monsters hit a little more often
        const LAZY = 0x0020;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PlayerResists: u8 {
        const POIS = 0x01;
        const BLIND = 0x02;
        const CONF = 0x04;
    }
}

bitflags! {
    /// Standing magical barriers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct HexFlags: u8 {
        /// Stops monsters from multiplying
        const ANTI_MULTI = 0x01;
    }
}

/// Timed bad statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerTimers {
    pub cut: i32,
    pub poisoned: i32,
    pub blind: i32,
    pub confused: i32,
    pub paralyzed: i32,
    pub slow: i32,
    pub stun: i32,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Pos,
    pub level: i32,
    pub hp: i32,
    pub mhp: i32,

    /// Base armour class and magical bonus
    pub ac: i32,
    pub to_a: i32,
    pub speed: i16,
    /// Positive is good, negative evil
    pub alignment: i32,
    /// Stealth skill
    pub skill_stl: i32,
    pub riding_skill: i32,
    /// Radius of the carried light
    pub light_radius: i32,

    pub flags: PlayerFlags,
    pub resist: PlayerResists,
    pub hex: HexFlags,
    pub timed: PlayerTimers,
    pub stats: Stats,

    /// Mount, if riding
    pub riding: Option<MonsterId>,

    /// Standing in monster light this pass and the previous one
    pub monlite: bool,
    pub old_monlite: bool,

    /// Monsters cannot reach the player by flow this turn
    pub no_flowed: bool,

    pub compassion: i32,

    pub is_dead: bool,
    pub died_from: Option<String>,
    /// Leaving the floor at the end of this sweep
    pub leaving: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Pos::default(),
            level: 1,
            hp: 20,
            mhp: 20,
            ac: 10,
            to_a: 0,
            speed: NORMAL_SPEED,
            alignment: 0,
            skill_stl: 2,
            riding_skill: 0,
            light_radius: 1,
            flags: PlayerFlags::empty(),
            resist: PlayerResists::empty(),
            hex: HexFlags::empty(),
            timed: PlayerTimers::default(),
            stats: Stats::default(),
            riding: None,
            monlite: false,
            old_monlite: false,
            no_flowed: false,
            compassion: 0,
            is_dead: false,
            died_from: None,
            leaving: false,
        }
    }
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }

    pub fn has(&self, flag: PlayerFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn resists(&self, resist: PlayerResists) -> bool {
        self.resist.contains(resist)
    }

    pub fn is_levitating(&self) -> bool {
        self.has(PlayerFlags::LEVITATION)
    }

    pub fn has_free_action(&self) -> bool {
        self.has(PlayerFlags::FREE_ACT)
    }

    pub fn has_aggravation(&self) -> bool {
        self.has(PlayerFlags::AGGRAVATE)
    }

    pub fn has_super_stealth(&self) -> bool {
        self.has(PlayerFlags::SUPER_STEALTH)
    }

    pub fn is_lazy(&self) -> bool {
        self.has(PlayerFlags::LAZY)
    }

    pub fn is_riding(&self) -> bool {
        self.riding.is_some()
    }

    /// Armour value used by the hit check
    pub fn total_armour(&self) -> i32 {
        self.ac + self.to_a
    }

    /// Shift a virtue score
    pub fn change_compassion(&mut self, amount: i32) {
        self.compassion = (self.compassion + amount).clamp(-125, 125);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_player() {
        let p = Player::new(Pos::new(3, 4));
        assert_eq!(p.pos, Pos::new(3, 4));
        assert!(!p.is_riding());
        assert!(!p.is_dead);
        assert_eq!(p.total_armour(), 10);
    }

    #[test]
    fn test_flags() {
        let mut p = Player::default();
        p.flags |= PlayerFlags::LEVITATION | PlayerFlags::AGGRAVATE;
        assert!(p.is_levitating());
        assert!(p.has_aggravation());
        assert!(!p.has_free_action());
    }

    #[test]
    fn test_compassion_clamped() {
        let mut p = Player::default();
        p.change_compassion(-500);
        assert_eq!(p.compassion, -125);
    }
}
