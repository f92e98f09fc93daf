//! Monster instances

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::race::{MonsterRace, RaceId};
use crate::consts::{ENERGY_NEED, NORMAL_SPEED};
use crate::dungeon::Pos;

/// Slot index of a monster on the current floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct MonsterId(pub u32);

bitflags! {
    /// Relationship to the player
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SmartFlags: u8 {
        const PET = 0x01;
        const FRIENDLY = 0x02;
    }
}

bitflags! {
    /// Per-instance flags that persist across turns
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MonsterFlags2: u8 {
        /// Shapeshifter; its race changes from time to time
        const CHAMELEON = 0x01;
        /// Do not path towards the player by flow
        const NOFLOW = 0x02;
    }
}

/// Timed effects, counted down once per game turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonsterTimers {
    pub sleep: i32,
    pub fast: i32,
    pub slow: i32,
    pub stun: i32,
    pub confusion: i32,
    pub fear: i32,
}

impl MonsterTimers {
    /// Count every running timer down by one
    pub fn tick(&mut self) {
        for t in [
            &mut self.sleep,
            &mut self.fast,
            &mut self.slow,
            &mut self.stun,
            &mut self.confusion,
            &mut self.fear,
        ] {
            if *t > 0 {
                *t -= 1;
            }
        }
    }
}

/// A monster on the floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    /// Slot on the floor; assigned by [`crate::dungeon::Floor::add_monster`]
    pub id: MonsterId,
    pub race: RaceId,
    /// Race the monster appears to be
    pub ap_race: RaceId,
    pub pos: Pos,

    pub hp: i32,
    pub maxhp: i32,
    /// Maximum hit points before any drain
    pub max_maxhp: i32,

    /// Individual speed (110 = normal)
    pub mspeed: i16,
    /// Energy still needed before the next action
    pub energy_need: i16,

    pub timers: MonsterTimers,
    pub smart: SmartFlags,
    pub flags2: MonsterFlags2,

    /// The monster that summoned this one
    pub parent: Option<MonsterId>,
    /// Remembered target cell (another monster to fight)
    pub target: Option<Pos>,

    /// Distance to the player, refreshed by the view pass
    pub cdis: i32,
    /// Visible to the player
    pub ml: bool,

    pub nickname: Option<String>,
    /// Damage the player has dealt to it
    pub dealt_damage: i32,
}

impl Monster {
    pub fn new(race: RaceId, pos: Pos) -> Self {
        Self {
            id: MonsterId::default(),
            race,
            ap_race: race,
            pos,
            hp: 1,
            maxhp: 1,
            max_maxhp: 1,
            mspeed: NORMAL_SPEED,
            energy_need: ENERGY_NEED,
            timers: MonsterTimers::default(),
            smart: SmartFlags::empty(),
            flags2: MonsterFlags2::empty(),
            parent: None,
            target: None,
            cdis: 0,
            ml: false,
            nickname: None,
            dealt_damage: 0,
        }
    }

    /// A fresh monster of `race` with its hit points and speed set
    pub fn from_race(id: RaceId, race: &MonsterRace, pos: Pos, hp: i32, speed: i16) -> Self {
        let mut m = Self::new(id, pos);
        m.hp = hp;
        m.maxhp = hp;
        m.max_maxhp = hp;
        m.mspeed = speed;
        if race.misc.contains(super::race::MiscFlags::CHAMELEON) {
            m.flags2.insert(MonsterFlags2::CHAMELEON);
        }
        m
    }

    pub fn is_pet(&self) -> bool {
        self.smart.contains(SmartFlags::PET)
    }

    pub fn is_friendly(&self) -> bool {
        self.smart.contains(SmartFlags::FRIENDLY)
    }

    pub fn is_hostile(&self) -> bool {
        !self.smart.intersects(SmartFlags::PET | SmartFlags::FRIENDLY)
    }

    pub fn set_hostile(&mut self) {
        self.smart.remove(SmartFlags::PET | SmartFlags::FRIENDLY);
    }

    pub fn set_pet(&mut self) {
        self.smart.insert(SmartFlags::PET);
    }

    pub fn is_asleep(&self) -> bool {
        self.timers.sleep > 0
    }

    pub fn is_stunned(&self) -> bool {
        self.timers.stun > 0
    }

    pub fn is_confused(&self) -> bool {
        self.timers.confusion > 0
    }

    pub fn is_fearful(&self) -> bool {
        self.timers.fear > 0
    }

    /// Seen in its true form
    pub fn is_original_ap(&self) -> bool {
        self.race == self.ap_race
    }

    pub fn is_named_pet(&self) -> bool {
        self.is_pet() && self.nickname.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.hp < 0
    }

    /// Speed including temporary haste and slowness
    pub fn temporary_speed(&self) -> i16 {
        let mut speed = self.mspeed;
        if self.timers.fast > 0 {
            speed += 10;
        }
        if self.timers.slow > 0 {
            speed -= 2;
        }
        speed
    }

    /// Forget the per-turn target
    pub fn reset_target(&mut self) {
        self.target = None;
    }

    pub fn set_target(&mut self, pos: Pos) {
        self.target = Some(pos);
    }

    /// Display name, preferring a pet's nickname
    pub fn display_name(&self, race: &MonsterRace) -> String {
        match &self.nickname {
            Some(nick) => format!("{} called {}", race.name, nick),
            None => format!("the {}", race.name),
        }
    }
}

/// True if the two monsters would fight each other
pub fn are_enemies(a: &Monster, a_race: &MonsterRace, b: &Monster, b_race: &MonsterRace) -> bool {
    if a.id == b.id {
        return false;
    }
    a.is_hostile() != b.is_hostile() || a_race.opposes(b_race)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_monster_is_hostile_and_awake() {
        let m = Monster::new(RaceId(0), Pos::new(1, 1));
        assert!(m.is_hostile());
        assert!(!m.is_pet());
        assert!(!m.is_asleep());
        assert_eq!(m.energy_need, ENERGY_NEED);
    }

    #[test]
    fn test_temporary_speed() {
        let mut m = Monster::new(RaceId(0), Pos::new(1, 1));
        m.timers.fast = 5;
        assert_eq!(m.temporary_speed(), NORMAL_SPEED + 10);
        m.timers.slow = 5;
        assert_eq!(m.temporary_speed(), NORMAL_SPEED + 8);
    }

    #[test]
    fn test_timers_tick_to_zero() {
        let mut t = MonsterTimers {
            sleep: 1,
            stun: 2,
            ..Default::default()
        };
        t.tick();
        t.tick();
        t.tick();
        assert_eq!(t, MonsterTimers::default());
    }

    #[test]
    fn test_hostility_flags() {
        let mut m = Monster::new(RaceId(0), Pos::new(1, 1));
        m.set_pet();
        m.nickname = Some("Rex".into());
        assert!(m.is_named_pet());
        assert!(!m.is_hostile());
        m.set_hostile();
        assert!(m.is_hostile());
        assert!(!m.is_named_pet());
    }

    #[test]
    fn test_enemies() {
        let kobold = MonsterRace::new("K", "kobold", 1, NORMAL_SPEED, super::super::Dice::new(1, 1));
        let mut a = Monster::new(RaceId(0), Pos::new(1, 1));
        let mut b = Monster::new(RaceId(0), Pos::new(1, 2));
        b.id = MonsterId(1);
        assert!(!are_enemies(&a, &kobold, &b, &kobold));
        a.set_pet();
        assert!(are_enemies(&a, &kobold, &b, &kobold));
    }
}
