//! Monster races
//!
//! A race is the static template shared by every monster of a kind. Flags are
//! split into small typed groups so call sites ask `race.kind.contains(..)`
//! rather than testing raw bits.

use bitflags::bitflags;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::consts::{MONSTER_MAXHP, NORMAL_SPEED};
use crate::error::{EngineError, EngineResult};
use crate::rng::GameRng;

/// Index into the [`RaceRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct RaceId(pub u16);

/// `num`d`sides` dice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dice {
    pub num: i32,
    pub sides: i32,
}

impl Dice {
    pub const fn new(num: i32, sides: i32) -> Self {
        Self { num, sides }
    }

    pub fn roll(self, rng: &mut GameRng) -> i32 {
        rng.dice(self.num, self.sides)
    }

    pub const fn max_roll(self) -> i32 {
        self.num * self.sides
    }
}

bitflags! {
    /// What a monster is
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct KindFlags: u16 {
        const UNIQUE = 0x0001;
        const EVIL = 0x0002;
        const GOOD = 0x0004;
        const UNDEAD = 0x0008;
        const ANIMAL = 0x0010;
        /// Exists in several places at once; may collapse or blink
        const QUANTUM = 0x0020;
    }
}

bitflags! {
    /// Population groups with special rules
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PopulationFlags: u8 {
        const NAZGUL = 0x01;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MiscFlags: u16 {
        const MULTIPLY = 0x0001;
        /// Can be ridden by the player
        const RIDING = 0x0002;
        /// Always spawns with maximum hit points
        const FORCE_MAXHP = 0x0004;
        /// Changes shape from time to time
        const CHAMELEON = 0x0008;
        /// Appears in groups and hunts as a pack
        const FRIENDS = 0x0010;
        /// Monsters it summons vanish once it is gone
        const KILL_CHILDREN = 0x0020;
    }
}

bitflags! {
    /// Light and darkness emitted by a monster
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct BrightnessFlags: u8 {
        const HAS_LITE_1 = 0x01;
        const HAS_LITE_2 = 0x02;
        const HAS_DARK_1 = 0x04;
        const HAS_DARK_2 = 0x08;
        const SELF_LITE_1 = 0x10;
        const SELF_LITE_2 = 0x20;
        const SELF_DARK_1 = 0x40;
        const SELF_DARK_2 = 0x80;
    }
}

impl BrightnessFlags {
    /// Every flag that emits light or darkness
    pub const EMITTING: BrightnessFlags = BrightnessFlags::all();
    pub const SELF_LITE: BrightnessFlags =
        BrightnessFlags::SELF_LITE_1.union(BrightnessFlags::SELF_LITE_2);
    pub const SELF_DARK: BrightnessFlags =
        BrightnessFlags::SELF_DARK_1.union(BrightnessFlags::SELF_DARK_2);

    /// Net light radius: positive lights, negative darkens
    pub fn radius(self) -> i32 {
        let mut rad = 0;
        if self.intersects(BrightnessFlags::HAS_LITE_1 | BrightnessFlags::SELF_LITE_1) {
            rad += 1;
        }
        if self.intersects(BrightnessFlags::HAS_LITE_2 | BrightnessFlags::SELF_LITE_2) {
            rad += 2;
        }
        if self.intersects(BrightnessFlags::HAS_DARK_1 | BrightnessFlags::SELF_DARK_1) {
            rad -= 1;
        }
        if self.intersects(BrightnessFlags::HAS_DARK_2 | BrightnessFlags::SELF_DARK_2) {
            rad -= 2;
        }
        rad
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ResistFlags: u8 {
        /// Resists everything, including alignment pressure
        const RESIST_ALL = 0x01;
        const POIS = 0x02;
        const CONF = 0x04;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AbilityFlags: u8 {
        /// Has a race-specific special action
        const SPECIAL = 0x01;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MoveFlags: u8 {
        const PASS_WALL = 0x01;
        const CAN_SWIM = 0x02;
        const CAN_FLY = 0x04;
        const OPEN_DOOR = 0x08;
        const BASH_DOOR = 0x10;
        const NEVER_MOVE = 0x20;
    }
}

bitflags! {
    /// Summon groups a race can be called up by
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SummonFlags: u8 {
        const MOLD = 0x01;
        const BIRD = 0x02;
        const ELEMENTAL = 0x04;
        const HORROR = 0x08;
        const PIRANHA = 0x10;
        const ARMAGE_GOOD = 0x20;
        const ARMAGE_EVIL = 0x40;
    }
}

/// What a summon asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum SummonKind {
    /// Any non-unique monster
    Any,
    Undead,
    Mold,
    Bird,
    Elemental,
    Horror,
    Piranha,
    ArmageddonGood,
    ArmageddonEvil,
}

impl SummonKind {
    /// True if `race` answers this summon
    pub fn accepts(self, race: &MonsterRace) -> bool {
        if race.kind.contains(KindFlags::UNIQUE) {
            return false;
        }
        let tag = match self {
            SummonKind::Any => return !race.kind.contains(KindFlags::QUANTUM),
            SummonKind::Undead => return race.kind.contains(KindFlags::UNDEAD),
            SummonKind::Mold => SummonFlags::MOLD,
            SummonKind::Bird => SummonFlags::BIRD,
            SummonKind::Elemental => SummonFlags::ELEMENTAL,
            SummonKind::Horror => SummonFlags::HORROR,
            SummonKind::Piranha => SummonFlags::PIRANHA,
            SummonKind::ArmageddonGood => SummonFlags::ARMAGE_GOOD,
            SummonKind::ArmageddonEvil => SummonFlags::ARMAGE_EVIL,
        };
        race.summon.contains(tag)
    }
}

/// Race-specific behaviour that does not fit a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceSpecial {
    /// Loses a hit point every turn and bursts at zero
    Grenade,
    /// Grows molds around itself
    MoldMaster,
}

/// Effect of a melee blow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum BlowEffect {
    Hurt,
    Poison,
    Confuse,
    Paralyze,
    LoseStr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blow {
    pub effect: BlowEffect,
    pub dice: Dice,
}

/// Innate spells and breaths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterSpell {
    Blink,
    Bolt(Dice),
    Ball(Dice),
    Heal,
    Shriek,
    Confuse,
    Slow,
    Summon(SummonKind),
}

impl MonsterSpell {
    /// Spells that can be aimed at another monster
    pub const fn targets_monsters(self) -> bool {
        matches!(
            self,
            MonsterSpell::Bolt(_) | MonsterSpell::Ball(_) | MonsterSpell::Confuse | MonsterSpell::Slow
        )
    }
}

/// Static monster template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterRace {
    pub tag: String,
    #[serde(default)]
    pub name: String,
    pub level: i32,
    #[serde(default = "default_speed")]
    pub speed: i16,
    pub hit_dice: Dice,
    #[serde(default)]
    pub armour: i32,
    /// Area awareness: distance at which the monster notices the player
    #[serde(default = "default_aaf")]
    pub aaf: i32,
    /// Initial sleepiness
    #[serde(default)]
    pub sleep: i32,
    /// Percent chance per turn to use a spell
    #[serde(default)]
    pub freq_spell: i32,

    #[serde(default)]
    pub kind: KindFlags,
    #[serde(default)]
    pub population: PopulationFlags,
    #[serde(default)]
    pub misc: MiscFlags,
    #[serde(default)]
    pub brightness: BrightnessFlags,
    #[serde(default)]
    pub resist: ResistFlags,
    #[serde(default)]
    pub ability: AbilityFlags,
    #[serde(default)]
    pub movement: MoveFlags,
    #[serde(default)]
    pub summon: SummonFlags,

    #[serde(default)]
    pub special: Option<RaceSpecial>,
    #[serde(default)]
    pub blows: Vec<Blow>,
    #[serde(default)]
    pub spells: Vec<MonsterSpell>,
}

fn default_speed() -> i16 {
    NORMAL_SPEED
}

fn default_aaf() -> i32 {
    20
}

impl MonsterRace {
    /// A plain race with no flags, blows or spells
    pub fn new(tag: &str, name: &str, level: i32, speed: i16, hit_dice: Dice) -> Self {
        Self {
            tag: tag.to_string(),
            name: name.to_string(),
            level,
            speed,
            hit_dice,
            armour: level * 2,
            aaf: default_aaf(),
            sleep: 0,
            freq_spell: 0,
            kind: KindFlags::empty(),
            population: PopulationFlags::empty(),
            misc: MiscFlags::empty(),
            brightness: BrightnessFlags::empty(),
            resist: ResistFlags::empty(),
            ability: AbilityFlags::empty(),
            movement: MoveFlags::empty(),
            summon: SummonFlags::empty(),
            special: None,
            blows: Vec::new(),
            spells: Vec::new(),
        }
    }

    pub fn is_unique(&self) -> bool {
        self.kind.contains(KindFlags::UNIQUE)
    }

    /// Unique or Nazgul: the monsters with strong alignment convictions
    pub fn is_unique_or_nazgul(&self) -> bool {
        self.is_unique() || self.population.contains(PopulationFlags::NAZGUL)
    }

    pub fn emits_light(&self) -> bool {
        self.brightness.intersects(BrightnessFlags::EMITTING)
    }

    /// Roll starting maximum hit points
    pub fn roll_hp(&self, rng: &mut GameRng) -> i32 {
        let hp = if self.misc.contains(MiscFlags::FORCE_MAXHP) {
            self.hit_dice.max_roll()
        } else {
            self.hit_dice.roll(rng)
        };
        hp.clamp(1, MONSTER_MAXHP)
    }

    /// Whether this race is offended by the player's alignment
    pub fn has_hostile_align(&self, player_alignment: i32) -> bool {
        (player_alignment >= 10 && self.kind.contains(KindFlags::EVIL))
            || (player_alignment <= -10 && self.kind.contains(KindFlags::GOOD))
    }

    /// Good against evil and vice versa
    pub fn opposes(&self, other: &MonsterRace) -> bool {
        (self.kind.contains(KindFlags::GOOD) && other.kind.contains(KindFlags::EVIL))
            || (self.kind.contains(KindFlags::EVIL) && other.kind.contains(KindFlags::GOOD))
    }
}

/// All monster races, indexed by [`RaceId`]
#[derive(Debug, Clone)]
pub struct RaceRegistry {
    races: Vec<MonsterRace>,
    by_tag: HashMap<String, RaceId>,
}

impl RaceRegistry {
    pub fn from_races(mut races: Vec<MonsterRace>) -> EngineResult<Self> {
        let mut by_tag = HashMap::with_capacity(races.len());
        for (i, race) in races.iter_mut().enumerate() {
            if race.name.is_empty() {
                race.name = race.tag.to_lowercase().replace('_', " ");
            }
            if by_tag.insert(race.tag.clone(), RaceId(i as u16)).is_some() {
                return Err(EngineError::DuplicateTag(race.tag.clone()));
            }
        }
        Ok(Self { races, by_tag })
    }

    /// Parse a JSON array of races
    pub fn from_json(contents: &str) -> EngineResult<Self> {
        let races: Vec<MonsterRace> = serde_json::from_str(contents)?;
        Self::from_races(races)
    }

    pub fn get(&self, id: RaceId) -> Option<&MonsterRace> {
        self.races.get(id.0 as usize)
    }

    pub fn by_tag(&self, tag: &str) -> Option<RaceId> {
        self.by_tag.get(tag).copied()
    }

    pub fn require(&self, tag: &str) -> EngineResult<RaceId> {
        self.by_tag(tag)
            .ok_or_else(|| EngineError::UnknownRaceTag(tag.to_string()))
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RaceId, &MonsterRace)> {
        self.races
            .iter()
            .enumerate()
            .map(|(i, r)| (RaceId(i as u16), r))
    }

    /// The built-in bestiary
    pub fn standard() -> Self {
        match Self::from_races(standard_races()) {
            Ok(reg) => reg,
            Err(e) => unreachable!("built-in bestiary is inconsistent: {e}"),
        }
    }
}

fn hurt(num: i32, sides: i32) -> Blow {
    Blow {
        effect: BlowEffect::Hurt,
        dice: Dice::new(num, sides),
    }
}

fn standard_races() -> Vec<MonsterRace> {
    let n = NORMAL_SPEED;
    vec![
        MonsterRace {
            kind: KindFlags::EVIL,
            sleep: 10,
            movement: MoveFlags::OPEN_DOOR,
            blows: vec![hurt(1, 8)],
            ..MonsterRace::new("KOBOLD", "kobold", 2, n, Dice::new(3, 8))
        },
        MonsterRace {
            kind: KindFlags::ANIMAL,
            misc: MiscFlags::FRIENDS,
            sleep: 10,
            aaf: 10,
            blows: vec![hurt(1, 3)],
            ..MonsterRace::new("JACKAL", "jackal", 1, n + 10, Dice::new(1, 8))
        },
        MonsterRace {
            kind: KindFlags::ANIMAL,
            misc: MiscFlags::MULTIPLY,
            aaf: 6,
            blows: vec![hurt(1, 1)],
            ..MonsterRace::new("WHITE_LOUSE", "giant white louse", 1, n + 10, Dice::new(1, 1))
        },
        MonsterRace {
            kind: KindFlags::EVIL,
            brightness: BrightnessFlags::HAS_DARK_1,
            movement: MoveFlags::OPEN_DOOR,
            freq_spell: 20,
            spells: vec![
                MonsterSpell::Blink,
                MonsterSpell::Confuse,
                MonsterSpell::Bolt(Dice::new(3, 8)),
            ],
            blows: vec![hurt(1, 9)],
            ..MonsterRace::new("DARK_ELF_PRIEST", "dark elven priest", 6, n, Dice::new(7, 10))
        },
        MonsterRace {
            kind: KindFlags::EVIL,
            brightness: BrightnessFlags::HAS_LITE_1 | BrightnessFlags::SELF_LITE_1,
            resist: ResistFlags::POIS,
            blows: vec![hurt(2, 6)],
            ..MonsterRace::new("FIRE_SPIRIT", "fire spirit", 18, n + 20, Dice::new(10, 9))
        },
        MonsterRace {
            kind: KindFlags::EVIL | KindFlags::UNDEAD,
            brightness: BrightnessFlags::SELF_DARK_2,
            movement: MoveFlags::PASS_WALL | MoveFlags::CAN_FLY,
            blows: vec![Blow {
                effect: BlowEffect::LoseStr,
                dice: Dice::new(1, 10),
            }],
            ..MonsterRace::new("SHADOW", "shadow", 24, n + 10, Dice::new(10, 20))
        },
        MonsterRace {
            misc: MiscFlags::CHAMELEON,
            blows: vec![hurt(1, 4)],
            ..MonsterRace::new("CHAMELEON", "chameleon", 6, n, Dice::new(12, 8))
        },
        MonsterRace {
            kind: KindFlags::ANIMAL,
            misc: MiscFlags::RIDING,
            blows: vec![hurt(1, 6)],
            ..MonsterRace::new("WILD_HORSE", "wild horse", 5, n + 10, Dice::new(8, 8))
        },
        MonsterRace {
            kind: KindFlags::UNIQUE | KindFlags::ANIMAL,
            misc: MiscFlags::FORCE_MAXHP | MiscFlags::RIDING,
            blows: vec![hurt(1, 6)],
            ..MonsterRace::new("FANG", "Fang, Farmer Maggot's Dog", 5, n + 20, Dice::new(5, 6))
        },
        MonsterRace {
            kind: KindFlags::EVIL | KindFlags::UNDEAD,
            population: PopulationFlags::NAZGUL,
            misc: MiscFlags::FORCE_MAXHP,
            movement: MoveFlags::OPEN_DOOR | MoveFlags::BASH_DOOR,
            freq_spell: 10,
            spells: vec![MonsterSpell::Bolt(Dice::new(6, 8)), MonsterSpell::Slow],
            blows: vec![hurt(4, 6), hurt(4, 6)],
            ..MonsterRace::new("RINGWRAITH", "ringwraith", 40, n + 10, Dice::new(40, 10))
        },
        MonsterRace {
            kind: KindFlags::GOOD,
            summon: SummonFlags::ARMAGE_GOOD,
            brightness: BrightnessFlags::HAS_LITE_2,
            movement: MoveFlags::CAN_FLY | MoveFlags::OPEN_DOOR,
            freq_spell: 15,
            spells: vec![MonsterSpell::Ball(Dice::new(5, 8)), MonsterSpell::Heal],
            blows: vec![hurt(3, 8), hurt(3, 8)],
            ..MonsterRace::new("ANGEL", "angel", 30, n + 10, Dice::new(30, 10))
        },
        MonsterRace {
            kind: KindFlags::EVIL,
            summon: SummonFlags::ARMAGE_EVIL | SummonFlags::HORROR,
            movement: MoveFlags::BASH_DOOR,
            freq_spell: 15,
            spells: vec![MonsterSpell::Bolt(Dice::new(4, 8)), MonsterSpell::Shriek],
            blows: vec![hurt(3, 8), hurt(3, 8)],
            ..MonsterRace::new("VROCK", "vrock", 26, n, Dice::new(25, 10))
        },
        MonsterRace {
            kind: KindFlags::ANIMAL,
            summon: SummonFlags::PIRANHA,
            movement: MoveFlags::CAN_SWIM,
            aaf: 10,
            blows: vec![hurt(1, 6)],
            ..MonsterRace::new("PIRANHA", "piranha", 3, n + 10, Dice::new(3, 6))
        },
        MonsterRace {
            kind: KindFlags::ANIMAL,
            summon: SummonFlags::BIRD,
            movement: MoveFlags::CAN_FLY,
            blows: vec![hurt(1, 4)],
            ..MonsterRace::new("CROW", "crow", 2, n + 10, Dice::new(3, 5))
        },
        MonsterRace {
            summon: SummonFlags::ELEMENTAL,
            movement: MoveFlags::CAN_FLY | MoveFlags::BASH_DOOR,
            blows: vec![Blow {
                effect: BlowEffect::Confuse,
                dice: Dice::new(1, 10),
            }],
            ..MonsterRace::new("AIR_ELEMENTAL", "air elemental", 8, n + 20, Dice::new(8, 8))
        },
        MonsterRace {
            summon: SummonFlags::MOLD,
            movement: MoveFlags::NEVER_MOVE,
            blows: vec![hurt(1, 4)],
            ..MonsterRace::new("GREY_MOLD", "grey mold", 1, n, Dice::new(6, 8))
        },
        MonsterRace {
            movement: MoveFlags::NEVER_MOVE,
            ability: AbilityFlags::SPECIAL,
            misc: MiscFlags::KILL_CHILDREN,
            special: Some(RaceSpecial::MoldMaster),
            freq_spell: 25,
            blows: vec![Blow {
                effect: BlowEffect::Paralyze,
                dice: Dice::new(1, 6),
            }],
            ..MonsterRace::new("MOLD_MASTER", "master of molds", 15, n, Dice::new(20, 10))
        },
        MonsterRace {
            special: Some(RaceSpecial::Grenade),
            blows: vec![hurt(1, 2)],
            ..MonsterRace::new("GRENADE", "living grenade", 3, n, Dice::new(1, 6))
        },
        MonsterRace {
            kind: KindFlags::QUANTUM,
            movement: MoveFlags::PASS_WALL,
            blows: vec![hurt(1, 6)],
            ..MonsterRace::new("QUANTUM_CAT", "quantum cat", 12, n + 10, Dice::new(8, 8))
        },
        MonsterRace {
            kind: KindFlags::EVIL | KindFlags::UNDEAD,
            resist: ResistFlags::POIS | ResistFlags::CONF,
            movement: MoveFlags::OPEN_DOOR,
            blows: vec![hurt(1, 8), Blow {
                effect: BlowEffect::Poison,
                dice: Dice::new(1, 6),
            }],
            ..MonsterRace::new("SKELETON_ORC", "skeleton orc", 8, n, Dice::new(10, 10))
        },
        MonsterRace {
            kind: KindFlags::EVIL,
            summon: SummonFlags::HORROR,
            resist: ResistFlags::RESIST_ALL,
            brightness: BrightnessFlags::HAS_DARK_2,
            freq_spell: 20,
            spells: vec![
                MonsterSpell::Summon(SummonKind::Undead),
                MonsterSpell::Ball(Dice::new(6, 10)),
            ],
            blows: vec![hurt(5, 8)],
            ..MonsterRace::new("NIGHTMARE", "nightmare", 35, n + 20, Dice::new(40, 12))
        },
    ]
}
