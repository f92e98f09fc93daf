//! Trap terrain: catalog, selection, placement, disclosure and disarming
//!
//! A trap is not an entity of its own. It is a TRAP terrain whose subtype is
//! a [`TrapType`], with the cell's previous terrain kept as its mimic while
//! the trap stays hidden.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, FromRepr};

use super::definition::DungeonDef;
use super::floor::Floor;
use super::pos::Pos;
use super::terrain::{TerrainAction, TerrainFlags, TerrainId, TerrainRegistry};
use crate::error::{EngineError, EngineResult};
use crate::rng::GameRng;

/// Trap types, stored as the subtype of TRAP terrain
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr,
)]
#[repr(u16)]
pub enum TrapType {
    TrapDoor = 0,
    Pit = 1,
    SpikedPit = 2,
    PoisonPit = 3,
    TyCurse = 4,
    Teleport = 5,
    Fire = 6,
    Acid = 7,
    Slow = 8,
    LoseStr = 9,
    LoseDex = 10,
    LoseCon = 11,
    Blind = 12,
    Confuse = 13,
    Poison = 14,
    Sleep = 15,
    Traps = 16,
    Alarm = 17,
    Open = 18,
    Armageddon = 19,
    Piranha = 20,
}

impl TrapType {
    pub const ALL: [TrapType; 21] = [
        TrapType::TrapDoor,
        TrapType::Pit,
        TrapType::SpikedPit,
        TrapType::PoisonPit,
        TrapType::TyCurse,
        TrapType::Teleport,
        TrapType::Fire,
        TrapType::Acid,
        TrapType::Slow,
        TrapType::LoseStr,
        TrapType::LoseDex,
        TrapType::LoseCon,
        TrapType::Blind,
        TrapType::Confuse,
        TrapType::Poison,
        TrapType::Sleep,
        TrapType::Traps,
        TrapType::Alarm,
        TrapType::Open,
        TrapType::Armageddon,
        TrapType::Piranha,
    ];

    /// Terrain tag of this trap in the built-in catalog
    pub const fn tag(self) -> &'static str {
        match self {
            TrapType::TrapDoor => "TRAP_TRAPDOOR",
            TrapType::Pit => "TRAP_PIT",
            TrapType::SpikedPit => "TRAP_SPIKED_PIT",
            TrapType::PoisonPit => "TRAP_POISON_PIT",
            TrapType::TyCurse => "TRAP_TY_CURSE",
            TrapType::Teleport => "TRAP_TELEPORT",
            TrapType::Fire => "TRAP_FIRE",
            TrapType::Acid => "TRAP_ACID",
            TrapType::Slow => "TRAP_SLOW",
            TrapType::LoseStr => "TRAP_LOSE_STR",
            TrapType::LoseDex => "TRAP_LOSE_DEX",
            TrapType::LoseCon => "TRAP_LOSE_CON",
            TrapType::Blind => "TRAP_BLIND",
            TrapType::Confuse => "TRAP_CONFUSE",
            TrapType::Poison => "TRAP_POISON",
            TrapType::Sleep => "TRAP_SLEEP",
            TrapType::Traps => "TRAP_TRAPS",
            TrapType::Alarm => "TRAP_ALARM",
            TrapType::Open => "TRAP_OPEN",
            TrapType::Armageddon => "TRAP_ARMAGEDDON",
            TrapType::Piranha => "TRAP_PIRANHA",
        }
    }

    /// Trap type of a terrain, if it is a trap with a known subtype
    pub fn of_terrain(terrain: &TerrainRegistry, id: TerrainId) -> Option<TrapType> {
        let def = terrain.try_get(id)?;
        if !def.has(TerrainFlags::TRAP) {
            return None;
        }
        TrapType::from_repr(def.subtype)
    }
}

/// Traps eligible for random placement
pub const NORMAL_TRAPS: [TrapType; 18] = [
    TrapType::TrapDoor,
    TrapType::Pit,
    TrapType::SpikedPit,
    TrapType::PoisonPit,
    TrapType::TyCurse,
    TrapType::Teleport,
    TrapType::Fire,
    TrapType::Acid,
    TrapType::Slow,
    TrapType::LoseStr,
    TrapType::LoseDex,
    TrapType::LoseCon,
    TrapType::Blind,
    TrapType::Confuse,
    TrapType::Poison,
    TrapType::Sleep,
    TrapType::Traps,
    TrapType::Alarm,
];

/// The terrains [`choose_random_trap`] draws from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapCatalog {
    pub normal_traps: Vec<TerrainId>,
}

impl TrapCatalog {
    /// Look up trap terrains by tag
    pub fn from_tags<S: AsRef<str>>(terrain: &TerrainRegistry, tags: &[S]) -> EngineResult<Self> {
        let normal_traps = tags
            .iter()
            .map(|t| terrain.require(t.as_ref()))
            .collect::<EngineResult<Vec<_>>>()?;
        if normal_traps.is_empty() {
            return Err(EngineError::EmptyTrapCatalog);
        }
        Ok(Self { normal_traps })
    }

    /// The normal traps of the built-in terrain catalog
    pub fn standard(terrain: &TerrainRegistry) -> EngineResult<Self> {
        let tags: Vec<&str> = NORMAL_TRAPS.iter().map(|t| t.tag()).collect();
        Self::from_tags(terrain, &tags)
    }
}

/// Draw a random trap terrain for the floor.
///
/// Traps leading to another floor are excluded inside arenas and quests and
/// at the dungeon's bottom level. Returns `None` if nothing is eligible.
pub fn choose_random_trap(
    catalog: &TrapCatalog,
    terrain: &TerrainRegistry,
    floor: &Floor,
    dungeon: &DungeonDef,
    rng: &mut GameRng,
) -> Option<TerrainId> {
    let no_exit = floor.flags.inside_arena
        || floor.flags.in_quest
        || floor.dun_level >= dungeon.max_depth;
    let eligible: Vec<TerrainId> = catalog
        .normal_traps
        .iter()
        .copied()
        .filter(|id| !(no_exit && terrain.has(*id, TerrainFlags::MORE)))
        .collect();
    rng.choose(&eligible).copied()
}

/// Place a hidden random trap on a clean floor cell.
///
/// The current terrain becomes the trap's mimic. Returns false (and changes
/// nothing) for out-of-bounds or non-clean cells.
pub fn place_trap(
    catalog: &TrapCatalog,
    terrain: &TerrainRegistry,
    floor: &mut Floor,
    dungeon: &DungeonDef,
    pos: Pos,
    rng: &mut GameRng,
) -> bool {
    if !floor.in_bounds(pos) || !floor.is_clean(terrain, pos) {
        return false;
    }
    let Some(trap) = choose_random_trap(catalog, terrain, floor, dungeon, rng) else {
        return false;
    };
    if let Some(cell) = floor.cell_mut(pos) {
        cell.mimic = Some(cell.terrain);
        cell.terrain = trap;
    }
    tracing::trace!(?pos, trap = trap.0, "placed trap");
    true
}

/// Reveal a hidden feature: a secret door is converted, a mimicked trap
/// loses its disguise. Returns true if anything changed.
pub fn disclose_grid(
    terrain: &TerrainRegistry,
    floor: &mut Floor,
    dungeon: &DungeonDef,
    pos: Pos,
    rng: &mut GameRng,
) -> bool {
    if floor.has_flag(terrain, pos, TerrainFlags::SECRET) {
        return floor.alter_terrain(terrain, dungeon, pos, TerrainAction::Secret, rng);
    }
    match floor.cell_mut(pos) {
        Some(cell) if cell.mimic.is_some() => {
            cell.mimic = None;
            cell.note_and_redraw();
            true
        }
        _ => false,
    }
}

/// Remove a trap.
///
/// A still-hidden trap gives back its mimic terrain; a revealed one is
/// converted through its DISARM rule.
pub fn disarm_trap(
    terrain: &TerrainRegistry,
    floor: &mut Floor,
    dungeon: &DungeonDef,
    pos: Pos,
    rng: &mut GameRng,
) -> bool {
    if !floor.is_trap(terrain, pos) {
        return false;
    }
    if let Some(cell) = floor.cell_mut(pos) {
        if let Some(original) = cell.mimic.take() {
            cell.terrain = original;
            cell.note_and_redraw();
            return true;
        }
    }
    floor.alter_terrain(terrain, dungeon, pos, TerrainAction::Disarm, rng)
}

bitflags! {
    /// Effects of a trapped chest
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ChestTrapFlags: u16 {
        const LOSE_STR = 1 << 0;
        const LOSE_CON = 1 << 1;
        const POISON = 1 << 2;
        const PARALYZE = 1 << 3;
        const SUMMON = 1 << 4;
        const E_SUMMON = 1 << 5;
        const BIRD_STORM = 1 << 6;
        const H_SUMMON = 1 << 7;
        const RUNES_OF_EVIL = 1 << 8;
        const ALARM = 1 << 9;
        const EXPLODE = 1 << 10;
        const SCATTER = 1 << 11;
    }
}

const fn ct(bits: u16) -> ChestTrapFlags {
    ChestTrapFlags::from_bits_truncate(bits)
}

const NONE: u16 = 0;
const STR: u16 = ChestTrapFlags::LOSE_STR.bits();
const CON: u16 = ChestTrapFlags::LOSE_CON.bits();
const POIS: u16 = ChestTrapFlags::POISON.bits();
const PARA: u16 = ChestTrapFlags::PARALYZE.bits();
const SUMM: u16 = ChestTrapFlags::SUMMON.bits();
const ESUM: u16 = ChestTrapFlags::E_SUMMON.bits();
const BIRD: u16 = ChestTrapFlags::BIRD_STORM.bits();
const HSUM: u16 = ChestTrapFlags::H_SUMMON.bits();
const RUNE: u16 = ChestTrapFlags::RUNES_OF_EVIL.bits();
const ALRM: u16 = ChestTrapFlags::ALARM.bits();
const EXPL: u16 = ChestTrapFlags::EXPLODE.bits();
const SCAT: u16 = ChestTrapFlags::SCATTER.bits();

/// Chest traps by chest quality (`pval`); index 0 is an untrapped chest
pub const CHEST_TRAPS: [ChestTrapFlags; 64] = [
    ct(NONE),
    ct(POIS),
    ct(STR),
    ct(CON),
    ct(STR),
    ct(CON), // 5: best small wooden
    ct(NONE),
    ct(ALRM),
    ct(ALRM),
    ct(STR),
    ct(CON),
    ct(POIS),
    ct(SCAT),
    ct(STR | CON),
    ct(STR | CON),
    ct(SUMM), // 15: best large wooden
    ct(NONE),
    ct(ALRM),
    ct(SCAT),
    ct(PARA),
    ct(STR | CON),
    ct(SUMM),
    ct(PARA),
    ct(STR),
    ct(CON),
    ct(EXPL), // 25: best small iron
    ct(NONE),
    ct(ESUM),
    ct(POIS | CON),
    ct(STR | CON),
    ct(EXPL | SUMM),
    ct(BIRD),
    ct(POIS | SUMM),
    ct(ESUM | ALRM),
    ct(EXPL),
    ct(EXPL | SUMM), // 35: best large iron
    ct(NONE),
    ct(SUMM | ALRM),
    ct(EXPL),
    ct(EXPL | SUMM),
    ct(EXPL | SUMM),
    ct(POIS | PARA),
    ct(EXPL),
    ct(BIRD),
    ct(EXPL | ESUM | ALRM),
    ct(HSUM), // 45: best small steel
    ct(NONE),
    ct(EXPL | SUMM | ALRM),
    ct(BIRD),
    ct(RUNE),
    ct(EXPL | SUMM | ALRM),
    ct(BIRD | ALRM),
    ct(HSUM | ALRM),
    ct(RUNE),
    ct(HSUM | SCAT | ALRM),
    ct(RUNE | EXPL), // 55: best large steel
    ct(EXPL | SUMM),
    ct(EXPL | SUMM),
    ct(EXPL | SUMM),
    ct(EXPL | SUMM),
    ct(EXPL | SUMM),
    ct(EXPL | SUMM),
    ct(EXPL | SUMM),
    ct(EXPL | SUMM),
];

/// Trap set of a chest; disarmed (`pval <= 0`) and unknown qualities have none
pub fn chest_traps(pval: i32) -> ChestTrapFlags {
    if pval <= 0 {
        return ChestTrapFlags::empty();
    }
    CHEST_TRAPS
        .get(pval as usize)
        .copied()
        .unwrap_or_else(ChestTrapFlags::empty)
}
