//! Terrain catalog
//!
//! Every cell holds a [`TerrainId`] into an immutable [`TerrainRegistry`].
//! A terrain carries its capability flags and an ordered transition table
//! mapping a triggering [`TerrainAction`] to the resulting terrain. The
//! conversion rules themselves live on [`DungeonDef`](super::DungeonDef),
//! because contextual placeholders depend on the dungeon being played.

use bitflags::bitflags;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, FromRepr};

use crate::error::{EngineError, EngineResult};

/// Index into the terrain registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainId(pub u16);

bitflags! {
    /// Terrain capability flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TerrainFlags: u32 {
        /// Does not block line of sight
        const LOS = 1 << 0;
        /// Does not block projections
        const PROJECT = 1 << 1;
        /// Walkable
        const MOVE = 1 << 2;
        /// Monsters may be placed here
        const PLACE = 1 << 3;
        /// Plain floor; traps may be placed here
        const FLOOR = 1 << 4;
        const WALL = 1 << 5;
        /// Never destroyed by destructive actions
        const PERMANENT = 1 << 6;
        const TRAP = 1 << 7;
        /// Contextual placeholder resolved by the dungeon definition
        const CONVERT = 1 << 8;
        /// Leads to another floor
        const MORE = 1 << 9;
        const DOOR = 1 << 10;
        const SECRET = 1 << 11;
        /// Closed and openable
        const CLOSED = 1 << 12;
        const GLOW = 1 << 13;
        const WATER = 1 << 14;
        const DEEP = 1 << 15;
    }
}

/// Actions that can transform a terrain
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum TerrainAction {
    Open,
    Close,
    Bash,
    Tunnel,
    Disarm,
    HitTrap,
    Secret,
    HurtRock,
    HurtFire,
    HurtCold,
    HurtAcid,
    HurtDisi,
}

impl TerrainAction {
    /// Destructive actions fall back to the terrain's `destroyed` result
    pub const fn is_destructive(self) -> bool {
        matches!(
            self,
            TerrainAction::Bash
                | TerrainAction::Tunnel
                | TerrainAction::HurtRock
                | TerrainAction::HurtFire
                | TerrainAction::HurtCold
                | TerrainAction::HurtAcid
                | TerrainAction::HurtDisi
        )
    }
}

/// Subtype of a CONVERT terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u16)]
pub enum ConvertKind {
    Floor = 0,
    Wall = 1,
    Inner = 2,
    Outer = 3,
    Solid = 4,
    Stream1 = 5,
    Stream2 = 6,
}

/// One terrain definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainDef {
    pub tag: String,
    pub name: String,
    pub flags: TerrainFlags,
    /// Trap type for TRAP terrain, conversion kind for CONVERT terrain
    pub subtype: u16,
    /// Ordered `(action, result)` rules
    pub transitions: Vec<(TerrainAction, TerrainId)>,
    /// Result of an unmatched destructive action
    pub destroyed: TerrainId,
}

impl TerrainDef {
    pub fn has(&self, flag: TerrainFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn has_any_of(&self, flags: TerrainFlags) -> bool {
        self.flags.intersects(flags)
    }

    /// First transition matching `action`
    pub fn transition(&self, action: TerrainAction) -> Option<TerrainId> {
        self.transitions
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, result)| *result)
    }
}

/// Serialized form of a terrain, referring to other terrains by tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSpec {
    pub tag: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flags: TerrainFlags,
    #[serde(default)]
    pub subtype: u16,
    #[serde(default)]
    pub transitions: Vec<(TerrainAction, String)>,
    /// Defaults to the terrain itself
    #[serde(default)]
    pub destroyed: Option<String>,
}

/// Immutable terrain catalog, indexed by [`TerrainId`]
#[derive(Debug, Clone)]
pub struct TerrainRegistry {
    defs: Vec<TerrainDef>,
    by_tag: HashMap<String, TerrainId>,
}

impl TerrainRegistry {
    /// Build a registry from tag-based specs.
    ///
    /// Ids are assigned in order; references are resolved in a second pass.
    pub fn from_specs(specs: Vec<TerrainSpec>) -> EngineResult<Self> {
        if specs.is_empty() {
            return Err(EngineError::EmptyTerrainCatalog);
        }
        let mut by_tag = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if by_tag.insert(spec.tag.clone(), TerrainId(i as u16)).is_some() {
                return Err(EngineError::DuplicateTag(spec.tag.clone()));
            }
        }

        let resolve = |tag: &str| {
            by_tag
                .get(tag)
                .copied()
                .ok_or_else(|| EngineError::UnknownTerrainTag(tag.to_string()))
        };

        let mut defs = Vec::with_capacity(specs.len());
        for (i, spec) in specs.into_iter().enumerate() {
            let transitions = spec
                .transitions
                .iter()
                .map(|(action, tag)| Ok((*action, resolve(tag)?)))
                .collect::<EngineResult<Vec<_>>>()?;
            let destroyed = match &spec.destroyed {
                Some(tag) => resolve(tag)?,
                None => TerrainId(i as u16),
            };
            let name = if spec.name.is_empty() {
                spec.tag.to_lowercase().replace('_', " ")
            } else {
                spec.name
            };
            defs.push(TerrainDef {
                tag: spec.tag,
                name,
                flags: spec.flags,
                subtype: spec.subtype,
                transitions,
                destroyed,
            });
        }

        Ok(Self { defs, by_tag })
    }

    /// Parse a JSON array of [`TerrainSpec`]
    pub fn from_json(contents: &str) -> EngineResult<Self> {
        let specs: Vec<TerrainSpec> = serde_json::from_str(contents)?;
        Self::from_specs(specs)
    }

    /// Definition for `id`; unknown ids fall back to the first entry, which
    /// a registry always has
    pub fn get(&self, id: TerrainId) -> &TerrainDef {
        self.defs.get(id.0 as usize).unwrap_or(&self.defs[0])
    }

    pub fn try_get(&self, id: TerrainId) -> Option<&TerrainDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn by_tag(&self, tag: &str) -> Option<TerrainId> {
        self.by_tag.get(tag).copied()
    }

    /// Like [`by_tag`](Self::by_tag) but reporting a missing tag as an error
    pub fn require(&self, tag: &str) -> EngineResult<TerrainId> {
        self.by_tag(tag)
            .ok_or_else(|| EngineError::UnknownTerrainTag(tag.to_string()))
    }

    pub fn has(&self, id: TerrainId, flag: TerrainFlags) -> bool {
        self.try_get(id).is_some_and(|def| def.has(flag))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TerrainId, &TerrainDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (TerrainId(i as u16), def))
    }

    /// The built-in terrain catalog
    pub fn standard() -> Self {
        match Self::from_specs(standard_specs()) {
            Ok(registry) => registry,
            Err(err) => unreachable!("built-in terrain catalog is inconsistent: {err}"),
        }
    }
}

fn spec(
    tag: &str,
    flags: TerrainFlags,
    subtype: u16,
    transitions: &[(TerrainAction, &str)],
    destroyed: Option<&str>,
) -> TerrainSpec {
    TerrainSpec {
        tag: tag.to_string(),
        name: String::new(),
        flags,
        subtype,
        transitions: transitions
            .iter()
            .map(|(a, t)| (*a, t.to_string()))
            .collect(),
        destroyed: destroyed.map(str::to_string),
    }
}

fn standard_specs() -> Vec<TerrainSpec> {
    use super::trap::TrapType;
    use TerrainAction::*;

    let open = TerrainFlags::LOS | TerrainFlags::PROJECT | TerrainFlags::MOVE | TerrainFlags::PLACE;
    let floor = open | TerrainFlags::FLOOR;
    let wall = TerrainFlags::WALL;
    let rock = &[(Tunnel, "FLOOR"), (HurtDisi, "FLOOR")];

    let mut specs = vec![
        // FLOOR must stay first: unknown ids fall back to entry 0
        spec("FLOOR", floor, 0, &[], None),
        spec("DIRT", floor, 0, &[], None),
        spec("GRASS", floor, 0, &[(HurtFire, "DIRT")], None),
        spec("GRANITE", wall, 0, rock, Some("FLOOR")),
        spec("WALL_INNER", wall, 0, rock, Some("FLOOR")),
        spec("WALL_OUTER", wall, 0, rock, Some("FLOOR")),
        spec("WALL_SOLID", wall, 0, rock, Some("FLOOR")),
        spec("PERMANENT", wall | TerrainFlags::PERMANENT, 0, &[], None),
        spec("MAGMA", wall, 0, rock, Some("FLOOR")),
        spec("QUARTZ", wall, 0, rock, Some("FLOOR")),
        spec(
            "RUBBLE",
            TerrainFlags::empty(),
            0,
            &[(Tunnel, "FLOOR")],
            Some("FLOOR"),
        ),
        spec(
            "SHALLOW_WATER",
            open | TerrainFlags::WATER,
            0,
            &[(HurtFire, "DIRT")],
            None,
        ),
        spec(
            "DEEP_WATER",
            open | TerrainFlags::WATER | TerrainFlags::DEEP,
            0,
            &[],
            None,
        ),
        spec(
            "OPEN_DOOR",
            open | TerrainFlags::DOOR,
            0,
            &[(Close, "CLOSED_DOOR"), (Bash, "BROKEN_DOOR")],
            Some("BROKEN_DOOR"),
        ),
        spec(
            "CLOSED_DOOR",
            TerrainFlags::DOOR | TerrainFlags::CLOSED,
            0,
            &[(Open, "OPEN_DOOR"), (Bash, "BROKEN_DOOR")],
            Some("BROKEN_DOOR"),
        ),
        spec(
            "SECRET_DOOR",
            wall | TerrainFlags::DOOR | TerrainFlags::SECRET,
            0,
            &[(Secret, "CLOSED_DOOR"), (Tunnel, "FLOOR")],
            Some("FLOOR"),
        ),
        spec("BROKEN_DOOR", open | TerrainFlags::DOOR, 0, &[], Some("FLOOR")),
        spec(
            "UP_STAIR",
            open | TerrainFlags::MORE | TerrainFlags::PERMANENT,
            0,
            &[],
            None,
        ),
        spec(
            "DOWN_STAIR",
            open | TerrainFlags::MORE | TerrainFlags::PERMANENT,
            0,
            &[],
            None,
        ),
    ];

    let placeholders = [
        ("CONVERT_FLOOR", ConvertKind::Floor),
        ("CONVERT_WALL", ConvertKind::Wall),
        ("CONVERT_INNER", ConvertKind::Inner),
        ("CONVERT_OUTER", ConvertKind::Outer),
        ("CONVERT_SOLID", ConvertKind::Solid),
        ("CONVERT_STREAM1", ConvertKind::Stream1),
        ("CONVERT_STREAM2", ConvertKind::Stream2),
    ];
    for (tag, kind) in placeholders {
        specs.push(spec(tag, TerrainFlags::CONVERT, kind as u16, &[], None));
    }

    let trap_flags = open | TerrainFlags::TRAP;
    for trap in TrapType::ALL {
        let mut flags = trap_flags;
        if trap == TrapType::TrapDoor {
            flags |= TerrainFlags::MORE;
        }
        specs.push(spec(
            trap.tag(),
            flags,
            trap as u16,
            &[(Disarm, "FLOOR"), (HurtDisi, "FLOOR")],
            Some("FLOOR"),
        ));
    }

    specs
}
