//! Immutable game data shared by every floor
//!
//! Terrain, races, dungeon definitions and the trap catalog are loaded once
//! and handed around behind an `Arc`.

use std::path::Path;

use serde::Deserialize;

use crate::dungeon::{DungeonDef, TerrainRegistry, TrapCatalog};
use crate::error::{EngineError, EngineResult};
use crate::monster::{MonsterRace, RaceId, RaceRegistry};

/// All static game data
#[derive(Debug, Clone)]
pub struct Registry {
    pub terrain: TerrainRegistry,
    pub races: RaceRegistry,
    dungeons: Vec<DungeonDef>,
    pub traps: TrapCatalog,
}

/// Trap list file: `{ "normal_traps": ["TRAP_PIT", ...] }`
#[derive(Debug, Deserialize)]
struct TrapListSpec {
    normal_traps: Vec<String>,
}

impl Registry {
    pub fn new(
        terrain: TerrainRegistry,
        races: RaceRegistry,
        dungeons: Vec<DungeonDef>,
        traps: TrapCatalog,
    ) -> EngineResult<Self> {
        if dungeons.is_empty() {
            return Err(EngineError::NoDungeons);
        }
        Ok(Self {
            terrain,
            races,
            dungeons,
            traps,
        })
    }

    /// The built-in catalogs
    pub fn standard() -> EngineResult<Self> {
        let terrain = TerrainRegistry::standard();
        let dungeon = DungeonDef::standard(&terrain)?;
        let traps = TrapCatalog::standard(&terrain)?;
        Self::new(terrain, RaceRegistry::standard(), vec![dungeon], traps)
    }

    /// Build from JSON documents
    pub fn from_json(terrain: &str, races: &str, dungeons: &str, traps: &str) -> EngineResult<Self> {
        let terrain = TerrainRegistry::from_json(terrain)?;
        let races = RaceRegistry::from_json(races)?;
        let dungeons = DungeonDef::list_from_json(&terrain, dungeons)?;
        let trap_list: TrapListSpec = serde_json::from_str(traps)?;
        let traps = TrapCatalog::from_tags(&terrain, &trap_list.normal_traps)?;
        Self::new(terrain, races, dungeons, traps)
    }

    /// Load `terrain.json`, `races.json`, `dungeons.json` and `traps.json`
    /// from a directory
    pub fn load_from_dir(dir: &Path) -> EngineResult<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| EngineError::Io {
                path: path.display().to_string(),
                source,
            })
        };
        Self::from_json(
            &read("terrain.json")?,
            &read("races.json")?,
            &read("dungeons.json")?,
            &read("traps.json")?,
        )
    }

    /// Dungeon definition by index; an unknown index falls back to the first
    pub fn dungeon(&self, index: usize) -> &DungeonDef {
        self.dungeons.get(index).unwrap_or(&self.dungeons[0])
    }

    pub fn dungeons(&self) -> &[DungeonDef] {
        &self.dungeons
    }

    pub fn race(&self, id: RaceId) -> Option<&MonsterRace> {
        self.races.get(id)
    }
}
