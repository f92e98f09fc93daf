//! Per-dungeon configuration and terrain conversion

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::terrain::{ConvertKind, TerrainAction, TerrainFlags, TerrainId, TerrainRegistry};
use crate::error::EngineResult;
use crate::rng::GameRng;

bitflags! {
    /// Dungeon-wide features
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DungeonFlags: u16 {
        /// Permanently dark: monster lights shrink to radius 1
        const DARKNESS = 0x0001;
    }
}

/// Configuration of one dungeon, as produced by the level generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonDef {
    pub name: String,
    /// Candidates for CONVERT_FLOOR, drawn uniformly
    pub floor_candidates: Vec<TerrainId>,
    /// Candidates for CONVERT_WALL, drawn uniformly
    pub wall_candidates: Vec<TerrainId>,
    pub inner_wall: TerrainId,
    pub outer_wall: TerrainId,
    pub solid_wall: TerrainId,
    pub stream1: TerrainId,
    pub stream2: TerrainId,
    pub min_depth: i32,
    pub max_depth: i32,
    pub flags: DungeonFlags,
}

/// Serialized form of a dungeon, referring to terrains by tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonSpec {
    pub name: String,
    pub floor: Vec<String>,
    pub wall: Vec<String>,
    pub inner_wall: String,
    pub outer_wall: String,
    pub solid_wall: String,
    pub stream1: String,
    pub stream2: String,
    #[serde(default)]
    pub min_depth: i32,
    pub max_depth: i32,
    #[serde(default)]
    pub flags: DungeonFlags,
}

impl DungeonDef {
    /// Resolve a spec against a terrain registry
    pub fn from_spec(terrain: &TerrainRegistry, spec: DungeonSpec) -> EngineResult<Self> {
        let resolve_all = |tags: &[String]| {
            tags.iter()
                .map(|t| terrain.require(t))
                .collect::<EngineResult<Vec<_>>>()
        };
        Ok(Self {
            floor_candidates: resolve_all(&spec.floor)?,
            wall_candidates: resolve_all(&spec.wall)?,
            inner_wall: terrain.require(&spec.inner_wall)?,
            outer_wall: terrain.require(&spec.outer_wall)?,
            solid_wall: terrain.require(&spec.solid_wall)?,
            stream1: terrain.require(&spec.stream1)?,
            stream2: terrain.require(&spec.stream2)?,
            name: spec.name,
            min_depth: spec.min_depth,
            max_depth: spec.max_depth,
            flags: spec.flags,
        })
    }

    /// Parse a JSON array of [`DungeonSpec`]
    pub fn list_from_json(terrain: &TerrainRegistry, contents: &str) -> EngineResult<Vec<Self>> {
        let specs: Vec<DungeonSpec> = serde_json::from_str(contents)?;
        specs
            .into_iter()
            .map(|spec| Self::from_spec(terrain, spec))
            .collect()
    }

    /// The default dungeon of the built-in terrain catalog
    pub fn standard(terrain: &TerrainRegistry) -> EngineResult<Self> {
        let spec = DungeonSpec {
            name: "Dungeon".to_string(),
            floor: vec!["FLOOR".into(), "FLOOR".into(), "DIRT".into()],
            wall: vec!["GRANITE".into()],
            inner_wall: "WALL_INNER".into(),
            outer_wall: "WALL_OUTER".into(),
            solid_wall: "WALL_SOLID".into(),
            stream1: "MAGMA".into(),
            stream2: "QUARTZ".into(),
            min_depth: 1,
            max_depth: 100,
            flags: DungeonFlags::empty(),
        };
        Self::from_spec(terrain, spec)
    }

    pub fn has(&self, flag: DungeonFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Resolve a contextual placeholder terrain.
    ///
    /// Non-CONVERT terrain is returned unchanged. FLOOR and WALL draw from
    /// the candidate sets; an empty set leaves the placeholder in place.
    pub fn convert_terrain_id(
        &self,
        terrain: &TerrainRegistry,
        id: TerrainId,
        rng: &mut GameRng,
    ) -> TerrainId {
        let Some(def) = terrain.try_get(id) else {
            return id;
        };
        if !def.has(TerrainFlags::CONVERT) {
            return id;
        }
        match ConvertKind::from_repr(def.subtype) {
            Some(ConvertKind::Floor) => rng.choose(&self.floor_candidates).copied().unwrap_or(id),
            Some(ConvertKind::Wall) => rng.choose(&self.wall_candidates).copied().unwrap_or(id),
            Some(ConvertKind::Inner) => self.inner_wall,
            Some(ConvertKind::Outer) => self.outer_wall,
            Some(ConvertKind::Solid) => self.solid_wall,
            Some(ConvertKind::Stream1) => self.stream1,
            Some(ConvertKind::Stream2) => self.stream2,
            None => id,
        }
    }

    /// The terrain `id` becomes when `action` is applied to it.
    ///
    /// The first transition matching `action` wins and its result is
    /// resolved contextually. Without a match, permanent terrain is
    /// unchanged and a destructive action yields the terrain's `destroyed`
    /// replacement.
    pub fn convert_terrain_id_by_action(
        &self,
        terrain: &TerrainRegistry,
        id: TerrainId,
        action: TerrainAction,
        rng: &mut GameRng,
    ) -> TerrainId {
        let Some(def) = terrain.try_get(id) else {
            return id;
        };
        if let Some(result) = def.transition(action) {
            return self.convert_terrain_id(terrain, result, rng);
        }
        if def.has(TerrainFlags::PERMANENT) {
            return id;
        }
        if action.is_destructive() {
            self.convert_terrain_id(terrain, def.destroyed, rng)
        } else {
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::TerrainSpec;

    fn setup() -> (TerrainRegistry, DungeonDef, GameRng) {
        let reg = TerrainRegistry::standard();
        let dungeon = DungeonDef::standard(&reg).unwrap();
        (reg, dungeon, GameRng::new(42))
    }

    #[test]
    fn test_contextual_conversion() {
        let (reg, d, mut rng) = setup();
        let inner = reg.require("CONVERT_INNER").unwrap();
        assert_eq!(d.convert_terrain_id(&reg, inner, &mut rng), d.inner_wall);

        let stream = reg.require("CONVERT_STREAM2").unwrap();
        assert_eq!(d.convert_terrain_id(&reg, stream, &mut rng), d.stream2);

        let any_floor = reg.require("CONVERT_FLOOR").unwrap();
        for _ in 0..20 {
            let got = d.convert_terrain_id(&reg, any_floor, &mut rng);
            assert!(d.floor_candidates.contains(&got));
        }

        let granite = reg.require("GRANITE").unwrap();
        assert_eq!(d.convert_terrain_id(&reg, granite, &mut rng), granite);
    }

    #[test]
    fn test_action_rule_match() {
        let (reg, d, mut rng) = setup();
        let closed = reg.require("CLOSED_DOOR").unwrap();
        let open = reg.require("OPEN_DOOR").unwrap();
        assert_eq!(
            d.convert_terrain_id_by_action(&reg, closed, TerrainAction::Open, &mut rng),
            open
        );
        // No rule and not destructive: unchanged
        assert_eq!(
            d.convert_terrain_id_by_action(&reg, closed, TerrainAction::Disarm, &mut rng),
            closed
        );
    }

    #[test]
    fn test_permanent_resists_destruction() {
        let (reg, d, mut rng) = setup();
        let perm = reg.require("PERMANENT").unwrap();
        assert_eq!(
            d.convert_terrain_id_by_action(&reg, perm, TerrainAction::HurtDisi, &mut rng),
            perm
        );
    }

    #[test]
    fn test_destroyed_fallback() {
        let (reg, d, mut rng) = setup();
        let open = reg.require("OPEN_DOOR").unwrap();
        let broken = reg.require("BROKEN_DOOR").unwrap();
        // No HurtFire rule on doors: destructive falls back to `destroyed`
        assert_eq!(
            d.convert_terrain_id_by_action(&reg, open, TerrainAction::HurtFire, &mut rng),
            broken
        );
    }

    #[test]
    fn test_rule_result_is_resolved() {
        let reg = TerrainRegistry::from_specs(vec![
            TerrainSpec {
                tag: "FLOOR".into(),
                name: String::new(),
                flags: TerrainFlags::FLOOR,
                subtype: 0,
                transitions: vec![],
                destroyed: None,
            },
            TerrainSpec {
                tag: "ANY_WALL".into(),
                name: String::new(),
                flags: TerrainFlags::CONVERT,
                subtype: ConvertKind::Solid as u16,
                transitions: vec![],
                destroyed: None,
            },
            TerrainSpec {
                tag: "GLASS".into(),
                name: String::new(),
                flags: TerrainFlags::empty(),
                subtype: 0,
                transitions: vec![(TerrainAction::Close, "ANY_WALL".into())],
                destroyed: None,
            },
        ])
        .unwrap();
        let floor = reg.require("FLOOR").unwrap();
        let d = DungeonDef {
            name: "test".into(),
            floor_candidates: vec![floor],
            wall_candidates: vec![],
            inner_wall: floor,
            outer_wall: floor,
            solid_wall: TerrainId(0),
            stream1: floor,
            stream2: floor,
            min_depth: 1,
            max_depth: 10,
            flags: DungeonFlags::empty(),
        };
        let glass = reg.require("GLASS").unwrap();
        let mut rng = GameRng::new(1);
        assert_eq!(
            d.convert_terrain_id_by_action(&reg, glass, TerrainAction::Close, &mut rng),
            TerrainId(0)
        );
        // Empty candidate set leaves the placeholder
        let wall_placeholder = TerrainSpec {
            tag: "W".into(),
            name: String::new(),
            flags: TerrainFlags::CONVERT,
            subtype: ConvertKind::Wall as u16,
            transitions: vec![],
            destroyed: None,
        };
        let reg2 = TerrainRegistry::from_specs(vec![wall_placeholder]).unwrap();
        assert_eq!(d.convert_terrain_id(&reg2, TerrainId(0), &mut rng), TerrainId(0));
    }

    #[test]
    fn test_list_from_json() {
        let reg = TerrainRegistry::standard();
        let json = r#"[{
            "name": "Cave", "floor": ["DIRT"], "wall": ["GRANITE", "MAGMA"],
            "inner_wall": "GRANITE", "outer_wall": "GRANITE", "solid_wall": "PERMANENT",
            "stream1": "MAGMA", "stream2": "QUARTZ", "max_depth": 20, "flags": "DARKNESS"
        }]"#;
        let list = DungeonDef::list_from_json(&reg, json).unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].has(DungeonFlags::DARKNESS));
        assert_eq!(list[0].floor_candidates, vec![reg.require("DIRT").unwrap()]);

        let bad = json.replace("QUARTZ", "CHEESE");
        assert!(DungeonDef::list_from_json(&reg, &bad).is_err());
    }
}
