//! Engine options and configuration
//!
//! Balance constants are data, not algorithm: they are grouped here so a
//! dungeon can ship its own tuning as a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{ENERGY_NEED, MAX_MONSTER_SENSING, MAX_PLAYER_SIGHT, MAX_RANGE};
use crate::error::{EngineError, EngineResult};

/// Tunable engine options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Maximum number of reproductions on one floor
    pub max_reproduction: i32,
    /// Reproduction roll is `1 / (neighbours * reproduction_chance)`
    pub reproduction_chance: i32,
    /// A chameleon polymorphs with probability `1 / chameleon_chance`
    pub chameleon_chance: i32,
    pub max_sight: i32,
    pub max_monster_sensing: i32,
    pub max_range: i32,
    pub energy_need: i16,
    /// Write diary entries for named pets
    pub record_named_pet: bool,
    /// Request an autosave after falling through a trap door
    pub autosave_on_trapdoor: bool,
    /// Cap for the per-race "times woken" lore counter
    pub lore_wake_cap: u8,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_reproduction: 100,
            reproduction_chance: 8,
            chameleon_chance: 13,
            max_sight: MAX_PLAYER_SIGHT,
            max_monster_sensing: MAX_MONSTER_SENSING,
            max_range: MAX_RANGE,
            energy_need: ENERGY_NEED,
            record_named_pet: true,
            autosave_on_trapdoor: true,
            lore_wake_cap: u8::MAX,
        }
    }
}

impl EngineOptions {
    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json(contents: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Load options from a JSON file
    pub fn load_from_file(path: &Path) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = EngineOptions::default();
        assert_eq!(opts.max_reproduction, 100);
        assert_eq!(opts.energy_need, 100);
        assert!(opts.record_named_pet);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts = EngineOptions::from_json(r#"{ "max_reproduction": 3 }"#).unwrap();
        assert_eq!(opts.max_reproduction, 3);
        assert_eq!(opts.chameleon_chance, 13);
    }

    #[test]
    fn test_roundtrip() {
        let mut opts = EngineOptions::default();
        opts.max_sight = 12;
        let parsed = EngineOptions::from_json(&opts.to_json()).unwrap();
        assert_eq!(parsed, opts);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            EngineOptions::from_json("{ not json"),
            Err(EngineError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineOptions::load_from_file(Path::new("/nonexistent/umbra.json")).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
