//! Grid and terrain model
//!
//! Contains the floor grid, the terrain catalog and conversion rules, line
//! of sight and the trap catalog.

mod cell;
mod definition;
mod floor;
pub mod los;
mod pos;
mod terrain;
pub mod trap;

pub use cell::{Cell, CellInfo};
pub use definition::{DungeonDef, DungeonFlags, DungeonSpec};
pub use floor::{Floor, FloorFlags};
pub use los::{clean_shot, los, project_path, projectable};
pub use pos::{DIRECTIONS, Pos, distance, ring_offsets};
pub use terrain::{
    ConvertKind, TerrainAction, TerrainDef, TerrainFlags, TerrainId, TerrainRegistry, TerrainSpec,
};
pub use trap::{
    ChestTrapFlags, TrapCatalog, TrapType, chest_traps, choose_random_trap, disarm_trap,
    disclose_grid, place_trap,
};
