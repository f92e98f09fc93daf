//! The demonstration floor

use std::sync::Arc;

use anyhow::{Context, Result};
use umbra_core::dungeon::{CellInfo, Floor, Pos};
use umbra_core::monster::{SpawnMode, place_monster};
use umbra_core::player::Player;
use umbra_core::world::Registry;
use umbra_core::{GameRng, GameState};

pub const WIDTH: i32 = 40;
pub const HEIGHT: i32 = 15;

fn tag(registry: &Registry, name: &str) -> Result<umbra_core::dungeon::TerrainId> {
    registry
        .terrain
        .require(name)
        .with_context(|| format!("demo floor needs terrain {name}"))
}

/// Two rooms joined by a door, with a pool, a few traps and a crowd
pub fn build(registry: Arc<Registry>, seed: u64, depth: i32) -> Result<GameState> {
    let granite = tag(&registry, "GRANITE")?;
    let floor_id = tag(&registry, "FLOOR")?;
    let door = tag(&registry, "CLOSED_DOOR")?;
    let water = tag(&registry, "SHALLOW_WATER")?;

    let mut floor = Floor::new(WIDTH, HEIGHT, granite);
    floor.dun_level = depth;
    for y in 1..HEIGHT - 1 {
        for x in 1..WIDTH - 1 {
            if x == WIDTH / 2 {
                continue;
            }
            let p = Pos::new(y, x);
            floor.set_terrain(p, floor_id);
            if let Some(cell) = floor.cell_mut(p) {
                cell.info.insert(CellInfo::ROOM | CellInfo::GLOW);
            }
        }
    }
    floor.set_terrain(Pos::new(HEIGHT / 2, WIDTH / 2), door);
    for y in 2..5 {
        for x in 30..34 {
            floor.set_terrain(Pos::new(y, x), water);
        }
    }

    for (name, pos) in [
        ("TRAP_TELEPORT", Pos::new(7, 12)),
        ("TRAP_ALARM", Pos::new(4, 6)),
        ("TRAP_PIT", Pos::new(10, 9)),
        ("TRAP_CONFUSE", Pos::new(8, 5)),
    ] {
        floor.set_terrain(pos, tag(&registry, name)?);
    }

    let player = Player::new(Pos::new(HEIGHT / 2, 8));
    let mut state = GameState::new(Arc::clone(&registry), floor, player, GameRng::new(seed));

    for (race, pos, mode) in [
        ("KOBOLD", Pos::new(3, 15), SpawnMode::empty()),
        ("JACKAL", Pos::new(12, 3), SpawnMode::empty()),
        ("JACKAL", Pos::new(12, 4), SpawnMode::empty()),
        ("WHITE_LOUSE", Pos::new(11, 17), SpawnMode::empty()),
        ("FIRE_SPIRIT", Pos::new(10, 26), SpawnMode::empty()),
        ("SHADOW", Pos::new(12, 36), SpawnMode::empty()),
        ("MOLD_MASTER", Pos::new(6, 35), SpawnMode::empty()),
        ("GRENADE", Pos::new(2, 24), SpawnMode::empty()),
        ("CHAMELEON", Pos::new(9, 30), SpawnMode::empty()),
        ("CROW", Pos::new(5, 10), SpawnMode::PET),
    ] {
        let race_id = registry
            .races
            .require(race)
            .with_context(|| format!("demo floor needs race {race}"))?;
        if place_monster(&mut state, race_id, pos, mode | SpawnMode::NO_SLEEP, None).is_none() {
            tracing::warn!(race, ?pos, "could not place demo monster");
        }
    }
    Ok(state)
}
