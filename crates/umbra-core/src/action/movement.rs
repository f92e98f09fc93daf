//! Player movement
//!
//! One step in a compass direction. A closed door is opened instead of
//! entered, and arriving on a trap sets it off.

use std::sync::Arc;

use super::trap::hit_trap;
use crate::action::ActionResult;
use crate::dungeon::{DIRECTIONS, Pos, TerrainAction, TerrainFlags};
use crate::gameloop::{GameState, UpdateFlags};

/// Step the player (and mount) one cell in `dir`.
///
/// `dir` must be one of the eight unit offsets.
pub fn move_player(state: &mut GameState, dir: Pos) -> ActionResult {
    if !DIRECTIONS.contains(&dir) {
        return ActionResult::Cancelled;
    }
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let to = state.player.pos + dir;
    if !state.floor.in_bounds(to) {
        state.message("There is a wall in the way.");
        return ActionResult::NoTime;
    }

    if state.floor.has_flag(terrain, to, TerrainFlags::CLOSED) {
        let dungeon = registry.dungeon(state.floor.dungeon);
        if state
            .floor
            .alter_terrain(terrain, dungeon, to, TerrainAction::Open, &mut state.rng)
        {
            state.request(UpdateFlags::VIEW | UpdateFlags::MONSTER_LITE);
            return ActionResult::Success;
        }
        state.message("The door is stuck.");
        return ActionResult::Success;
    }
    if !state.floor.has_flag(terrain, to, TerrainFlags::MOVE) {
        state.message("There is a wall in the way.");
        return ActionResult::NoTime;
    }
    if let Some(other) = state.floor.monster_at(to) {
        if state.player.riding != Some(other) {
            let name = state.monster_name(other);
            state.message(format!("You feel {name} in the way."));
            return ActionResult::NoTime;
        }
    }

    if let Some(mount) = state.player.riding {
        state.floor.move_monster(mount, to);
    }
    state.player.pos = to;
    state.request(UpdateFlags::VIEW | UpdateFlags::MONSTER_LITE);
    tracing::trace!(?to, "player moved");

    if state.floor.is_trap(terrain, to) {
        return match hit_trap(state, to, false) {
            ActionResult::NoTime => ActionResult::Success,
            result => result,
        };
    }
    ActionResult::Success
}
