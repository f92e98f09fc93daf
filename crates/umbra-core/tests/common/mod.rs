//! Fixtures shared by the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use umbra_core::dungeon::{CellInfo, Floor, Pos};
use umbra_core::monster::{Monster, MonsterId};
use umbra_core::player::Player;
use umbra_core::vision::{update_monsters, update_view};
use umbra_core::world::Registry;
use umbra_core::{GameRng, GameState};

/// A granite box with a plain floor interior and the player in the middle
pub fn room_state(width: i32, height: i32, seed: u64) -> GameState {
    let registry = Arc::new(Registry::standard().unwrap());
    let granite = registry.terrain.require("GRANITE").unwrap();
    let floor_id = registry.terrain.require("FLOOR").unwrap();
    let mut floor = Floor::new(width, height, granite);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            floor.set_terrain(Pos::new(y, x), floor_id);
        }
    }
    let player = Player::new(Pos::new(height / 2, width / 2));
    GameState::new(registry, floor, player, GameRng::new(seed))
}

/// Same room, with every interior cell glowing
pub fn lit_room_state(width: i32, height: i32, seed: u64) -> GameState {
    let mut state = room_state(width, height, seed);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if let Some(cell) = state.floor.cell_mut(Pos::new(y, x)) {
                cell.info.insert(CellInfo::GLOW | CellInfo::ROOM);
            }
        }
    }
    state
}

/// An awake monster with maximum hit points
pub fn spawn(state: &mut GameState, tag: &str, pos: Pos) -> MonsterId {
    let race_id = state.registry.races.require(tag).unwrap();
    let race = state.registry.race(race_id).unwrap();
    let hp = race.hit_dice.max_roll().max(1);
    let monster = Monster::from_race(race_id, race, pos, hp, race.speed);
    state.floor.add_monster(monster).unwrap()
}

pub fn set_tag(state: &mut GameState, pos: Pos, tag: &str) {
    let id = state.registry.terrain.require(tag).unwrap();
    state.floor.set_terrain(pos, id);
}

/// Recompute the player's view and monster distances
pub fn refresh(state: &mut GameState) {
    update_view(state);
    update_monsters(state);
}

pub fn has_message(state: &GameState, text: &str) -> bool {
    state.messages.iter().any(|m| m == text)
}
