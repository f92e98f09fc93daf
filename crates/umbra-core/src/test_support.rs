//! Shared fixtures for unit tests

use std::sync::Arc;

use crate::dungeon::{Floor, Pos};
use crate::gameloop::GameState;
use crate::monster::{Monster, MonsterId};
use crate::player::Player;
use crate::rng::GameRng;
use crate::world::Registry;

/// A granite box with a plain floor interior, player in the middle
pub fn room_state(width: i32, height: i32) -> GameState {
    let registry = Arc::new(Registry::standard().unwrap());
    let granite = registry.terrain.by_tag("GRANITE").unwrap();
    let floor_id = registry.terrain.by_tag("FLOOR").unwrap();
    let mut floor = Floor::new(width, height, granite);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            floor.set_terrain(Pos::new(y, x), floor_id);
        }
    }
    let player = Player::new(Pos::new(height / 2, width / 2));
    GameState::new(registry, floor, player, GameRng::new(42))
}

/// Put an awake monster of the given race down with maximum hit points
pub fn spawn(state: &mut GameState, tag: &str, pos: Pos) -> MonsterId {
    let race_id = state.registry.races.by_tag(tag).unwrap();
    let race = state.registry.race(race_id).unwrap();
    let hp = race.hit_dice.max_roll().max(1);
    let monster = Monster::from_race(race_id, race, pos, hp, race.speed);
    state.floor.add_monster(monster).unwrap()
}

/// Set a cell's terrain by tag
pub fn set_tag(state: &mut GameState, pos: Pos, tag: &str) {
    let id = state.registry.terrain.by_tag(tag).unwrap();
    state.floor.set_terrain(pos, id);
}

/// First seed whose generator satisfies `pick`, for steering a known draw
pub fn seed_where(pick: impl Fn(&mut GameRng) -> bool) -> u64 {
    (0..100_000u64)
        .find(|&seed| pick(&mut GameRng::new(seed)))
        .expect("no seed satisfies the draw")
}
