//! Flee and hide target searches
//!
//! Both walk the distance rings around the monster outwards and stop at the
//! first ring that yields a candidate.

use std::sync::Arc;

use super::monst::MonsterId;
use super::movement::{can_cross_terrain, can_enter};
use crate::consts::SAFETY_RINGS;
use crate::dungeon::{Pos, clean_shot, distance, projectable, ring_offsets};
use crate::gameloop::GameState;

/// The farthest cell from the player, on the nearest ring that has one, that
/// the monster can cross and the player cannot shoot into
pub fn find_safety(state: &GameState, id: MonsterId) -> Option<Pos> {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let floor = &state.floor;
    let monster = floor.monster(id)?;
    let race = registry.race(monster.race)?;
    let player = state.player.pos;
    let range = state.options.max_range;

    for d in 1..SAFETY_RINGS {
        let mut best = None;
        let mut gdis = 0;
        for off in ring_offsets(d) {
            let p = monster.pos + off;
            if !floor.in_bounds(p) || !can_cross_terrain(terrain, floor, p, race) {
                continue;
            }
            if projectable(floor, terrain, player, p, range) {
                continue;
            }
            let dis = distance(p, player);
            if dis > gdis {
                gdis = dis;
                best = Some(p);
            }
        }
        if gdis > 0 {
            return best;
        }
    }
    None
}

/// The cell closest to the player, at least two steps away, that the player
/// cannot shoot into but the monster can fire from
pub fn find_hiding(state: &GameState, id: MonsterId) -> Option<Pos> {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let floor = &state.floor;
    let monster = floor.monster(id)?;
    let race = registry.race(monster.race)?;
    let player = state.player.pos;
    let range = state.options.max_range;

    let mut best = None;
    let mut gdis = 999;
    for d in 1..SAFETY_RINGS {
        for off in ring_offsets(d) {
            let p = monster.pos + off;
            if !floor.in_bounds(p) || !can_enter(state, p, race) {
                continue;
            }
            if projectable(floor, terrain, player, p, range)
                || !clean_shot(floor, terrain, monster.pos, p, range)
            {
                continue;
            }
            let dis = distance(p, player);
            if dis < gdis && dis >= 2 {
                gdis = dis;
                best = Some(p);
            }
        }
        if best.is_some() {
            return best;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{room_state, set_tag, spawn};

    /// A room split by a wall at column 10 with a gap at row 2
    fn split_room() -> GameState {
        let mut state = room_state(24, 12);
        for y in 1..11 {
            if y != 2 {
                set_tag(&mut state, Pos::new(y, 10), "GRANITE");
            }
        }
        state.player.pos = Pos::new(8, 4);
        state
    }

    #[test]
    fn test_safety_in_open_room_is_none() {
        let mut state = room_state(14, 10);
        state.player.pos = Pos::new(5, 3);
        let id = spawn(&mut state, "KOBOLD", Pos::new(5, 6));
        assert_eq!(find_safety(&state, id), None);
    }

    #[test]
    fn test_safety_behind_wall() {
        let mut state = split_room();
        let id = spawn(&mut state, "KOBOLD", Pos::new(6, 9));
        let safe = find_safety(&state, id).unwrap();
        assert!(safe.x > 10);
        let registry = Arc::clone(&state.registry);
        assert!(!projectable(&state.floor, &registry.terrain, state.player.pos, safe, 18));
    }

    #[test]
    fn test_hiding_keeps_distance_two() {
        let mut state = split_room();
        let id = spawn(&mut state, "JACKAL", Pos::new(6, 9));
        if let Some(hide) = find_hiding(&state, id) {
            assert!(distance(hide, state.player.pos) >= 2);
            let registry = Arc::clone(&state.registry);
            assert!(!projectable(&state.floor, &registry.terrain, state.player.pos, hide, 18));
        }
    }
}
