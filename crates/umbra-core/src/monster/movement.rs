//! Monster movement: direction choice and step execution
//!
//! A monster picks a goal (stay, wander, or head for a cell), turns it into
//! a short list of candidate steps, then tries them in order. Stepping into
//! the player or an enemy is an attack; a closed door is opened instead of
//! entered.

use std::sync::Arc;

use super::melee::{make_attack_normal, monst_attack_monst};
use super::monst::{MonsterFlags2, MonsterId, are_enemies};
use super::race::{KindFlags, MiscFlags, MonsterRace, MoveFlags};
use super::safety::{find_hiding, find_safety};
use crate::dungeon::{
    CellInfo, DIRECTIONS, Floor, Pos, TerrainAction, TerrainFlags, TerrainRegistry, distance, los,
};
use crate::gameloop::{GameState, UpdateFlags};

/// What a monster's turn of movement achieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// An action that used up the turn (attack, door)
    pub do_turn: bool,
    /// The monster changed cells
    pub do_move: bool,
    /// Candidate steps that led nowhere
    pub blocked: u32,
}

impl MoveOutcome {
    pub fn did_anything(self) -> bool {
        self.do_turn || self.do_move
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    Stay,
    Wander,
    Toward(Pos),
}

/// True if `race` can stand on the terrain at `pos`, ignoring occupants
pub fn can_cross_terrain(terrain: &TerrainRegistry, floor: &Floor, pos: Pos, race: &MonsterRace) -> bool {
    let Some(id) = floor.terrain_at(pos) else {
        return false;
    };
    let passable = terrain.has(id, TerrainFlags::MOVE)
        || (race.movement.contains(MoveFlags::PASS_WALL) && !terrain.has(id, TerrainFlags::PERMANENT));
    if !passable {
        return false;
    }
    if terrain.has(id, TerrainFlags::DEEP) {
        return race.movement.intersects(MoveFlags::CAN_SWIM | MoveFlags::CAN_FLY);
    }
    true
}

/// True if `race` could step onto `pos` now: crossable and unoccupied
pub fn can_enter(state: &GameState, pos: Pos, race: &MonsterRace) -> bool {
    state.floor.in_bounds(pos)
        && !state.floor.has_monster(pos)
        && can_cross_terrain(&state.registry.terrain, &state.floor, pos, race)
}

fn choose_goal(state: &GameState, id: MonsterId, aware: bool) -> Goal {
    let Some(m) = state.floor.monster(id) else {
        return Goal::Stay;
    };
    let Some(race) = state.registry.race(m.race) else {
        return Goal::Stay;
    };
    if state.player.riding == Some(id) || race.movement.contains(MoveFlags::NEVER_MOVE) {
        return Goal::Stay;
    }
    if m.is_confused() || !aware {
        return Goal::Wander;
    }

    let player = state.player.pos;
    if m.is_hostile() && (m.is_fearful() || m.hp < m.maxhp / 4) {
        return find_safety(state, id).map_or(Goal::Wander, Goal::Toward);
    }

    // Pack animals wait in cover while the player stands in a corridor
    let in_room = state
        .floor
        .cell(player)
        .is_some_and(|c| c.info.contains(CellInfo::ROOM));
    if m.is_hostile()
        && race.misc.contains(MiscFlags::FRIENDS)
        && race.kind.contains(KindFlags::ANIMAL)
        && !m.pos.is_adjacent(player)
        && !in_room
    {
        if let Some(hide) = find_hiding(state, id) {
            return Goal::Toward(hide);
        }
    }

    if let Some(target) = m.target {
        return Goal::Toward(target);
    }
    if m.is_hostile() {
        let sees_player = los(&state.floor, &state.registry.terrain, m.pos, player);
        if m.flags2.contains(MonsterFlags2::NOFLOW) && !sees_player {
            return Goal::Wander;
        }
        return Goal::Toward(player);
    }
    if m.is_pet() && distance(m.pos, player) > 2 {
        return Goal::Toward(player);
    }
    Goal::Wander
}

/// Candidate steps for a goal, best first
fn candidate_steps(state: &mut GameState, from: Pos, goal: Goal) -> Vec<Pos> {
    match goal {
        Goal::Stay => Vec::new(),
        Goal::Wander => {
            let mut dirs = DIRECTIONS.to_vec();
            state.rng.shuffle(&mut dirs);
            dirs.into_iter().map(|d| from + d).collect()
        }
        Goal::Toward(target) if target == from => Vec::new(),
        Goal::Toward(target) => {
            let step = from.step_towards(target) - from;
            let Some(i) = DIRECTIONS.iter().position(|d| *d == step) else {
                return Vec::new();
            };
            let left = DIRECTIONS[(i + 7) % 8];
            let right = DIRECTIONS[(i + 1) % 8];
            let (a, b) = if state.rng.one_in(2) { (left, right) } else { (right, left) };
            vec![from + step, from + a, from + b]
        }
    }
}

/// Try to open or bash a closed door. Returns true if the turn was spent.
fn open_door(state: &mut GameState, id: MonsterId, race: &MonsterRace, pos: Pos) -> bool {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    if !state.floor.has_flag(terrain, pos, TerrainFlags::CLOSED) {
        return false;
    }
    let action = if race.movement.contains(MoveFlags::OPEN_DOOR) {
        TerrainAction::Open
    } else if race.movement.contains(MoveFlags::BASH_DOOR) {
        TerrainAction::Bash
    } else {
        return false;
    };
    let dungeon = registry.dungeon(state.floor.dungeon);
    if !state.floor.alter_terrain(terrain, dungeon, pos, action, &mut state.rng) {
        return false;
    }
    if action == TerrainAction::Bash {
        state.message("You hear a door burst open!");
    }
    tracing::trace!(id = id.0, ?pos, %action, "monster worked a door");
    state.request(UpdateFlags::VIEW);
    true
}

/// Move or attack for one turn
pub fn process_monster_movement(state: &mut GameState, id: MonsterId, aware: bool) -> MoveOutcome {
    let registry = Arc::clone(&state.registry);
    let mut outcome = MoveOutcome::default();
    let Some(from) = state.floor.monster(id).map(|m| m.pos) else {
        return outcome;
    };
    let Some(race) = state.floor.monster(id).and_then(|m| registry.race(m.race)) else {
        return outcome;
    };

    let goal = choose_goal(state, id, aware);
    for to in candidate_steps(state, from, goal) {
        outcome.blocked += 1;
        if !state.floor.in_bounds(to) {
            continue;
        }

        if to == state.player.pos {
            let hostile = state.floor.monster(id).is_some_and(|m| m.is_hostile());
            if !hostile {
                continue;
            }
            make_attack_normal(state, id);
            outcome.do_turn = true;
            break;
        }

        if let Some(other) = state.floor.monster_at(to) {
            let enemies = match (state.floor.monster(id), state.floor.monster(other)) {
                (Some(a), Some(b)) => registry
                    .race(b.race)
                    .is_some_and(|b_race| are_enemies(a, race, b, b_race)),
                _ => false,
            };
            if !enemies {
                continue;
            }
            monst_attack_monst(state, id, other);
            outcome.do_turn = true;
            break;
        }

        if open_door(state, id, race, to) {
            outcome.do_turn = true;
            break;
        }

        if can_cross_terrain(&registry.terrain, &state.floor, to, race) && state.floor.move_monster(id, to) {
            if race.emits_light() {
                state.request(UpdateFlags::MONSTER_LITE);
            }
            outcome.do_move = true;
            break;
        }
    }
    if outcome.did_anything() {
        outcome.blocked -= 1;
    }
    outcome
}

/// Teleport a monster to a random cell within `dis` of where it stands.
///
/// Callers narrate. Returns false if no cell could be found.
pub fn teleport_monster(state: &mut GameState, id: MonsterId, dis: i32) -> bool {
    let registry = Arc::clone(&state.registry);
    let Some((from, race_id)) = state.floor.monster(id).map(|m| (m.pos, m.race)) else {
        return false;
    };
    let Some(race) = registry.race(race_id) else {
        return false;
    };

    let spots: Vec<Pos> = state
        .floor
        .positions()
        .filter(|p| {
            let d = distance(from, *p);
            d > dis / 3 && d <= dis && *p != state.player.pos && can_enter(state, *p, race)
        })
        .collect();
    let Some(to) = state.rng.choose(&spots).copied() else {
        return false;
    };
    state.floor.move_monster(id, to);
    if race.emits_light() {
        state.request(UpdateFlags::MONSTER_LITE);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{room_state, set_tag, spawn};

    #[test]
    fn test_deep_water_needs_swimming() {
        let mut state = room_state(10, 8);
        let p = Pos::new(3, 3);
        set_tag(&mut state, p, "DEEP_WATER");
        let registry = Arc::clone(&state.registry);
        let kobold = registry.race(registry.races.by_tag("KOBOLD").unwrap()).unwrap();
        let piranha = registry.race(registry.races.by_tag("PIRANHA").unwrap()).unwrap();
        assert!(!can_cross_terrain(&registry.terrain, &state.floor, p, kobold));
        assert!(can_cross_terrain(&registry.terrain, &state.floor, p, piranha));
    }

    #[test]
    fn test_pass_wall_stops_at_permanent() {
        let mut state = room_state(10, 8);
        set_tag(&mut state, Pos::new(3, 3), "PERMANENT");
        let registry = Arc::clone(&state.registry);
        let shadow = registry.race(registry.races.by_tag("SHADOW").unwrap()).unwrap();
        assert!(can_cross_terrain(&registry.terrain, &state.floor, Pos::new(0, 0), shadow));
        assert!(!can_cross_terrain(&registry.terrain, &state.floor, Pos::new(3, 3), shadow));
    }

    #[test]
    fn test_hostile_steps_toward_player() {
        let mut state = room_state(20, 10);
        state.player.pos = Pos::new(5, 2);
        let id = spawn(&mut state, "KOBOLD", Pos::new(5, 8));
        let outcome = process_monster_movement(&mut state, id, true);
        assert!(outcome.do_move);
        assert_eq!(state.floor.monster(id).unwrap().pos.x, 7);
    }

    #[test]
    fn test_walled_in_chaser_counts_blocked_steps() {
        let mut state = room_state(20, 10);
        state.player.pos = Pos::new(5, 2);
        let id = spawn(&mut state, "KOBOLD", Pos::new(5, 8));
        for y in 4..=6 {
            set_tag(&mut state, Pos::new(y, 7), "GRANITE");
        }
        let outcome = process_monster_movement(&mut state, id, true);
        assert!(!outcome.did_anything());
        assert_eq!(outcome.blocked, 3);
        assert_eq!(state.floor.monster(id).unwrap().pos, Pos::new(5, 8));
    }

    #[test]
    fn test_adjacent_hostile_attacks() {
        let mut state = room_state(20, 10);
        state.player.pos = Pos::new(5, 2);
        let id = spawn(&mut state, "KOBOLD", Pos::new(5, 3));
        let outcome = process_monster_movement(&mut state, id, true);
        assert!(outcome.do_turn);
        assert!(!outcome.do_move);
        assert_eq!(state.floor.monster(id).unwrap().pos, Pos::new(5, 3));
        assert!(state.messages.iter().any(|m| m.starts_with("The kobold")));
    }

    #[test]
    fn test_never_move_stays() {
        let mut state = room_state(20, 10);
        let id = spawn(&mut state, "GREY_MOLD", Pos::new(2, 2));
        let outcome = process_monster_movement(&mut state, id, true);
        assert!(!outcome.did_anything());
    }

    #[test]
    fn test_door_is_opened() {
        let mut state = room_state(20, 10);
        state.player.pos = Pos::new(5, 2);
        let id = spawn(&mut state, "KOBOLD", Pos::new(5, 8));
        for y in 1..9 {
            set_tag(&mut state, Pos::new(y, 7), "GRANITE");
        }
        set_tag(&mut state, Pos::new(5, 7), "CLOSED_DOOR");
        let outcome = process_monster_movement(&mut state, id, true);
        assert!(outcome.do_turn);
        let registry = Arc::clone(&state.registry);
        let open = registry.terrain.by_tag("OPEN_DOOR").unwrap();
        assert_eq!(state.floor.terrain_at(Pos::new(5, 7)), Some(open));
    }

    #[test]
    fn test_teleport_monster_moves_away() {
        let mut state = room_state(30, 20);
        let id = spawn(&mut state, "KOBOLD", Pos::new(3, 3));
        assert!(teleport_monster(&mut state, id, 10));
        let pos = state.floor.monster(id).unwrap().pos;
        assert!(distance(pos, Pos::new(3, 3)) > 3);
    }
}
