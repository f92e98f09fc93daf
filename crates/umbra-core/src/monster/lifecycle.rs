//! Monster birth, death and transformation
//!
//! Placement, summoning and reproduction on the current floor, deletion
//! with its riding and time-stop bookkeeping, chameleon polymorph and the
//! player's fall from a mount.

use std::sync::Arc;

use bitflags::bitflags;

use super::monst::{Monster, MonsterId};
use super::movement::can_enter;
use super::race::{KindFlags, MiscFlags, MonsterRace, RaceId, SummonKind};
use crate::consts::speed_to_energy;
use crate::dungeon::{Pos, TerrainFlags, distance, projectable};
use crate::gameloop::{GameState, SoundCue, UpdateFlags, capitalize};
use crate::vision::sight_of;

bitflags! {
    /// How a new monster enters the floor
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpawnMode: u8 {
        const PET = 0x01;
        const FRIENDLY = 0x02;
        /// Born awake
        const NO_SLEEP = 0x04;
    }
}

// ============================================================================
// Creation
// ============================================================================

/// Speed of a new individual: normal races vary around their base speed
pub fn individual_speed(state: &mut GameState, race: &MonsterRace) -> i16 {
    if race.is_unique() || state.floor.flags.inside_arena {
        return race.speed;
    }
    let spread = i32::from(speed_to_energy(race.speed) / 10);
    let speed = state.rng.rand_spread(i32::from(race.speed), spread);
    speed.clamp(1, i32::from(i16::MAX)) as i16
}

/// Put a new monster of `race_id` at `pos`.
///
/// Fails on cells the race cannot stand on, on the player's cell, and for a
/// unique already present on the floor.
pub fn place_monster(
    state: &mut GameState,
    race_id: RaceId,
    pos: Pos,
    mode: SpawnMode,
    parent: Option<MonsterId>,
) -> Option<MonsterId> {
    let registry = Arc::clone(&state.registry);
    let race = registry.race(race_id)?;
    if pos == state.player.pos || !can_enter(state, pos, race) {
        return None;
    }
    if race.is_unique() && state.floor.monsters().any(|m| m.race == race_id) {
        return None;
    }

    let hp = race.roll_hp(&mut state.rng);
    let speed = individual_speed(state, race);
    let mut monster = Monster::from_race(race_id, race, pos, hp, speed);
    monster.energy_need = state.options.energy_need - state.rng.rn2(100) as i16;
    monster.parent = parent;
    if race.sleep > 0 && !mode.contains(SpawnMode::NO_SLEEP) {
        monster.timers.sleep = race.sleep * 2 + state.rng.rnd(race.sleep * 10);
    }
    if mode.contains(SpawnMode::PET) {
        monster.set_pet();
    } else if mode.contains(SpawnMode::FRIENDLY) {
        monster.smart.insert(super::monst::SmartFlags::FRIENDLY);
    }

    (monster.cdis, monster.ml) = sight_of(state, pos);

    let id = state.floor.add_monster(monster)?;
    if race.emits_light() {
        state.request(UpdateFlags::MONSTER_LITE);
    }
    tracing::debug!(id = id.0, race = %race.tag, ?pos, "monster placed");
    Some(id)
}

/// Find a free cell near `center` for `race`.
///
/// Only cells in the nearest distance class that has any candidates are
/// considered; the pick among them is uniform.
pub fn scatter(state: &mut GameState, center: Pos, max_dist: i32, race: &MonsterRace) -> Option<Pos> {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let mut best: Vec<Pos> = Vec::new();
    let mut best_dist = i32::MAX;

    for dy in -max_dist..=max_dist {
        for dx in -max_dist..=max_dist {
            let p = Pos::new(center.y + dy, center.x + dx);
            let d = distance(center, p);
            if d > max_dist || d > best_dist {
                continue;
            }
            if !state.floor.in_bounds(p)
                || p == state.player.pos
                || !can_enter(state, p, race)
                || !projectable(&state.floor, terrain, center, p, max_dist)
            {
                continue;
            }
            if d < best_dist {
                best.clear();
                best_dist = d;
            }
            best.push(p);
        }
    }
    state.rng.choose(&best).copied()
}

/// Call up one monster of `kind` near `center`.
///
/// `who` is the summoner, `None` for traps and curses. A summoner that
/// kills its children on death becomes the child's parent; a pet summoner
/// gets a pet.
pub fn summon_specific(
    state: &mut GameState,
    who: Option<MonsterId>,
    center: Pos,
    rlev: i32,
    kind: SummonKind,
    mode: SpawnMode,
) -> Option<MonsterId> {
    let registry = Arc::clone(&state.registry);
    let max_level = (state.floor.dun_level + rlev) / 2 + 5;
    let candidates: Vec<RaceId> = registry
        .races
        .iter()
        .filter(|(_, race)| kind.accepts(race) && race.level <= max_level)
        .map(|(id, _)| id)
        .collect();
    let race_id = *state.rng.choose(&candidates)?;
    let race = registry.race(race_id)?;
    let pos = scatter(state, center, 2, race)?;

    let summoner = who.and_then(|id| state.floor.monster(id).map(|m| (id, m.race, m.is_pet())));
    let mut mode = mode;
    let mut parent = None;
    if let Some((id, summoner_race, is_pet)) = summoner {
        if is_pet {
            mode |= SpawnMode::PET;
        }
        if registry
            .race(summoner_race)
            .is_some_and(|r| r.misc.contains(MiscFlags::KILL_CHILDREN))
        {
            parent = Some(id);
        }
    }

    let child = place_monster(state, race_id, pos, mode, parent)?;
    state.sound(SoundCue::Summon);
    tracing::debug!(child = child.0, %kind, rlev, "summoned");
    Some(child)
}

/// Split a monster: a copy of its race appears next to it.
///
/// Children of pets are pets. Counts against the floor's reproduction cap
/// when the race breeds on its own.
pub fn multiply_monster(state: &mut GameState, id: MonsterId, mode: SpawnMode) -> Option<MonsterId> {
    let registry = Arc::clone(&state.registry);
    let (race_id, pos, is_pet) = state.floor.monster(id).map(|m| (m.race, m.pos, m.is_pet()))?;
    let race = registry.race(race_id)?;
    let to = scatter(state, pos, 1, race)?;
    let mode = if is_pet { mode | SpawnMode::PET } else { mode };
    let child = place_monster(state, race_id, to, mode, None)?;
    if race.misc.contains(MiscFlags::MULTIPLY) {
        state.floor.num_repro += 1;
    }
    state.sound(SoundCue::Multiply);
    tracing::trace!(parent = id.0, child = child.0, num_repro = state.floor.num_repro, "monster multiplied");
    Some(child)
}

// ============================================================================
// Removal
// ============================================================================

/// Take a monster off the floor for good
pub fn delete_monster(state: &mut GameState, id: MonsterId) {
    let Some(monster) = state.floor.remove_monster(id) else {
        return;
    };
    if state.player.riding == Some(id) {
        state.player.riding = None;
        state.request(UpdateFlags::BONUS | UpdateFlags::VIEW);
    }
    if state.world.timewalk == Some(id) {
        state.world.timewalk = None;
    }
    if state.registry.race(monster.race).is_some_and(MonsterRace::emits_light) {
        state.request(UpdateFlags::MONSTER_LITE);
    }
    tracing::trace!(id = id.0, "monster deleted");
}

/// Hurt a monster. Returns true if it died.
pub fn damage_monster(state: &mut GameState, id: MonsterId, dam: i32) -> bool {
    let Some(m) = state.floor.monster_mut(id) else {
        return false;
    };
    m.hp -= dam;
    if !m.is_dead() {
        return false;
    }
    if m.ml {
        let name = capitalize(&state.monster_name(id));
        state.message(format!("{name} dies."));
    }
    delete_monster(state, id);
    true
}

/// Drop empty monster slots between ticks.
///
/// References held by the player and the world are remapped along with the
/// floor's own.
pub fn compact_monsters(state: &mut GameState) {
    let remap = state.floor.compact_monsters();
    let lookup = |id: MonsterId| remap.get(id.0 as usize).copied().flatten();
    state.player.riding = state.player.riding.and_then(lookup);
    state.world.timewalk = state.world.timewalk.and_then(lookup);
}

// ============================================================================
// Chameleons
// ============================================================================

/// Rescale hit points to a new maximum, keeping the ratio.
///
/// Never drops below one hit point.
pub fn scale_hp(old_max: i32, new_max: i32, hp: i32) -> i32 {
    if old_max <= 0 {
        return new_max.max(1);
    }
    let scaled = i64::from(hp) * i64::from(new_max) / i64::from(old_max);
    scaled.clamp(1, i64::from(i32::MAX)) as i32
}

/// Turn a chameleon into a random race of suitable level.
///
/// Returns the new race, or `None` if no other form was available.
pub fn polymorph_chameleon(state: &mut GameState, id: MonsterId) -> Option<RaceId> {
    let registry = Arc::clone(&state.registry);
    let (old_race_id, old_max, maxhp, hp) = state
        .floor
        .monster(id)
        .map(|m| (m.race, m.max_maxhp, m.maxhp, m.hp))?;
    let old_race = registry.race(old_race_id)?;
    let max_level = state.floor.dun_level + 5;
    let candidates: Vec<RaceId> = registry
        .races
        .iter()
        .filter(|(rid, race)| {
            *rid != old_race_id
                && !race.is_unique()
                && !race.kind.contains(KindFlags::QUANTUM)
                && race.level <= max_level
        })
        .map(|(rid, _)| rid)
        .collect();
    let new_race_id = *state.rng.choose(&candidates)?;
    let new_race = registry.race(new_race_id)?;

    let new_max = new_race.roll_hp(&mut state.rng);
    let speed = individual_speed(state, new_race);
    let m = state.floor.monster_mut(id)?;
    m.race = new_race_id;
    m.ap_race = new_race_id;
    m.max_maxhp = new_max;
    m.maxhp = scale_hp(old_max, new_max, maxhp);
    m.hp = scale_hp(old_max, new_max, hp);
    m.mspeed = speed;
    m.dealt_damage = 0;

    if old_race.emits_light() || new_race.emits_light() {
        state.request(UpdateFlags::MONSTER_LITE);
    }
    tracing::debug!(id = id.0, from = %old_race.tag, to = %new_race.tag, "chameleon polymorph");

    if state.player.riding == Some(id) {
        let msg = format!("Suddenly, {} transforms!", state.monster_name(id));
        state.message(msg);
        if !new_race.misc.contains(MiscFlags::RIDING) {
            fall_off_horse(state, 0, true);
        }
    }
    Some(new_race_id)
}

// ============================================================================
// Riding
// ============================================================================

/// Throw the player from the mount onto a free neighbouring cell.
///
/// Without room to land the player stays mounted unless `force` is set, in
/// which case they dismount where they are. Returns true on a fall.
pub fn fall_off_horse(state: &mut GameState, dam: i32, force: bool) -> bool {
    let Some(mount) = state.player.riding else {
        return false;
    };
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let origin = state.player.pos;
    let free: Vec<Pos> = origin
        .moore_neighbourhood()
        .filter(|p| {
            *p != origin
                && state.floor.has_flag(terrain, *p, TerrainFlags::MOVE)
                && !state.floor.has_monster(*p)
        })
        .collect();

    match state.rng.choose(&free).copied() {
        Some(landing) => state.player.pos = landing,
        None if force => {}
        None => return false,
    }

    let name = state.monster_name(mount);
    state.player.riding = None;
    state.message(format!("You have fallen from {name}."));
    if dam > 0 {
        state.bad_status().take_hit(dam, "falling off a mount");
    }
    state.request(UpdateFlags::VIEW | UpdateFlags::BONUS);
    tracing::debug!(mount = mount.0, "player fell off mount");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{room_state, set_tag, spawn};

    #[test]
    fn test_scale_hp_keeps_ratio() {
        assert_eq!(scale_hp(20, 40, 10), 20);
        assert_eq!(scale_hp(30, 10, 1), 1);
        assert_eq!(scale_hp(0, 12, 5), 12);
    }

    #[test]
    fn test_place_monster_rejects_player_cell_and_walls() {
        let mut state = room_state(20, 12);
        let kobold = state.registry.races.by_tag("KOBOLD").unwrap();
        let p = state.player.pos;
        assert!(place_monster(&mut state, kobold, p, SpawnMode::empty(), None).is_none());
        assert!(place_monster(&mut state, kobold, Pos::new(0, 0), SpawnMode::empty(), None).is_none());
        let id = place_monster(&mut state, kobold, Pos::new(2, 2), SpawnMode::PET, None).unwrap();
        assert!(state.floor.monster(id).unwrap().is_pet());
    }

    #[test]
    fn test_unique_only_once() {
        let mut state = room_state(20, 12);
        let fang = state.registry.races.by_tag("FANG").unwrap();
        assert!(place_monster(&mut state, fang, Pos::new(2, 2), SpawnMode::empty(), None).is_some());
        assert!(place_monster(&mut state, fang, Pos::new(3, 3), SpawnMode::empty(), None).is_none());
    }

    #[test]
    fn test_multiply_counts_reproduction() {
        let mut state = room_state(20, 12);
        let id = spawn(&mut state, "WHITE_LOUSE", Pos::new(3, 3));
        assert!(multiply_monster(&mut state, id, SpawnMode::empty()).is_some());
        assert_eq!(state.floor.monster_count(), 2);
        assert_eq!(state.floor.num_repro, 1);
        let child = state.floor.monsters().find(|m| m.id != id).unwrap();
        assert!(child.pos.is_adjacent(Pos::new(3, 3)));
    }

    #[test]
    fn test_multiply_needs_room() {
        let mut state = room_state(20, 12);
        let id = spawn(&mut state, "WHITE_LOUSE", Pos::new(3, 3));
        for p in Pos::new(3, 3).moore_neighbourhood() {
            if p != Pos::new(3, 3) {
                set_tag(&mut state, p, "GRANITE");
            }
        }
        assert!(multiply_monster(&mut state, id, SpawnMode::empty()).is_none());
        assert_eq!(state.floor.num_repro, 0);
    }

    #[test]
    fn test_summon_links_parent_for_kill_children() {
        let mut state = room_state(20, 12);
        let master = spawn(&mut state, "MOLD_MASTER", Pos::new(3, 3));
        let mode = SpawnMode::empty();
        let child =
            summon_specific(&mut state, Some(master), Pos::new(3, 3), 5, SummonKind::Mold, mode).unwrap();
        let child = state.floor.monster(child).unwrap();
        assert_eq!(child.parent, Some(master));
        assert!(state.sounds.contains(&SoundCue::Summon));
    }

    #[test]
    fn test_delete_clears_riding() {
        let mut state = room_state(20, 12);
        let origin = state.player.pos;
        let horse = spawn(&mut state, "WILD_HORSE", origin);
        state.player.riding = Some(horse);
        state.world.timewalk = Some(horse);
        delete_monster(&mut state, horse);
        assert!(state.player.riding.is_none());
        assert!(state.world.timewalk.is_none());
        assert!(!state.floor.is_valid(horse));
    }

    #[test]
    fn test_damage_monster_kills_below_zero() {
        let mut state = room_state(20, 12);
        let id = spawn(&mut state, "KOBOLD", Pos::new(3, 3));
        let hp = state.floor.monster(id).unwrap().hp;
        assert!(!damage_monster(&mut state, id, hp));
        assert!(damage_monster(&mut state, id, 1));
        assert!(!state.floor.is_valid(id));
    }

    #[test]
    fn test_fall_off_horse_lands_next_to_mount() {
        let mut state = room_state(20, 12);
        let origin = state.player.pos;
        let horse = spawn(&mut state, "WILD_HORSE", origin);
        state.player.riding = Some(horse);
        assert!(fall_off_horse(&mut state, 3, false));
        assert!(state.player.pos.is_adjacent(origin));
        assert!(state.player.riding.is_none());
        assert_eq!(state.player.hp, state.player.mhp - 3);
        assert!(state.messages.iter().any(|m| m == "You have fallen from the wild horse."));
    }

    #[test]
    fn test_chameleon_changes_race() {
        let mut state = room_state(20, 12);
        let id = spawn(&mut state, "CHAMELEON", Pos::new(3, 3));
        let old = state.floor.monster(id).unwrap().race;
        let new = polymorph_chameleon(&mut state, id).unwrap();
        assert_ne!(old, new);
        let m = state.floor.monster(id).unwrap();
        assert!(m.hp >= 1 && m.hp <= m.maxhp.max(1));
        assert!(m.flags2.contains(crate::monster::MonsterFlags2::CHAMELEON));
    }

    #[test]
    fn test_compact_remaps_riding() {
        let mut state = room_state(20, 12);
        let a = spawn(&mut state, "KOBOLD", Pos::new(2, 2));
        let origin = state.player.pos;
        let horse = spawn(&mut state, "WILD_HORSE", origin);
        state.player.riding = Some(horse);
        delete_monster(&mut state, a);
        compact_monsters(&mut state);
        assert_eq!(state.player.riding, Some(MonsterId(0)));
    }
}
