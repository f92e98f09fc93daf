//! One monster's turn
//!
//! [`process_monster`] runs the decision sequence for a monster whose energy
//! crossed the action threshold. Each step may end the turn early.

use std::sync::Arc;

use super::lifecycle::{
    SpawnMode, delete_monster, fall_off_horse, multiply_monster, polymorph_chameleon, summon_specific,
};
use super::lore::LoreFlags;
use super::monst::{MonsterFlags2, MonsterId, are_enemies};
use super::movement::{process_monster_movement, teleport_monster};
use super::race::{AbilityFlags, KindFlags, MiscFlags, RaceSpecial, ResistFlags, SummonKind};
use super::spell::{make_attack_spell, monst_spell_monst};
use crate::action::teleport_player_to;
use crate::consts::STAT_COUNT;
use crate::dungeon::{Pos, projectable};
use crate::gameloop::{GameState, UpdateFlags, capitalize};
use crate::player::HexFlags;

/// Per-turn facts gathered while a monster acts
#[derive(Debug, Clone, Copy, Default)]
struct TurnFlags {
    /// The player could see the monster when its turn began
    see_m: bool,
    /// The monster noticed the player (see [`process_stealth`])
    aware: bool,
    is_riding_mon: bool,
    do_turn: bool,
    do_move: bool,
}

/// Run one monster's turn
pub fn process_monster(state: &mut GameState, id: MonsterId) {
    let Some(m) = state.floor.monster(id) else {
        return;
    };
    let mut turn = TurnFlags {
        see_m: m.ml,
        is_riding_mon: state.player.riding == Some(id),
        ..TurnFlags::default()
    };
    let chameleon = m.flags2.contains(MonsterFlags2::CHAMELEON) && !m.is_asleep();

    decide_drop_from_monster(state, id, turn.is_riding_mon);
    if chameleon && state.rng.one_in(state.options.chameleon_chance) {
        polymorph_chameleon(state, id);
    }

    turn.aware = process_stealth(state, id);
    if vanish_summoned_children(state, id, turn.see_m) {
        return;
    }
    if process_quantum_effect(state, id, turn.see_m) {
        return;
    }
    if explode_grenade(state, id) {
        return;
    }
    if runaway_monster(state, id, turn) {
        return;
    }
    if !awake_monster(state, id) {
        return;
    }
    if state.floor.monster(id).is_some_and(|m| m.is_stunned()) && state.rng.one_in(2) {
        return;
    }
    if turn.is_riding_mon {
        state.request(UpdateFlags::BONUS);
    }

    process_angar(state, id, turn.see_m);
    if !state.floor.is_valid(id) || state.is_sweep_over() {
        return;
    }

    if decide_monster_multiplication(state, id) {
        return;
    }
    process_special(state, id);
    if cast_spell(state, id, turn.aware) {
        return;
    }

    let outcome = process_monster_movement(state, id, turn.aware);
    turn.do_turn = outcome.do_turn;
    turn.do_move = outcome.do_move;
    if !state.floor.is_valid(id) || state.is_sweep_over() {
        return;
    }

    // Stuck while chasing a target: let it follow the player's trail again
    if state.player.no_flowed && outcome.blocked > 2 {
        if let Some(m) = state.floor.monster_mut(id).filter(|m| m.target.is_some()) {
            m.flags2.remove(MonsterFlags2::NOFLOW);
        }
    }

    let Some(m) = state.floor.monster(id) else {
        return;
    };
    if !outcome.did_anything() && !m.is_fearful() && !turn.is_riding_mon && turn.aware {
        let freq = state.registry.race(m.race).map_or(0, |r| r.freq_spell);
        if freq > 0 && state.rng.rnd(100) <= freq && make_attack_spell(state, id) {
            return;
        }
    }

    if !process_monster_fear(state, id, turn) {
        return;
    }
    if state.floor.monster(id).is_some_and(|m| m.ml) {
        state.player.change_compassion(-1);
    }
}

/// Throw the player off a mount that cannot be ridden
fn decide_drop_from_monster(state: &mut GameState, id: MonsterId, is_riding_mon: bool) {
    if !is_riding_mon {
        return;
    }
    let rideable = state
        .race_of(id)
        .is_some_and(|r| r.misc.contains(MiscFlags::RIDING));
    if !rideable {
        fall_off_horse(state, 0, true);
    }
}

/// Whether the monster notices a player who moves in super stealth.
///
/// The divisions are applied one at a time; truncation at each step is
/// part of the result.
pub fn process_stealth(state: &mut GameState, id: MonsterId) -> bool {
    let player = &state.player;
    if !player.has_super_stealth() {
        return true;
    }
    let Some(race) = state.race_of(id) else {
        return true;
    };
    let r_level = race.level;

    let mut tmp = player.level * 6 + (player.skill_stl + 10) * 4;
    if player.monlite {
        tmp /= 3;
    }
    if player.has_aggravation() {
        tmp /= 2;
    }
    if r_level > player.level * player.level / 20 + 10 {
        tmp /= 3;
    }
    state.rng.rn2(tmp) <= r_level + 20
}

/// A summoned monster whose summoner is gone vanishes with it.
///
/// A parent link pointing at the monster itself marks an orphan.
pub fn vanish_summoned_children(state: &mut GameState, id: MonsterId, see_m: bool) -> bool {
    let Some(m) = state.floor.monster(id) else {
        return false;
    };
    let Some(parent) = m.parent else {
        return false;
    };
    if parent != id && state.floor.is_valid(parent) {
        return false;
    }

    let named_pet = m.is_named_pet();
    let name = state.monster_name(id);
    if see_m {
        state.message(format!("{} disappears!", capitalize(&name)));
    }
    if state.options.record_named_pet && named_pet {
        state.diary_entry(format!("{name} disappeared because its summoner was gone."));
    }
    tracing::debug!(id = id.0, parent = parent.0, "summoned child vanished");
    delete_monster(state, id);
    true
}

/// Quantum monsters flicker in and out of existence
fn process_quantum_effect(state: &mut GameState, id: MonsterId, see_m: bool) -> bool {
    let Some(race) = state.race_of(id) else {
        return false;
    };
    if !race.kind.contains(KindFlags::QUANTUM) {
        return false;
    }
    let unique = race.is_unique();
    if !state.rng.one_in(2) {
        return false;
    }
    if state.rng.rn2((id.0 % 100) as i32 + 10) != 0 {
        return false;
    }

    let name = capitalize(&state.monster_name(id));
    if !unique {
        if see_m {
            state.message(format!("{name} disappears!"));
        }
        delete_monster(state, id);
        return true;
    }

    if state.rng.one_in(2) {
        if see_m {
            state.message(format!("{name} suddenly blinks away."));
        }
        teleport_monster(state, id, 10);
    } else {
        if see_m {
            state.message(format!("{name} draws you in."));
        }
        if let Some(pos) = state.floor.monster(id).map(|m| m.pos) {
            teleport_player_to(state, pos);
        }
    }
    true
}

/// A living grenade burns a hit point every turn and bursts at zero
fn explode_grenade(state: &mut GameState, id: MonsterId) -> bool {
    let is_grenade = state
        .race_of(id)
        .is_some_and(|r| r.special == Some(RaceSpecial::Grenade));
    if !is_grenade {
        return false;
    }
    let Some(m) = state.floor.monster_mut(id) else {
        return false;
    };
    m.hp -= 1;
    if m.hp > 0 {
        return false;
    }
    if m.ml {
        let name = capitalize(&state.monster_name(id));
        state.message(format!("{name} explodes into tiny shreds."));
    }
    delete_monster(state, id);
    true
}

/// A badly hurt friendly unique leaves the floor
fn runaway_monster(state: &mut GameState, id: MonsterId, turn: TurnFlags) -> bool {
    let Some(m) = state.floor.monster(id) else {
        return false;
    };
    let Some(race) = state.race_of(id) else {
        return false;
    };
    let can_runaway = (m.is_pet() || m.is_friendly())
        && race.is_unique_or_nazgul()
        && !state.world.is_phase_out();
    if !can_runaway || m.hp >= m.maxhp / 3 {
        return false;
    }

    let name = capitalize(&state.monster_name(id));
    if turn.is_riding_mon {
        fall_off_horse(state, 0, true);
    }
    if turn.see_m || state.floor.monster(id).is_some_and(|m| m.is_pet()) {
        state.message(format!("{name} escapes from the dungeon!"));
    }
    tracing::debug!(id = id.0, "monster ran away");
    delete_monster(state, id);
    true
}

/// Sleepers only wake to an aggravating player. Returns false if the
/// monster stays asleep.
fn awake_monster(state: &mut GameState, id: MonsterId) -> bool {
    let Some(m) = state.floor.monster(id) else {
        return false;
    };
    if !m.is_asleep() {
        return true;
    }
    if !state.player.has_aggravation() {
        return false;
    }

    let (ml, original, race) = (m.ml, m.is_original_ap(), m.race);
    if let Some(m) = state.floor.monster_mut(id) {
        m.timers.sleep = 0;
    }
    if ml {
        let name = capitalize(&state.monster_name(id));
        state.message(format!("{name} wakes up."));
        if original {
            let cap = state.options.lore_wake_cap;
            state.lore.note_wake(race, cap);
        }
    }
    true
}

/// Pets and friends may turn on the player
fn process_angar(state: &mut GameState, id: MonsterId, see_m: bool) {
    let Some(m) = state.floor.monster(id) else {
        return;
    };
    let Some(race) = state.race_of(id) else {
        return;
    };
    let mut gets_angry = m.is_friendly() && state.player.has_aggravation();
    let has_hostile = race.is_unique_or_nazgul() && race.has_hostile_align(state.player.alignment);
    let resist_all = race.resist.contains(ResistFlags::RESIST_ALL);
    if m.is_pet() && (has_hostile || resist_all) {
        gets_angry = true;
    }
    if state.world.is_phase_out() || !gets_angry {
        return;
    }

    let is_pet = m.is_pet();
    let name = capitalize(&state.monster_name(id));
    if state.player.riding == Some(id) {
        let skill = state.player.riding_skill;
        if (state.player.alignment / 10).abs() < state.rng.rn2(skill) {
            return;
        }
        state.message(format!("{name} suddenly begins unruly!"));
        if !fall_off_horse(state, 1, true) {
            return;
        }
        state.message("You have fallen.");
    }

    if is_pet || see_m {
        state.message(format!("{name} suddenly becomes hostile!"));
    }
    if let Some(m) = state.floor.monster_mut(id) {
        m.set_hostile();
    }
    tracing::debug!(id = id.0, "monster turned hostile");
}

/// Breeders split when the neighbourhood is not crowded.
///
/// Returns true if a child was born, which ends the turn.
pub fn decide_monster_multiplication(state: &mut GameState, id: MonsterId) -> bool {
    let Some(m) = state.floor.monster(id) else {
        return false;
    };
    let Some(race) = state.race_of(id) else {
        return false;
    };
    if !race.misc.contains(MiscFlags::MULTIPLY) || state.floor.num_repro >= state.options.max_reproduction {
        return false;
    }

    let (pos, is_pet, seen, race_id) = (m.pos, m.is_pet(), m.ml && m.is_original_ap(), m.race);
    let mut k = pos
        .moore_neighbourhood()
        .filter(|p| state.floor.in_bounds(*p) && state.floor.has_monster(*p))
        .count() as i32;
    if state.player.hex.contains(HexFlags::ANTI_MULTI) {
        k = 8;
    }

    let chance = state.options.reproduction_chance;
    if k < 4 && (k == 0 || state.rng.rn2(k * chance) == 0) {
        let mode = if is_pet { SpawnMode::PET } else { SpawnMode::empty() };
        if let Some(child) = multiply_monster(state, id, mode) {
            if seen && state.floor.monster(child).is_some_and(|c| c.ml) {
                state.lore.learn(race_id, LoreFlags::MULTIPLY);
            }
            return true;
        }
    }
    false
}

/// Race-specific special action: the mold master grows molds
fn process_special(state: &mut GameState, id: MonsterId) {
    let registry = Arc::clone(&state.registry);
    let Some(m) = state.floor.monster(id) else {
        return;
    };
    let Some(race) = registry.race(m.race) else {
        return;
    };
    let can_do_special = race.ability.contains(AbilityFlags::SPECIAL)
        && race.special == Some(RaceSpecial::MoldMaster)
        && !state.floor.flags.inside_arena
        && !state.world.is_phase_out()
        && race.freq_spell != 0;
    let (pos, race_id, seen) = (m.pos, m.race, m.ml && m.is_original_ap());
    let mode = if m.is_pet() { SpawnMode::PET } else { SpawnMode::empty() };
    if !can_do_special || state.rng.rnd(100) > race.freq_spell {
        return;
    }

    let rlev = race.level.max(1);
    let mut count = 0;
    for _ in 0..STAT_COUNT {
        let child = summon_specific(state, Some(id), pos, rlev, SummonKind::Mold, mode);
        if child.and_then(|c| state.floor.monster(c)).is_some_and(|c| c.ml) {
            count += 1;
        }
    }
    if count > 0 && seen {
        state.lore.learn(race_id, LoreFlags::SPECIAL);
    }
}

/// Spellcasting step. A monster with an enemy monster in its sights fires
/// at it first; otherwise the player is the preferred target.
fn cast_spell(state: &mut GameState, id: MonsterId, aware: bool) -> bool {
    let registry = Arc::clone(&state.registry);
    let Some(m) = state.floor.monster(id) else {
        return false;
    };
    let Some(race) = registry.race(m.race) else {
        return false;
    };
    let target = m.target;
    if race.freq_spell == 0 || state.rng.rnd(100) > race.freq_spell {
        return false;
    }

    let counter_attack = target.is_some_and(|to| counter_target(state, id, to));
    if counter_attack {
        monst_spell_monst(state, id) || (aware && make_attack_spell(state, id))
    } else {
        (aware && make_attack_spell(state, id)) || monst_spell_monst(state, id)
    }
}

/// True if an enemy of `id` stands at `to` within projection range
fn counter_target(state: &GameState, id: MonsterId, to: Pos) -> bool {
    let Some(m) = state.floor.monster(id) else {
        return false;
    };
    let Some(t) = state.floor.monster_at(to).and_then(|t| state.floor.monster(t)) else {
        return false;
    };
    let (Some(m_race), Some(t_race)) = (state.registry.race(m.race), state.registry.race(t.race)) else {
        return false;
    };
    are_enemies(m, m_race, t, t_race)
        && projectable(&state.floor, &state.registry.terrain, m.pos, to, state.options.max_range)
}

/// A cornered frightened monster that could do nothing turns to fight.
///
/// Returns true if it did.
fn process_monster_fear(state: &mut GameState, id: MonsterId, turn: TurnFlags) -> bool {
    let Some(m) = state.floor.monster_mut(id) else {
        return false;
    };
    let determined = !turn.do_turn && !turn.do_move && m.is_fearful() && turn.aware;
    if !determined {
        return false;
    }
    m.timers.fear = 0;
    if turn.see_m {
        let name = capitalize(&state.monster_name(id));
        state.message(format!("{name} turns to fight!"));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::CellInfo;
    use crate::monster::SmartFlags;
    use crate::player::PlayerFlags;
    use crate::rng::GameRng;
    use crate::test_support::{room_state, seed_where, set_tag, spawn};
    use crate::vision::update_view;

    #[test]
    fn test_stealth_always_aware_without_cloak() {
        let mut state = room_state(12, 8);
        let id = spawn(&mut state, "KOBOLD", Pos::new(2, 2));
        for _ in 0..20 {
            assert!(process_stealth(&mut state, id));
        }
    }

    #[test]
    fn test_stealth_formula_bounds() {
        let mut state = room_state(12, 8);
        state.player.flags |= PlayerFlags::SUPER_STEALTH;
        state.player.level = 1;
        state.player.skill_stl = 0;
        // tmp = 6 + 40 = 46; a kobold needs rn2(46) <= 22
        let id = spawn(&mut state, "KOBOLD", Pos::new(2, 2));
        let aware = (0..200).filter(|_| process_stealth(&mut state, id)).count();
        assert!(aware > 50 && aware < 150);
        // A level 40 ringwraith: tmp = 46 / 3 = 15, always below 60
        let wraith = spawn(&mut state, "RINGWRAITH", Pos::new(3, 3));
        assert!((0..50).all(|_| process_stealth(&mut state, wraith)));
    }

    #[test]
    fn test_orphan_vanishes() {
        let mut state = room_state(12, 8);
        let id = spawn(&mut state, "GREY_MOLD", Pos::new(2, 2));
        state.floor.monster_mut(id).unwrap().parent = Some(id);
        assert!(vanish_summoned_children(&mut state, id, true));
        assert!(!state.floor.is_valid(id));
        assert_eq!(state.messages, vec!["The grey mold disappears!"]);
    }

    #[test]
    fn test_named_pet_orphan_writes_diary() {
        let mut state = room_state(12, 8);
        let master = spawn(&mut state, "MOLD_MASTER", Pos::new(4, 4));
        let id = spawn(&mut state, "GREY_MOLD", Pos::new(2, 2));
        {
            let m = state.floor.monster_mut(id).unwrap();
            m.parent = Some(master);
            m.set_pet();
            m.nickname = Some("Fuzzy".into());
        }
        assert!(!vanish_summoned_children(&mut state, id, false));
        delete_monster(&mut state, master);
        assert!(vanish_summoned_children(&mut state, id, false));
        assert_eq!(state.diary.len(), 1);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_grenade_burns_down() {
        let mut state = room_state(12, 8);
        let id = spawn(&mut state, "GRENADE", Pos::new(2, 2));
        state.floor.monster_mut(id).unwrap().hp = 2;
        assert!(!explode_grenade(&mut state, id));
        assert!(explode_grenade(&mut state, id));
        assert!(!state.floor.is_valid(id));
    }

    #[test]
    fn test_sleeper_stays_asleep_without_aggravation() {
        let mut state = room_state(12, 8);
        let id = spawn(&mut state, "KOBOLD", Pos::new(2, 2));
        state.floor.monster_mut(id).unwrap().timers.sleep = 30;
        assert!(!awake_monster(&mut state, id));
        state.player.flags |= PlayerFlags::AGGRAVATE;
        state.floor.monster_mut(id).unwrap().ml = true;
        assert!(awake_monster(&mut state, id));
        assert!(!state.floor.monster(id).unwrap().is_asleep());
        assert_eq!(state.lore.get(state.floor.monster(id).unwrap().race).wake, 1);
    }

    #[test]
    fn test_multiplication_respects_cap() {
        let mut state = room_state(12, 8);
        let id = spawn(&mut state, "WHITE_LOUSE", Pos::new(3, 3));
        state.floor.num_repro = state.options.max_reproduction;
        for _ in 0..50 {
            assert!(!decide_monster_multiplication(&mut state, id));
        }
        assert_eq!(state.floor.monster_count(), 1);
    }

    #[test]
    fn test_lonely_louse_always_splits() {
        let mut state = room_state(12, 8);
        let id = spawn(&mut state, "WHITE_LOUSE", Pos::new(3, 3));
        // The louse itself counts, so k = 1 and the roll is 1 in 8
        let mut split = false;
        for _ in 0..200 {
            if decide_monster_multiplication(&mut state, id) {
                split = true;
                break;
            }
        }
        assert!(split);
    }

    #[test]
    fn test_anti_multi_hex_blocks() {
        let mut state = room_state(12, 8);
        state.player.hex |= HexFlags::ANTI_MULTI;
        let id = spawn(&mut state, "WHITE_LOUSE", Pos::new(3, 3));
        for _ in 0..100 {
            assert!(!decide_monster_multiplication(&mut state, id));
        }
    }

    #[test]
    fn test_fear_turns_to_fight() {
        let mut state = room_state(12, 8);
        let id = spawn(&mut state, "KOBOLD", Pos::new(2, 2));
        state.floor.monster_mut(id).unwrap().timers.fear = 5;
        let turn = TurnFlags {
            see_m: true,
            aware: true,
            ..TurnFlags::default()
        };
        assert!(process_monster_fear(&mut state, id, turn));
        assert!(!state.floor.monster(id).unwrap().is_fearful());
        assert_eq!(state.messages, vec!["The kobold turns to fight!"]);
    }

    fn split_once(state: &mut GameState, id: MonsterId) {
        assert!((0..500).any(|_| decide_monster_multiplication(state, id)));
    }

    #[test]
    fn test_unseen_child_teaches_nothing() {
        let mut state = room_state(12, 8);
        let id = spawn(&mut state, "WHITE_LOUSE", Pos::new(3, 3));
        state.floor.monster_mut(id).unwrap().ml = true;
        // No view computed, so the child is born out of sight
        split_once(&mut state, id);
        let race = state.floor.monster(id).unwrap().race;
        assert!(!state.lore.knows(race, LoreFlags::MULTIPLY));
    }

    #[test]
    fn test_seen_child_teaches_multiply() {
        let mut state = room_state(12, 8);
        let cells: Vec<Pos> = state.floor.positions().collect();
        for p in cells {
            state.floor.cell_mut(p).unwrap().info.insert(CellInfo::GLOW);
        }
        update_view(&mut state);
        let id = spawn(&mut state, "WHITE_LOUSE", Pos::new(3, 3));
        state.floor.monster_mut(id).unwrap().ml = true;
        split_once(&mut state, id);
        let race = state.floor.monster(id).unwrap().race;
        assert!(state.lore.knows(race, LoreFlags::MULTIPLY));
    }

    #[test]
    fn test_opposed_unique_pet_turns_hostile_once() {
        let mut state = room_state(12, 8);
        state.player.hp = 10_000;
        state.player.alignment = 50;
        state.player.flags |= PlayerFlags::AGGRAVATE;
        let id = spawn(&mut state, "RINGWRAITH", Pos::new(2, 2));
        state.floor.monster_mut(id).unwrap().set_pet();

        process_monster(&mut state, id);
        assert!(state.floor.monster(id).unwrap().is_hostile());
        process_monster(&mut state, id);
        let notices = state
            .messages
            .iter()
            .filter(|m| m.as_str() == "The ringwraith suddenly becomes hostile!")
            .count();
        assert_eq!(notices, 1);
    }

    #[test]
    fn test_unseen_friend_turns_quietly() {
        let mut state = room_state(12, 8);
        state.player.flags |= PlayerFlags::AGGRAVATE;
        let id = spawn(&mut state, "KOBOLD", Pos::new(2, 2));
        state.floor.monster_mut(id).unwrap().smart.insert(SmartFlags::FRIENDLY);
        process_angar(&mut state, id, false);
        assert!(state.floor.monster(id).unwrap().is_hostile());
        assert!(state.messages.is_empty());

        let seen = spawn(&mut state, "KOBOLD", Pos::new(2, 4));
        state.floor.monster_mut(seen).unwrap().smart.insert(SmartFlags::FRIENDLY);
        process_angar(&mut state, seen, true);
        assert_eq!(state.messages, vec!["The kobold suddenly becomes hostile!"]);
    }

    fn ridden_horse(state: &mut GameState) -> MonsterId {
        let origin = state.player.pos;
        let horse = spawn(state, "WILD_HORSE", origin);
        let m = state.floor.monster_mut(horse).unwrap();
        m.set_pet();
        m.smart.insert(SmartFlags::FRIENDLY);
        state.player.riding = Some(horse);
        state.player.flags |= PlayerFlags::AGGRAVATE;
        horse
    }

    #[test]
    fn test_skilled_rider_keeps_angry_mount() {
        let mut state = room_state(12, 8);
        let horse = ridden_horse(&mut state);
        state.player.riding_skill = 1000;
        state.rng = GameRng::new(seed_where(|r| r.rn2(1000) > 0));
        process_angar(&mut state, horse, true);
        assert!(state.floor.monster(horse).unwrap().is_pet());
        assert_eq!(state.player.riding, Some(horse));
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_unruly_mount_throws_rider() {
        let mut state = room_state(12, 8);
        let origin = state.player.pos;
        let horse = ridden_horse(&mut state);
        // With no skill the resist roll is always zero
        state.player.riding_skill = 0;
        process_angar(&mut state, horse, true);
        assert!(state.floor.monster(horse).unwrap().is_hostile());
        assert_eq!(state.player.riding, None);
        assert!(state.player.pos.is_adjacent(origin));
        assert_eq!(
            state.messages,
            vec![
                "The wild horse suddenly begins unruly!",
                "You have fallen from the wild horse.",
                "You have fallen.",
                "The wild horse suddenly becomes hostile!",
            ]
        );
    }

    fn walled_in_chaser(state: &mut GameState) -> MonsterId {
        state.player.pos = Pos::new(5, 2);
        state.player.no_flowed = true;
        let id = spawn(state, "KOBOLD", Pos::new(5, 8));
        let m = state.floor.monster_mut(id).unwrap();
        m.target = Some(Pos::new(5, 2));
        m.flags2.insert(MonsterFlags2::NOFLOW);
        id
    }

    #[test]
    fn test_blocked_chaser_flows_again() {
        let mut state = room_state(20, 10);
        let id = walled_in_chaser(&mut state);
        for y in 4..=6 {
            set_tag(&mut state, Pos::new(y, 7), "GRANITE");
        }
        process_monster(&mut state, id);
        assert!(!state.floor.monster(id).unwrap().flags2.contains(MonsterFlags2::NOFLOW));
    }

    #[test]
    fn test_moving_chaser_keeps_noflow() {
        let mut state = room_state(20, 10);
        let id = walled_in_chaser(&mut state);
        process_monster(&mut state, id);
        let m = state.floor.monster(id).unwrap();
        assert_eq!(m.pos.x, 7);
        assert!(m.flags2.contains(MonsterFlags2::NOFLOW));
    }
}
