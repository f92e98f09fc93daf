//! Monster spellcasting at the player and at other monsters

use std::sync::Arc;

use super::lifecycle::{SpawnMode, damage_monster, summon_specific};
use super::monst::{MonsterId, are_enemies};
use super::movement::teleport_monster;
use super::race::{MonsterSpell, ResistFlags};
use crate::action::aggravate_monsters;
use crate::dungeon::{clean_shot, distance, projectable};
use crate::gameloop::{GameState, SoundCue, capitalize};
use crate::player::PlayerResists;

/// Cast a spell at the player.
///
/// The player must be in range and reachable by a projection; bolts also
/// need a clean shot. Returns true if a spell was cast.
pub fn make_attack_spell(state: &mut GameState, id: MonsterId) -> bool {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let Some(m) = state.floor.monster(id) else {
        return false;
    };
    let Some(race) = registry.race(m.race) else {
        return false;
    };
    let (from, player, range) = (m.pos, state.player.pos, state.options.max_range);
    if distance(from, player) > range || !projectable(&state.floor, terrain, from, player, range) {
        return false;
    }
    let clean = clean_shot(&state.floor, terrain, from, player, range);
    let usable: Vec<MonsterSpell> = race
        .spells
        .iter()
        .copied()
        .filter(|s| clean || !matches!(s, MonsterSpell::Bolt(_)))
        .collect();
    let Some(spell) = state.rng.choose(&usable).copied() else {
        return false;
    };

    let name = capitalize(&state.monster_name(id));
    let killer = format!("a {}", race.name);
    tracing::trace!(id = id.0, ?spell, "monster casts at player");
    match spell {
        MonsterSpell::Blink => {
            state.message(format!("{name} blinks away."));
            teleport_monster(state, id, 10);
        }
        MonsterSpell::Bolt(dice) => {
            state.message(format!("{name} casts a bolt."));
            let dam = dice.roll(&mut state.rng);
            state.bad_status().take_hit(dam, &killer);
        }
        MonsterSpell::Ball(dice) => {
            state.message(format!("{name} casts a ball."));
            let dam = dice.roll(&mut state.rng);
            state.bad_status().take_hit(dam, &killer);
        }
        MonsterSpell::Heal => heal_self(state, id, race.level),
        MonsterSpell::Shriek => {
            state.message(format!("{name} makes a high pitched shriek."));
            state.sound(SoundCue::Shriek);
            aggravate_monsters(state, Some(id));
        }
        MonsterSpell::Confuse => {
            state.message(format!("{name} creates a mesmerising illusion."));
            if state.player.resists(PlayerResists::CONF) {
                state.message("You disbelieve the feeble spell.");
            } else {
                let dur = state.rng.rn2(4) + 4;
                state.bad_status().mod_confusion(dur);
            }
        }
        MonsterSpell::Slow => {
            state.message(format!("{name} drains power from your muscles."));
            if state.player.has_free_action() {
                state.message("You are unaffected!");
            } else {
                let dur = state.rng.rn2(4) + 4;
                state.bad_status().mod_deceleration(dur);
            }
        }
        MonsterSpell::Summon(kind) => {
            state.message(format!("{name} magically summons help!"));
            let rlev = race.level.max(1);
            summon_specific(state, Some(id), player, rlev, kind, SpawnMode::empty());
        }
    }
    true
}

fn heal_self(state: &mut GameState, id: MonsterId, level: i32) {
    let name = capitalize(&state.monster_name(id));
    let Some(m) = state.floor.monster_mut(id) else {
        return;
    };
    m.hp = (m.hp + level * 6).min(m.maxhp);
    m.timers.fear = 0;
    let seen = m.ml;
    if seen {
        state.message(format!("{name} looks healthier."));
    }
}

/// Cast a spell at the nearest enemy monster in range.
///
/// Returns true if a spell was cast.
pub fn monst_spell_monst(state: &mut GameState, id: MonsterId) -> bool {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let range = state.options.max_range;
    let Some(m) = state.floor.monster(id) else {
        return false;
    };
    let Some(race) = registry.race(m.race) else {
        return false;
    };
    let spells: Vec<MonsterSpell> = race.spells.iter().copied().filter(|s| s.targets_monsters()).collect();
    if spells.is_empty() {
        return false;
    }

    let target = state
        .floor
        .monsters()
        .filter(|t| {
            registry
                .race(t.race)
                .is_some_and(|t_race| are_enemies(m, race, t, t_race))
        })
        .filter(|t| {
            distance(m.pos, t.pos) <= range && projectable(&state.floor, terrain, m.pos, t.pos, range)
        })
        .min_by_key(|t| (distance(m.pos, t.pos), t.id))
        .map(|t| t.id);
    let Some(target) = target else {
        return false;
    };
    let Some(spell) = state.rng.choose(&spells).copied() else {
        return false;
    };

    let seen = state.floor.monster(id).is_some_and(|m| m.ml)
        || state.floor.monster(target).is_some_and(|t| t.ml);
    if seen {
        let msg = format!(
            "{} casts a spell at {}.",
            capitalize(&state.monster_name(id)),
            state.monster_name(target)
        );
        state.message(msg);
    }
    tracing::trace!(id = id.0, target = target.0, ?spell, "monster casts at monster");

    let target_resists_conf = state
        .floor
        .monster(target)
        .and_then(|t| registry.race(t.race))
        .is_some_and(|r| r.resist.contains(ResistFlags::CONF));
    match spell {
        MonsterSpell::Bolt(dice) | MonsterSpell::Ball(dice) => {
            let dam = dice.roll(&mut state.rng);
            damage_monster(state, target, dam);
        }
        MonsterSpell::Confuse if !target_resists_conf => {
            let dur = state.rng.rn2(4) + 4;
            if let Some(t) = state.floor.monster_mut(target) {
                t.timers.confusion += dur;
            }
        }
        MonsterSpell::Slow => {
            if let Some(t) = state.floor.monster_mut(target) {
                t.timers.slow += 10;
            }
        }
        _ => {}
    }
    // The victim remembers who shot at it
    let caster_pos = state.floor.monster(id).map(|m| m.pos);
    if let (Some(pos), Some(t)) = (caster_pos, state.floor.monster_mut(target)) {
        if t.target.is_none() {
            t.set_target(pos);
        }
    }
    true
}
