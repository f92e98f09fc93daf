//! Monster melee against the player and against other monsters

use std::sync::Arc;

use super::lifecycle::damage_monster;
use super::monst::MonsterId;
use super::race::{BlowEffect, ResistFlags};
use crate::action::check_hit;
use crate::gameloop::{GameState, SoundCue, capitalize};
use crate::player::{PlayerResists, Stat};

/// Attack power of a monster's blows
pub fn blow_power(level: i32) -> i32 {
    60 + 3 * level
}

/// Strike the player with every blow. Returns true if the monster attacked.
pub fn make_attack_normal(state: &mut GameState, id: MonsterId) -> bool {
    let registry = Arc::clone(&state.registry);
    let Some(race) = state.floor.monster(id).and_then(|m| registry.race(m.race)) else {
        return false;
    };
    if race.blows.is_empty() {
        return false;
    }

    let name = state.monster_name(id);
    let killer = format!("a {}", race.name);
    let power = blow_power(race.level);
    for blow in &race.blows {
        if state.player.is_dead || state.player.leaving {
            break;
        }
        let armour = state.player.total_armour();
        let lazy = state.player.is_lazy();
        if !check_hit(&mut state.rng, power, armour, lazy) {
            state.message(format!("{} misses you.", capitalize(&name)));
            state.sound(SoundCue::Miss);
            continue;
        }

        state.message(format!("{} hits you.", capitalize(&name)));
        state.sound(SoundCue::Hit);
        let dam = blow.dice.roll(&mut state.rng);
        let extra = state.rng.rnd(race.level.max(1)) + 3;
        let free_act = state.player.has_free_action();
        let resist_pois = state.player.resists(PlayerResists::POIS);
        let resist_conf = state.player.resists(PlayerResists::CONF);

        let mut setter = state.bad_status();
        let dealt = setter.take_hit(dam, &killer);
        match blow.effect {
            BlowEffect::Hurt => {}
            BlowEffect::Poison if !resist_pois => {
                setter.mod_poison(extra);
            }
            BlowEffect::Confuse if !resist_conf => {
                setter.mod_confusion(extra);
            }
            BlowEffect::Paralyze if !free_act => {
                setter.mod_paralysis(extra);
            }
            BlowEffect::LoseStr => {
                setter.dec_stat(Stat::Strength, 1, false);
            }
            _ => {}
        }
        if let Some(m) = state.floor.monster_mut(id) {
            m.dealt_damage += dealt;
        }
    }
    true
}

/// Strike another monster. Returns true if the monster attacked.
pub fn monst_attack_monst(state: &mut GameState, id: MonsterId, target: MonsterId) -> bool {
    let registry = Arc::clone(&state.registry);
    let Some(race) = state.floor.monster(id).and_then(|m| registry.race(m.race)) else {
        return false;
    };
    let Some(target_race) = state.floor.monster(target).and_then(|m| registry.race(m.race)) else {
        return false;
    };
    if race.blows.is_empty() {
        return false;
    }

    let seen = |state: &GameState| {
        state.floor.monster(id).is_some_and(|m| m.ml) || state.floor.monster(target).is_some_and(|m| m.ml)
    };
    let power = blow_power(race.level);
    for blow in &race.blows {
        if !state.floor.is_valid(target) {
            break;
        }
        let (attacker, victim) = (capitalize(&state.monster_name(id)), state.monster_name(target));
        if !check_hit(&mut state.rng, power, target_race.armour, false) {
            if seen(state) {
                state.message(format!("{attacker} misses {victim}."));
            }
            continue;
        }

        if seen(state) {
            state.message(format!("{attacker} hits {victim}."));
        }
        let dam = blow.dice.roll(&mut state.rng);
        if blow.effect == BlowEffect::Confuse && !target_race.resist.contains(ResistFlags::CONF) {
            if let Some(t) = state.floor.monster_mut(target) {
                t.timers.confusion += 3;
            }
        }
        damage_monster(state, target, dam);
    }
    true
}
