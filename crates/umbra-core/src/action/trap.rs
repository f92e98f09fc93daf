//! Trap mechanics
//!
//! [`hit_trap`] resolves a trap the player stepped on. Darts roll
//! [`check_hit`] against the player's armour; gases check resistances.

use std::sync::Arc;

use super::effects::{ProjectEffect, activate_ty_curse, aggravate_monsters, project, teleport_player};
use crate::action::ActionResult;
use crate::dungeon::{Pos, TerrainAction, TrapType, disclose_grid, projectable};
use crate::gameloop::{FloorChange, GameState, SoundCue};
use crate::monster::{SpawnMode, SummonKind, summon_specific};
use crate::player::{PlayerResists, Stat};
use crate::rng::GameRng;

/// Attack power of trap darts
const DART_POWER: i32 = 125;

/// Summons per armageddon wave by `level / 10`
const ARMAGEDDON_WAVES: [i32; 10] = [0, 0, 20, 10, 5, 3, 2, 1, 1, 1];

/// Hit check for a trap or monster attack against the player.
///
/// One roll in ten is decided outright, half hits and half misses. A lazy
/// player is hit one time in twenty regardless. Otherwise the attack must
/// beat three quarters of the armour.
pub fn check_hit(rng: &mut GameRng, power: i32, armour: i32, lazy: bool) -> bool {
    if power <= 0 {
        return false;
    }
    let k = rng.rn2(100);
    if k < 10 {
        return k < 5;
    }
    if lazy && rng.one_in(20) {
        return true;
    }
    rng.rnd(power) > armour * 3 / 4
}

fn dart_hits(state: &mut GameState) -> bool {
    let armour = state.player.total_armour();
    let lazy = state.player.is_lazy();
    if check_hit(&mut state.rng, DART_POWER, armour, lazy) {
        state.message("A small dart hits you!");
        true
    } else {
        state.message("A small dart barely misses you.");
        false
    }
}

fn stat_dart(state: &mut GameState, stat: Stat) {
    if dart_hits(state) {
        let dam = state.rng.dice(1, 4);
        let mut setter = state.bad_status();
        setter.take_hit(dam, "a dart trap");
        if !setter.dec_stat(stat, 1, false) {
            tracing::trace!(%stat, "stat already at minimum");
        }
    }
}

fn fall_through_trap_door(state: &mut GameState) {
    if state.player.is_levitating() {
        state.message("You fly over a trap door.");
        return;
    }
    state.message("You have fallen through a trap door!");
    state.sound(SoundCue::Fall);
    let dam = state.rng.dice(2, 8);
    state.bad_status().take_hit(dam, "a trap door");
    if state.player.is_dead || state.floor.is_in_quest() {
        return;
    }

    if state.options.autosave_on_trapdoor {
        state.autosave_requested = true;
    }
    state.diary_entry("You have fallen through a trap door.");
    state.floor_change = Some(FloorChange::Down);
    state.player.leaving = true;
    tracing::debug!(dun_level = state.floor.dun_level, "fell through trap door");
}

fn fall_into_pit(state: &mut GameState, trap: TrapType) {
    if state.player.is_levitating() {
        state.message("You fly over a pit.");
        return;
    }
    let mut dam = state.rng.dice(2, 6);
    if trap == TrapType::Pit {
        state.message("You fall into a pit!");
        state.bad_status().take_hit(dam, "a pit");
        return;
    }

    state.message("You fall into a spiked pit!");
    if state.rng.one_in(2) {
        state.bad_status().take_hit(dam, "a pit");
        return;
    }
    dam *= 2;
    if trap == TrapType::SpikedPit {
        state.message("You are impaled!");
        let mut setter = state.bad_status();
        setter.mod_cut(dam);
        setter.take_hit(dam, "a spiked pit");
        return;
    }

    state.message("You are impaled on poisonous spikes!");
    state.bad_status().mod_cut(dam);
    if state.player.resists(PlayerResists::POIS) {
        state.message("The poison does not affect you!");
        state.bad_status().take_hit(dam, "a spiked pit");
    } else {
        dam *= 2;
        let mut setter = state.bad_status();
        setter.mod_poison(dam);
        setter.take_hit(dam, "a spiked pit");
    }
}

fn trigger_ty_curse(state: &mut GameState, pos: Pos) {
    state.message("There is a flash of shimmering light!");
    let level = state.floor.dun_level;
    let num = 2 + state.rng.rnd(3);
    for _ in 0..num {
        summon_specific(state, None, pos, level, SummonKind::Any, SpawnMode::empty());
    }
    if level > state.rng.rnd(100) {
        activate_ty_curse(state);
    }
}

/// Good and evil immortals appear in pairs and go for each other
fn trigger_armageddon(state: &mut GameState, pos: Pos) {
    state.message("Suddenly, you are surrounded by immortal beings!");
    let range = state.options.max_range;
    let registry = Arc::clone(&state.registry);

    let mut lev = state.floor.dun_level;
    while lev >= 20 {
        let num = ARMAGEDDON_WAVES[(lev / 10).min(9) as usize];
        for _ in 0..num {
            let y = state.rng.rand_spread(pos.y, 5);
            let x = state.rng.rand_spread(pos.x, 7);
            let at = Pos::new(y, x);
            if !state.floor.in_bounds(at) || !projectable(&state.floor, &registry.terrain, pos, at, range) {
                continue;
            }
            let evil = summon_specific(state, None, at, lev, SummonKind::ArmageddonEvil, SpawnMode::empty());
            let good = summon_specific(state, None, at, lev, SummonKind::ArmageddonGood, SpawnMode::empty());
            let (Some(evil), Some(good)) = (evil, good) else {
                continue;
            };
            let evil_pos = state.floor.monster(evil).map(|m| m.pos);
            let good_pos = state.floor.monster(good).map(|m| m.pos);
            if let (Some(evil_pos), Some(good_pos)) = (evil_pos, good_pos) {
                if let Some(m) = state.floor.monster_mut(evil) {
                    m.set_target(good_pos);
                }
                if let Some(m) = state.floor.monster_mut(good) {
                    m.set_target(evil_pos);
                }
            }
        }
        lev -= 1 + lev / 16;
    }
}

fn trigger_piranha(state: &mut GameState, pos: Pos) {
    state.message("Suddenly, the room is filled with water with piranhas!");
    project(state, pos, 10, ProjectEffect::WaterFlow);
    let num = 1 + state.floor.dun_level / 20;
    let level = state.floor.dun_level;
    for _ in 0..num {
        summon_specific(state, None, pos, level, SummonKind::Piranha, SpawnMode::empty());
    }
}

/// The player triggers the trap at `pos`.
///
/// With `break_trap` the trap is destroyed afterwards. Returns
/// [`ActionResult::NoTime`] if there is no trap there.
pub fn hit_trap(state: &mut GameState, pos: Pos, break_trap: bool) -> ActionResult {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let dungeon = registry.dungeon(state.floor.dungeon);
    let Some(trap_id) = state.floor.terrain_at(pos) else {
        return ActionResult::NoTime;
    };
    if !state.floor.is_trap(terrain, pos) {
        return ActionResult::NoTime;
    }

    disclose_grid(terrain, &mut state.floor, dungeon, pos, &mut state.rng);
    state
        .floor
        .alter_terrain(terrain, dungeon, pos, TerrainAction::HitTrap, &mut state.rng);

    let Some(trap) = TrapType::of_terrain(terrain, trap_id) else {
        tracing::warn!(terrain = trap_id.0, "trap without a known subtype");
        return ActionResult::Success;
    };
    tracing::debug!(%trap, ?pos, "hit trap");

    match trap {
        TrapType::TrapDoor => fall_through_trap_door(state),
        TrapType::Pit | TrapType::SpikedPit | TrapType::PoisonPit => fall_into_pit(state, trap),
        TrapType::TyCurse => trigger_ty_curse(state, pos),
        TrapType::Teleport => {
            state.message("You hit a teleport trap!");
            teleport_player(state, 100);
        }
        TrapType::Fire => {
            state.message("You are enveloped in flames!");
            let dam = state.rng.dice(4, 6);
            state.bad_status().take_hit(dam, "a fire trap");
        }
        TrapType::Acid => {
            state.message("You are splashed with acid!");
            let dam = state.rng.dice(4, 6);
            state.bad_status().take_hit(dam, "an acid trap");
        }
        TrapType::Slow => {
            if dart_hits(state) {
                let dam = state.rng.dice(1, 4);
                let dur = state.rng.rn2(20) + 20;
                let mut setter = state.bad_status();
                setter.take_hit(dam, "a dart trap");
                setter.mod_deceleration(dur);
            }
        }
        TrapType::LoseStr => stat_dart(state, Stat::Strength),
        TrapType::LoseDex => stat_dart(state, Stat::Dexterity),
        TrapType::LoseCon => stat_dart(state, Stat::Constitution),
        TrapType::Blind => {
            state.message("A black gas surrounds you!");
            if !state.player.resists(PlayerResists::BLIND) {
                let dur = state.rng.rn2(50) + 25;
                state.bad_status().mod_blindness(dur);
            }
        }
        TrapType::Confuse => {
            state.message("A gas of scintillating colors surrounds you!");
            if !state.player.resists(PlayerResists::CONF) {
                let dur = state.rng.rn2(20) + 10;
                state.bad_status().mod_confusion(dur);
            }
        }
        TrapType::Poison => {
            state.message("A pungent green gas surrounds you!");
            if !state.player.resists(PlayerResists::POIS) {
                let dur = state.rng.rn2(20) + 10;
                state.bad_status().mod_poison(dur);
            }
        }
        TrapType::Sleep => {
            state.message("A strange white mist surrounds you!");
            if !state.player.has_free_action() {
                state.message("You fall asleep.");
                let dur = state.rng.rn2(10) + 5;
                state.bad_status().mod_paralysis(dur);
            }
        }
        TrapType::Traps => {
            state.message("There is a bright flash of light!");
            project(state, pos, 1, ProjectEffect::MakeTrap);
        }
        TrapType::Alarm => {
            state.message("An alarm sounds!");
            aggravate_monsters(state, None);
        }
        TrapType::Open => {
            state.message("Suddenly, surrounding walls are opened!");
            project(state, pos, 3, ProjectEffect::Disintegrate);
            project(state, Pos::new(pos.y, pos.x - 4), 3, ProjectEffect::Disintegrate);
            project(state, Pos::new(pos.y, pos.x + 4), 3, ProjectEffect::Disintegrate);
            aggravate_monsters(state, None);
        }
        TrapType::Armageddon => trigger_armageddon(state, pos),
        TrapType::Piranha => trigger_piranha(state, pos),
    }

    if break_trap && state.floor.is_trap(terrain, pos) {
        state
            .floor
            .alter_terrain(terrain, dungeon, pos, TerrainAction::Disarm, &mut state.rng);
        state.message("You destroyed the trap.");
    }

    match (&state.player.is_dead, &state.player.died_from) {
        (true, Some(killer)) => ActionResult::Died(killer.clone()),
        (true, None) => ActionResult::Died("a trap".to_string()),
        _ => ActionResult::Success,
    }
}
