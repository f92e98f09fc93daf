//! Monster turn scheduler
//!
//! Every tick each monster loses energy in proportion to its speed; when
//! the balance runs out it is topped up and the monster takes a turn.
//! Monsters are visited in descending slot order from a snapshot taken
//! before anyone acts, so anything born during the sweep waits for the
//! next tick.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::monst::{MonsterFlags2, MonsterId};
use super::processor::process_monster;
use crate::consts::speed_to_energy;
use crate::dungeon::CellInfo;
use crate::gameloop::GameState;

/// Why a sweep ended before visiting every monster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SweepStop {
    PlayerDead,
    Leaving,
    NotPlaying,
}

/// Result of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Monsters that took a turn, in the order they acted
    pub dispatched: Vec<MonsterId>,
    pub stop: Option<SweepStop>,
}

impl SweepReport {
    pub fn was_aborted(&self) -> bool {
        self.stop.is_some()
    }
}

fn stop_reason(state: &GameState) -> Option<SweepStop> {
    if state.player.is_dead {
        Some(SweepStop::PlayerDead)
    } else if state.player.leaving {
        Some(SweepStop::Leaving)
    } else if !state.playing {
        Some(SweepStop::NotPlaying)
    } else {
        None
    }
}

/// Whether a monster is close enough to the player to be worth processing.
///
/// Clears NOFLOW once the player has moved since flow was last blocked.
pub fn decide_process_continue(state: &mut GameState, id: MonsterId) -> bool {
    let no_flowed = state.player.no_flowed;
    let max_sight = state.options.max_sight;
    let aggravate = state.player.has_aggravation();
    let phase_out = state.world.is_phase_out();
    let Some(aaf) = state.race_of(id).map(|r| r.aaf) else {
        return false;
    };
    let Some(m) = state.floor.monster_mut(id) else {
        return false;
    };
    if !no_flowed {
        m.flags2.remove(MonsterFlags2::NOFLOW);
    }

    let sense = if m.is_pet() { aaf.min(max_sight) } else { aaf };
    if m.cdis <= sense {
        return true;
    }

    let (cdis, pos, has_target) = (m.cdis, m.pos, m.target.is_some());
    let in_view = state
        .floor
        .cell(pos)
        .is_some_and(|c| c.info.contains(CellInfo::VIEW));
    if (cdis <= max_sight || phase_out) && (in_view || aggravate) {
        return true;
    }
    has_target
}

/// Run one scheduler sweep over every monster on the floor
pub fn process_monsters(state: &mut GameState) -> SweepReport {
    let mut report = SweepReport::default();
    state.floor.monster_noise = false;

    let snapshot = state.floor.valid_ids_descending();
    tracing::trace!(monsters = snapshot.len(), turn = state.world.game_turn, "sweep start");

    for id in snapshot {
        if state.player.leaving {
            report.stop = Some(SweepStop::Leaving);
            break;
        }
        if !state.floor.is_valid(id) || state.world.is_wild_mode() {
            continue;
        }
        let Some(cdis) = state.floor.monster(id).map(|m| m.cdis) else {
            continue;
        };
        if cdis >= state.options.max_monster_sensing || !decide_process_continue(state, id) {
            continue;
        }

        let speed = if state.player.riding == Some(id) {
            state.player.speed
        } else {
            state.floor.monster(id).map_or(0, |m| m.temporary_speed())
        };
        let refill = state.options.energy_need;
        let Some(m) = state.floor.monster_mut(id) else {
            continue;
        };
        m.energy_need -= speed_to_energy(speed);
        if m.energy_need > 0 {
            continue;
        }
        m.energy_need += refill;

        tracing::trace!(id = id.0, "dispatch");
        report.dispatched.push(id);
        process_monster(state, id);

        if let Some(m) = state.floor.monster_mut(id) {
            m.reset_target();
            if state.player.no_flowed && state.rng.one_in(3) {
                m.flags2.insert(MonsterFlags2::NOFLOW);
            }
        }

        if state.is_sweep_over() {
            report.stop = stop_reason(state);
            break;
        }
    }

    if let Some(stop) = report.stop {
        tracing::debug!(%stop, dispatched = report.dispatched.len(), "sweep aborted");
    }
    report
}
