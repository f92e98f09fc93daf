//! Opening a trapped chest

use super::effects::{activate_ty_curse, aggravate_monsters};
use crate::dungeon::{ChestTrapFlags, Pos, chest_traps};
use crate::gameloop::{GameState, SoundCue};
use crate::monster::{SpawnMode, SummonKind, summon_specific};
use crate::player::{PlayerResists, Stat};

/// What springing a chest's traps did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChestTrapOutcome {
    /// Traps that went off
    pub triggered: ChestTrapFlags,
    /// The chest was blown apart along with its contents
    pub destroyed: bool,
    /// The contents were flung across the floor
    pub scattered: bool,
    /// Monsters that answered a summoning trap
    pub summoned: usize,
}

fn summon_wave(state: &mut GameState, pos: Pos, kind: SummonKind, count: i32) -> usize {
    let level = state.floor.dun_level;
    (0..count)
        .filter_map(|_| summon_specific(state, None, pos, level, kind, SpawnMode::empty()))
        .count()
}

fn needle(state: &mut GameState, stat: Stat) {
    state.message("A small needle has pricked you!");
    let dam = state.rng.dice(1, 4);
    let mut setter = state.bad_status();
    setter.take_hit(dam, "a poison needle");
    setter.dec_stat(stat, 1, false);
}

/// Spring the traps of a chest of quality `pval` opened at `pos`.
///
/// Traps fire in a fixed order. A disarmed chest (`pval <= 0`) or an
/// unknown quality does nothing.
pub fn chest_trap(state: &mut GameState, pos: Pos, pval: i32) -> ChestTrapOutcome {
    let traps = chest_traps(pval);
    let mut outcome = ChestTrapOutcome {
        triggered: traps,
        ..ChestTrapOutcome::default()
    };
    if traps.is_empty() {
        return outcome;
    }
    tracing::debug!(pval, ?traps, "chest trap");

    if traps.contains(ChestTrapFlags::LOSE_STR) {
        needle(state, Stat::Strength);
    }
    if traps.contains(ChestTrapFlags::LOSE_CON) {
        needle(state, Stat::Constitution);
    }
    if traps.contains(ChestTrapFlags::POISON) {
        state.message("A puff of green gas surrounds you!");
        if !state.player.resists(PlayerResists::POIS) {
            let dur = 10 + state.rng.rnd(20);
            state.bad_status().mod_poison(dur);
        }
    }
    if traps.contains(ChestTrapFlags::PARALYZE) {
        state.message("A puff of yellow gas surrounds you!");
        if !state.player.has_free_action() {
            let dur = 10 + state.rng.rnd(20);
            state.bad_status().mod_paralysis(dur);
        }
    }
    if traps.contains(ChestTrapFlags::SUMMON) {
        state.message("You are enveloped in a cloud of smoke!");
        let num = 2 + state.rng.rnd(3);
        outcome.summoned += summon_wave(state, pos, SummonKind::Any, num);
    }
    if traps.contains(ChestTrapFlags::E_SUMMON) {
        state.message("Elemental beings appear to protect their treasures!");
        let num = 4 + state.rng.rnd(3);
        outcome.summoned += summon_wave(state, pos, SummonKind::Elemental, num);
    }
    if traps.contains(ChestTrapFlags::BIRD_STORM) {
        state.message("A storm of birds swirls around you!");
        let num = 3 + state.rng.rnd(3);
        outcome.summoned += summon_wave(state, pos, SummonKind::Bird, num);
    }
    if traps.contains(ChestTrapFlags::H_SUMMON) {
        state.message("Horrors from the abyss crawl out of the chest!");
        let num = 2 + state.rng.rnd(3);
        outcome.summoned += summon_wave(state, pos, SummonKind::Horror, num);
    }
    if traps.contains(ChestTrapFlags::RUNES_OF_EVIL) {
        state.message("Hideous voices bid: 'Let the darkness have thee!'");
        activate_ty_curse(state);
    }
    if traps.contains(ChestTrapFlags::ALARM) {
        state.message("An alarm sounds!");
        aggravate_monsters(state, None);
    }
    if traps.contains(ChestTrapFlags::EXPLODE) && !state.player.is_dead {
        state.message("There is a sudden explosion!");
        state.message("Everything inside the chest is destroyed!");
        state.sound(SoundCue::Explode);
        let dam = state.rng.dice(5, 8);
        state.bad_status().take_hit(dam, "an exploding chest");
        outcome.destroyed = true;
    }
    if traps.contains(ChestTrapFlags::SCATTER) && !outcome.destroyed {
        state.message("The contents of the chest scatter all over the dungeon!");
        outcome.scattered = true;
    }
    outcome
}
