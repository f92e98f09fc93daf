//! Energy scheduler driven through the game loop

mod common;

use common::{refresh, room_state, set_tag, spawn};
use umbra_core::action::{ActionResult, move_player};
use umbra_core::dungeon::Pos;
use umbra_core::monster::{MonsterId, SweepStop};
use umbra_core::{FloorChange, GameLoop, GameLoopResult, NORMAL_SPEED};

fn count(dispatched: &[MonsterId], id: MonsterId) -> usize {
    dispatched.iter().filter(|&&d| d == id).count()
}

// ============================================================================
// Speed and energy
// ============================================================================

#[test]
fn test_faster_monster_acts_twice_as_often() {
    let mut state = room_state(30, 10, 7);
    let slow = spawn(&mut state, "GREY_MOLD", Pos::new(2, 2));
    let fast = spawn(&mut state, "GREY_MOLD", Pos::new(2, 27));
    state.floor.monster_mut(fast).unwrap().mspeed = NORMAL_SPEED + 10;

    let mut game = GameLoop::new(state);
    let mut seen = Vec::new();
    for _ in 0..30 {
        let report = game.tick();
        assert_eq!(report.result, GameLoopResult::Continue);
        seen.extend(report.sweep.dispatched);
    }
    assert_eq!(count(&seen, slow), 3);
    assert_eq!(count(&seen, fast), 6);
}

#[test]
fn test_ridden_monster_runs_on_player_speed() {
    let mut state = room_state(12, 8, 1);
    let origin = state.player.pos;
    let horse = spawn(&mut state, "WILD_HORSE", origin);
    state.floor.monster_mut(horse).unwrap().mspeed = NORMAL_SPEED;
    state.floor.monster_mut(horse).unwrap().set_pet();
    state.player.riding = Some(horse);
    state.player.speed = NORMAL_SPEED + 20;

    let mut game = GameLoop::new(state);
    game.tick();
    assert_eq!(game.state().floor.monster(horse).unwrap().energy_need, 70);
}

#[test]
fn test_wild_mode_freezes_the_floor() {
    let mut state = room_state(12, 8, 1);
    let id = spawn(&mut state, "GREY_MOLD", Pos::new(2, 2));
    state.world.wild_mode = true;

    let mut game = GameLoop::new(state);
    for _ in 0..20 {
        assert!(game.tick().sweep.dispatched.is_empty());
    }
    assert_eq!(game.state().floor.monster(id).unwrap().energy_need, 100);
}

// ============================================================================
// Snapshot order
// ============================================================================

#[test]
fn test_sweep_only_dispatches_monsters_present_at_start() {
    let mut state = room_state(24, 12, 99);
    spawn(&mut state, "WHITE_LOUSE", Pos::new(2, 2));
    spawn(&mut state, "WHITE_LOUSE", Pos::new(9, 20));
    refresh(&mut state);

    let mut game = GameLoop::new(state);
    for _ in 0..80 {
        let before = game.state().floor.valid_ids_descending();
        let report = game.tick();
        for id in &report.sweep.dispatched {
            assert!(before.contains(id), "{id:?} was born during the sweep");
        }
        assert!(report.sweep.dispatched.windows(2).all(|w| w[0] > w[1]));
        if report.result != GameLoopResult::Continue {
            break;
        }
    }
}

// ============================================================================
// Aborting a sweep
// ============================================================================

#[test]
fn test_trap_door_ends_the_sweep() {
    let mut state = room_state(16, 9, 3);
    let origin = state.player.pos;
    spawn(&mut state, "KOBOLD", Pos::new(2, 2));
    set_tag(&mut state, origin + Pos::new(0, 1), "TRAP_TRAPDOOR");

    assert_eq!(move_player(&mut state, Pos::new(0, 1)), ActionResult::Success);
    assert!(state.player.leaving);
    assert!(state.autosave_requested);

    let mut game = GameLoop::new(state);
    let report = game.tick();
    assert_eq!(report.result, GameLoopResult::FloorChange(FloorChange::Down));
    assert_eq!(report.sweep.stop, Some(SweepStop::Leaving));
    assert!(report.sweep.dispatched.is_empty());
    assert!(game.state().floor.mon_lite.is_empty());
    assert!(!game.state().player.leaving);

    // The change is reported once; the next tick sweeps normally
    game.state_mut().player.hp = 1000;
    let report = game.tick();
    assert_eq!(report.result, GameLoopResult::Continue);
    assert_eq!(report.sweep.stop, None);
}

#[test]
fn test_stopped_game_does_not_advance() {
    let mut state = room_state(12, 8, 1);
    spawn(&mut state, "GREY_MOLD", Pos::new(2, 2));
    state.playing = false;

    let mut game = GameLoop::new(state);
    let report = game.tick();
    assert_eq!(report.result, GameLoopResult::Stopped);
    assert_eq!(game.state().world.game_turn, 0);
}
