//! Monster turns across several ticks

mod common;

use common::{has_message, refresh, room_state, spawn};
use umbra_core::dungeon::Pos;
use umbra_core::monster::{compact_monsters, delete_monster, process_monster};
use umbra_core::{GameLoop, GameLoopResult};

#[test]
fn test_lice_stop_breeding_at_the_floor_cap() {
    let mut state = room_state(30, 14, 21);
    state.options.max_reproduction = 5;
    state.player.hp = 10_000;
    state.player.mhp = 10_000;
    spawn(&mut state, "WHITE_LOUSE", Pos::new(2, 2));
    spawn(&mut state, "WHITE_LOUSE", Pos::new(11, 27));

    let mut game = GameLoop::new(state);
    for _ in 0..400 {
        assert_eq!(game.tick().result, GameLoopResult::Continue);
    }
    let state = game.state();
    assert_eq!(state.floor.num_repro, 5);
    assert_eq!(state.floor.monster_count(), 7);
}

#[test]
fn test_orphan_vanishes_after_compaction() {
    let mut state = room_state(20, 12, 4);
    let master = spawn(&mut state, "MOLD_MASTER", Pos::new(2, 2));
    let child = spawn(&mut state, "GREY_MOLD", Pos::new(2, 4));
    state.floor.monster_mut(child).unwrap().parent = Some(master);

    delete_monster(&mut state, master);
    compact_monsters(&mut state);

    // The survivor moved down to the first slot and now points at itself
    let ids = state.floor.valid_ids_descending();
    assert_eq!(ids.len(), 1);
    let child = ids[0];
    assert_eq!(state.floor.monster(child).unwrap().parent, Some(child));

    state.floor.monster_mut(child).unwrap().ml = true;
    process_monster(&mut state, child);
    assert!(has_message(&state, "The grey mold disappears!"));
    assert_eq!(state.floor.monster_count(), 0);
}

#[test]
fn test_living_child_stays_with_its_summoner() {
    let mut state = room_state(20, 12, 4);
    let master = spawn(&mut state, "MOLD_MASTER", Pos::new(2, 2));
    let child = spawn(&mut state, "GREY_MOLD", Pos::new(2, 4));
    state.floor.monster_mut(child).unwrap().parent = Some(master);

    refresh(&mut state);
    process_monster(&mut state, child);
    assert!(state.floor.is_valid(child));
}

#[test]
fn test_pets_never_bite_the_player() {
    let mut state = room_state(12, 8, 6);
    let origin = state.player.pos;
    let crow = spawn(&mut state, "CROW", origin + Pos::new(0, 1));
    state.floor.monster_mut(crow).unwrap().set_pet();

    let mut game = GameLoop::new(state);
    for _ in 0..40 {
        game.tick();
    }
    let state = game.state();
    assert_eq!(state.player.hp, state.player.mhp);
}
