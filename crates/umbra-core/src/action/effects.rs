//! Area effects shared by traps, chests and monster spells
//!
//! Ball projections that reshape terrain, player teleportation, waking the
//! floor and the curse chain.

use std::sync::Arc;

use strum::{Display, IntoEnumIterator};

use crate::dungeon::{Pos, TerrainAction, TerrainFlags, distance, place_trap, projectable};
use crate::gameloop::{GameState, SoundCue, UpdateFlags};
use crate::monster::{MonsterId, SpawnMode, SummonKind, summon_specific};
use crate::player::Stat;

/// What a ball projection does to the cells it reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProjectEffect {
    /// Hide new traps on clean floor
    MakeTrap,
    /// Dissolve walls and traps
    Disintegrate,
    /// Flood open ground with deep water
    WaterFlow,
}

/// Cells a ball of `radius` centred on `center` reaches
fn ball_area(state: &GameState, center: Pos, radius: i32) -> Vec<Pos> {
    let terrain = &state.registry.terrain;
    let mut cells = Vec::new();
    for y in center.y - radius..=center.y + radius {
        for x in center.x - radius..=center.x + radius {
            let p = Pos::new(y, x);
            if state.floor.in_bounds(p)
                && distance(center, p) <= radius
                && projectable(&state.floor, terrain, center, p, radius)
            {
                cells.push(p);
            }
        }
    }
    cells
}

/// Apply a terrain effect in a ball. Returns the number of cells changed.
pub fn project(state: &mut GameState, center: Pos, radius: i32, effect: ProjectEffect) -> usize {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let dungeon = registry.dungeon(state.floor.dungeon);
    let deep = terrain.by_tag("DEEP_WATER");

    let mut changed = 0;
    for p in ball_area(state, center, radius) {
        let done = match effect {
            ProjectEffect::MakeTrap => {
                p != center
                    && p != state.player.pos
                    && !state.floor.has_monster(p)
                    && place_trap(&registry.traps, terrain, &mut state.floor, dungeon, p, &mut state.rng)
            }
            ProjectEffect::Disintegrate => {
                state
                    .floor
                    .alter_terrain(terrain, dungeon, p, TerrainAction::HurtDisi, &mut state.rng)
            }
            ProjectEffect::WaterFlow => match deep {
                Some(deep)
                    if state.floor.has_flag(terrain, p, TerrainFlags::MOVE)
                        && !state.floor.has_flag(terrain, p, TerrainFlags::PERMANENT)
                        && state.floor.terrain_at(p) != Some(deep) =>
                {
                    // Floods write the terrain directly; no conversion rule applies
                    state.floor.set_terrain(p, deep);
                    if let Some(cell) = state.floor.cell_mut(p) {
                        cell.note_and_redraw();
                    }
                    true
                }
                _ => false,
            },
        };
        if done {
            changed += 1;
        }
    }

    if changed > 0 {
        state.request(UpdateFlags::VIEW | UpdateFlags::MONSTER_LITE);
    }
    tracing::debug!(%effect, ?center, radius, changed, "projection");
    changed
}

/// A cell the player can be put on
fn teleportable(state: &GameState, p: Pos) -> bool {
    state.floor.in_bounds(p)
        && p != state.player.pos
        && !state.floor.has_monster(p)
        && state
            .floor
            .has_flag(&state.registry.terrain, p, TerrainFlags::MOVE)
        && !state
            .floor
            .has_flag(&state.registry.terrain, p, TerrainFlags::DEEP)
}

/// Move the player (and mount) to `to`
fn relocate_player(state: &mut GameState, to: Pos) {
    if let Some(mount) = state.player.riding {
        state.floor.move_monster(mount, to);
    }
    state.player.pos = to;
    state.sound(SoundCue::Teleport);
    state.request(UpdateFlags::VIEW | UpdateFlags::MONSTER_LITE);
}

/// Teleport the player up to `dis` cells away.
///
/// Landing spots are drawn from the farther half of the reachable
/// candidates. Returns false if there was nowhere to go.
pub fn teleport_player(state: &mut GameState, dis: i32) -> bool {
    let origin = state.player.pos;
    let mut by_distance: Vec<(i32, Pos)> = state
        .floor
        .positions()
        .filter(|p| distance(origin, *p) <= dis && teleportable(state, *p))
        .map(|p| (distance(origin, p), p))
        .collect();
    if by_distance.is_empty() {
        return false;
    }

    by_distance.sort_by_key(|(d, _)| std::cmp::Reverse(*d));
    let half = by_distance.len().div_ceil(2);
    let min = by_distance[half - 1].0;
    let far: Vec<Pos> = by_distance
        .iter()
        .filter(|(d, _)| *d >= min)
        .map(|(_, p)| *p)
        .collect();
    let Some(to) = state.rng.choose(&far).copied() else {
        return false;
    };
    relocate_player(state, to);
    tracing::debug!(?origin, ?to, "player teleported");
    true
}

/// Pull the player to the nearest free cell beside `target`
pub fn teleport_player_to(state: &mut GameState, target: Pos) -> bool {
    for d in 1..=state.options.max_sight {
        let ring: Vec<Pos> = state
            .floor
            .positions()
            .filter(|p| distance(target, *p) == d && teleportable(state, *p))
            .collect();
        if let Some(to) = state.rng.choose(&ring).copied() {
            relocate_player(state, to);
            return true;
        }
    }
    false
}

/// Wake up and hasten nearby monsters.
///
/// `who` is the shrieker, which is left alone.
pub fn aggravate_monsters(state: &mut GameState, who: Option<MonsterId>) {
    let registry = Arc::clone(&state.registry);
    let reach = state.options.max_sight * 2;
    let range = state.options.max_range;
    let player = state.player.pos;

    let mut woke = false;
    let mut hastened = false;
    let ids: Vec<MonsterId> = state.floor.monsters().map(|m| m.id).collect();
    for id in ids {
        if Some(id) == who {
            continue;
        }
        let Some(m) = state.floor.monster(id) else {
            continue;
        };
        let (pos, cdis, is_pet) = (m.pos, m.cdis, m.is_pet());
        let in_view = projectable(&state.floor, &registry.terrain, player, pos, range);
        let Some(m) = state.floor.monster_mut(id) else {
            continue;
        };
        if cdis < reach && m.is_asleep() {
            m.timers.sleep = 0;
            woke = true;
        }
        if in_view && !is_pet {
            m.timers.fast += 100;
            hastened = true;
        }
    }

    if hastened {
        state.message("You feel a sudden stirring nearby!");
    } else if woke {
        state.message("You hear a sudden stirring in the distance!");
    }
    if state.player.is_riding() {
        state.request(UpdateFlags::BONUS);
    }
    tracing::debug!(woke, hastened, "aggravated monsters");
}

/// Shake the ground: nearby non-permanent cells may collapse to rubble
pub fn earthquake(state: &mut GameState, center: Pos, radius: i32) -> usize {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let Some(rubble) = terrain.by_tag("RUBBLE") else {
        return 0;
    };

    state.message("The ground shakes violently!");
    let mut collapsed = 0;
    for y in center.y - radius..=center.y + radius {
        for x in center.x - radius..=center.x + radius {
            let p = Pos::new(y, x);
            if p == center
                || p == state.player.pos
                || !state.floor.in_bounds(p)
                || distance(center, p) > radius
                || state.floor.has_monster(p)
                || state.floor.has_flag(terrain, p, TerrainFlags::PERMANENT)
            {
                continue;
            }
            if state.rng.rn2(100) < 85 {
                continue;
            }
            // Direct write like the flood: collapse is not a terrain action
            state.floor.set_terrain(p, rubble);
            if let Some(cell) = state.floor.cell_mut(p) {
                cell.note_and_redraw();
            }
            collapsed += 1;
        }
    }
    state.request(UpdateFlags::VIEW | UpdateFlags::MONSTER_LITE);
    collapsed
}

/// One link of the curse chain
fn curse_link(state: &mut GameState) {
    let player = state.player.pos;
    match state.rng.rn2(6) {
        0 => {
            earthquake(state, player, 5);
        }
        1 => {
            state.message("You feel the presence of the restless dead.");
            let level = state.floor.dun_level;
            summon_specific(state, None, player, level, SummonKind::Undead, SpawnMode::empty());
        }
        2 => aggravate_monsters(state, None),
        3 => {
            let stats: Vec<Stat> = Stat::iter().collect();
            if let Some(stat) = state.rng.choose(&stats).copied() {
                state.bad_status().dec_stat(stat, 1, false);
            }
        }
        4 => {
            if state.player.has_free_action() {
                state.message("You resist the curse's hold.");
            } else {
                state.message("You feel like a statue!");
                let dur = state.rng.rnd(13);
                state.bad_status().mod_paralysis(dur);
            }
        }
        _ => {
            state.message("A portal opens to a plane of raw mana!");
            let dam = state.rng.dice(10, 10);
            state.bad_status().take_hit(dam, "released pure mana");
        }
    }
}

/// Run the curse chain: at least one link, then another one time in six
pub fn activate_ty_curse(state: &mut GameState) {
    let mut links = 0;
    loop {
        curse_link(state);
        links += 1;
        if state.player.is_dead || !state.rng.one_in(6) {
            break;
        }
    }
    tracing::debug!(links, "curse chain");
}
