//! Light and darkness cast by monsters
//!
//! Each pass rebuilds the set of cells lit (MNLT) or darkened (MNDK) by
//! monsters. Cells from the previous pass are marked TEMP (was lit) or XTRA
//! (was dark) first, so that only cells whose state changed are redrawn.

use std::sync::Arc;

use crate::dungeon::{CellInfo, DungeonFlags, Floor, Pos, TerrainFlags, TerrainRegistry};
use crate::gameloop::GameState;
use crate::monster::BrightnessFlags;
use crate::player::PlayerFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emission {
    Lite,
    Dark,
}

/// One emitter for the current pass
#[derive(Debug, Clone, Copy)]
struct LightSource {
    pos: Pos,
    radius: i32,
    emission: Emission,
    /// The emitter itself is out of the player's view
    invisible: bool,
}

/// Cells an emitter reaches, in visiting order.
///
/// The 3x3 block always; at radius 2 and 3 the rings beyond an orthogonal
/// neighbour only if that neighbour carries `gate`.
fn reached_cells(floor: &Floor, terrain: &TerrainRegistry, src: &LightSource, gate: TerrainFlags) -> Vec<Pos> {
    let c = src.pos;
    let at = |dy: i32, dx: i32| Pos::new(c.y + dy, c.x + dx);
    let open = |p: Pos| floor.has_flag(terrain, p, gate);

    let mut cells = vec![
        at(0, 0),
        at(1, 0),
        at(-1, 0),
        at(0, 1),
        at(0, -1),
        at(1, 1),
        at(1, -1),
        at(-1, 1),
        at(-1, -1),
    ];
    if src.radius < 2 {
        return cells;
    }

    // (direction, perpendicular)
    let arms = [
        (Pos::new(1, 0), Pos::new(0, 1)),
        (Pos::new(-1, 0), Pos::new(0, 1)),
        (Pos::new(0, 1), Pos::new(1, 0)),
        (Pos::new(0, -1), Pos::new(1, 0)),
    ];
    for (dir, side) in arms {
        if !open(at(dir.y, dir.x)) {
            continue;
        }
        for step in [2, 3] {
            let mid = at(dir.y * step, dir.x * step);
            if step == 3 && !(src.radius == 3 && open(at(dir.y * 2, dir.x * 2))) {
                break;
            }
            cells.push(mid + side);
            cells.push(mid);
            cells.push(mid - side);
        }
    }

    if src.radius == 3 {
        for (dy, dx) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
            if open(at(dy, dx)) {
                cells.push(at(dy * 2, dx * 2));
            }
        }
    }
    cells
}

/// Corner test: a wall cell between the emitter and the player is only
/// affected if the cell beside it, on the player's side of the sight line,
/// is open. `open` decides what counts as open.
///
/// Integer division truncates towards zero.
fn passes_corner_test(src: &LightSource, player: Pos, pos: Pos, open: impl Fn(Pos) -> bool) -> bool {
    let (y, x) = (pos.y, pos.x);
    let (my, mx) = (src.pos.y, src.pos.x);

    if (y < player.y && y > my) || (y > player.y && y < my) {
        let dpf = player.y - my;
        let d = y - my;
        let midpoint = mx + ((player.x - mx) * d.abs()) / dpf.abs();
        if x < midpoint {
            if !open(Pos::new(y, x + 1)) {
                return false;
            }
        } else if x > midpoint {
            if !open(Pos::new(y, x - 1)) {
                return false;
            }
        } else if src.invisible {
            return false;
        }
    }

    if (x < player.x && x > mx) || (x > player.x && x < mx) {
        let dpf = player.x - mx;
        let d = x - mx;
        let midpoint = my + ((player.y - my) * d.abs()) / dpf.abs();
        if y < midpoint {
            if !open(Pos::new(y + 1, x)) {
                return false;
            }
        } else if y > midpoint {
            if !open(Pos::new(y - 1, x)) {
                return false;
            }
        } else if src.invisible {
            return false;
        }
    }
    true
}

fn add_lite(
    floor: &mut Floor,
    terrain: &TerrainRegistry,
    points: &mut Vec<Pos>,
    pos: Pos,
    player: Pos,
    src: &LightSource,
) {
    let Some(info) = floor.cell(pos).map(|c| c.info) else {
        return;
    };
    if info & (CellInfo::MNLT | CellInfo::VIEW) != CellInfo::VIEW {
        return;
    }
    if !floor.has_los_terrain(terrain, pos)
        && !passes_corner_test(src, player, pos, |p| floor.has_los_terrain(terrain, p))
    {
        return;
    }

    let Some(cell) = floor.cell_mut(pos) else {
        return;
    };
    if cell.info.contains(CellInfo::MNDK) {
        cell.info.remove(CellInfo::MNDK);
    } else {
        points.push(pos);
    }
    cell.info.insert(CellInfo::MNLT);
}

fn add_dark(
    floor: &mut Floor,
    terrain: &TerrainRegistry,
    points: &mut Vec<Pos>,
    pos: Pos,
    player: Pos,
    src: &LightSource,
) {
    let Some(info) = floor.cell(pos).map(|c| c.info) else {
        return;
    };
    let mask = CellInfo::LITE | CellInfo::MNLT | CellInfo::MNDK | CellInfo::VIEW;
    if info & mask != CellInfo::VIEW {
        return;
    }
    let open = |p: Pos| {
        floor.has_los_terrain(terrain, p) || floor.has_flag(terrain, p, TerrainFlags::PROJECT)
    };
    if !open(pos) && !passes_corner_test(src, player, pos, open) {
        return;
    }

    points.push(pos);
    if let Some(cell) = floor.cell_mut(pos) {
        cell.info.insert(CellInfo::MNDK);
    }
}

/// Gather this pass's emitters in slot order
fn collect_sources(state: &GameState, dis_lim: i32, darkness: bool) -> Vec<LightSource> {
    let registry = &state.registry;
    let floor = &state.floor;
    let underground = floor.is_underground();
    let daytime = state.world.is_daytime();
    let phase_out = state.world.is_phase_out();

    floor
        .monsters()
        .filter(|m| m.cdis <= dis_lim)
        .filter_map(|m| {
            let race = registry.race(m.race)?;
            let mut radius = race.brightness.radius();
            if radius == 0 {
                return None;
            }
            let emission = if radius > 0 {
                let self_lit = race.brightness.intersects(BrightnessFlags::SELF_LITE);
                if !self_lit && (m.is_asleep() || (!underground && daytime) || phase_out) {
                    return None;
                }
                if darkness {
                    radius = 1;
                }
                Emission::Lite
            } else {
                let self_dark = race.brightness.intersects(BrightnessFlags::SELF_DARK);
                if !self_dark && (m.is_asleep() || (!underground && !daytime)) {
                    return None;
                }
                radius = -radius;
                Emission::Dark
            };
            Some(LightSource {
                pos: m.pos,
                radius,
                emission,
                invisible: !floor.in_view(m.pos),
            })
        })
        .collect()
}

/// Recompute the cells lit and darkened by monsters
pub fn update_mon_lite(state: &mut GameState) {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let darkness = registry.dungeon(state.floor.dungeon).has(DungeonFlags::DARKNESS);
    let max_sight = state.options.max_sight;
    let dis_lim = if darkness && !state.player.has(PlayerFlags::SEE_NOCTO) {
        max_sight / 2 + 1
    } else {
        max_sight + 3
    };

    let old = std::mem::take(&mut state.floor.mon_lite);
    for &p in &old {
        if let Some(cell) = state.floor.cell_mut(p) {
            let mark = if cell.info.contains(CellInfo::MNLT) {
                CellInfo::TEMP
            } else {
                CellInfo::XTRA
            };
            cell.info.insert(mark);
            cell.info.remove(CellInfo::MNLT | CellInfo::MNDK);
        }
    }

    let mut points = Vec::new();
    if state.world.timewalk.is_none() {
        let sources = collect_sources(state, dis_lim, darkness);
        let player = state.player.pos;
        let floor = &mut state.floor;
        for src in &sources {
            let gate = match src.emission {
                Emission::Lite => TerrainFlags::LOS,
                Emission::Dark => TerrainFlags::PROJECT,
            };
            for pos in reached_cells(floor, terrain, src, gate) {
                match src.emission {
                    Emission::Lite => add_lite(floor, terrain, &mut points, pos, player, src),
                    Emission::Dark => add_dark(floor, terrain, &mut points, pos, player, src),
                }
            }
        }
    }

    let floor = &mut state.floor;
    let end_temp = points.len();
    for &p in &old {
        if let Some(cell) = floor.cell_mut(p) {
            let keep = if cell.info.contains(CellInfo::TEMP) {
                CellInfo::MNLT
            } else {
                CellInfo::MNDK
            };
            if cell.info & (CellInfo::VIEW | keep) == CellInfo::VIEW {
                cell.note_and_redraw();
            }
        }
        points.push(p);
    }

    for &p in &points[..end_temp] {
        if let Some(cell) = floor.cell_mut(p) {
            let before = if cell.info.contains(CellInfo::MNLT) {
                CellInfo::TEMP
            } else {
                CellInfo::XTRA
            };
            if cell.info & (CellInfo::VIEW | before) == CellInfo::VIEW {
                cell.note_and_redraw();
            }
        }
    }

    for &p in &points[end_temp..] {
        if let Some(cell) = floor.cell_mut(p) {
            cell.info.remove(CellInfo::TEMP | CellInfo::XTRA);
        }
    }
    points.truncate(end_temp);
    floor.mon_lite = points;

    let player = &mut state.player;
    player.monlite = state
        .floor
        .cell(player.pos)
        .is_some_and(|c| c.info.contains(CellInfo::MNLT));
    if player.has_super_stealth() && player.old_monlite != player.monlite {
        let msg = if player.monlite {
            "Your mantle of shadow becomes thin."
        } else {
            "Your mantle of shadow is restored to its original darkness."
        };
        state.messages.push(msg.to_string());
    }
    player.old_monlite = player.monlite;

    tracing::trace!(cells = state.floor.mon_lite.len(), "monster light pass");
}

/// Drop all monster light, e.g. when leaving the floor
pub fn clear_mon_lite(floor: &mut Floor) {
    for p in std::mem::take(&mut floor.mon_lite) {
        if let Some(cell) = floor.cell_mut(p) {
            cell.info.remove(CellInfo::MNLT | CellInfo::MNDK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{room_state, spawn};
    use crate::vision::update_view;

    fn lit(state: &GameState) -> Vec<Pos> {
        let mut v: Vec<Pos> = state
            .floor
            .positions()
            .filter(|p| state.floor.cell(*p).is_some_and(|c| c.is_monster_lit()))
            .collect();
        v.sort_by_key(|p| (p.y, p.x));
        v
    }

    #[test]
    fn test_radius_one_lights_block() {
        let mut state = room_state(20, 12);
        state.player.pos = Pos::new(5, 2);
        spawn(&mut state, "FIRE_SPIRIT", Pos::new(5, 10));
        update_view(&mut state);
        update_mon_lite(&mut state);
        let cells = lit(&state);
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&Pos::new(4, 9)));
        assert_eq!(state.floor.mon_lite.len(), 9);
    }

    #[test]
    fn test_light_is_idempotent() {
        let mut state = room_state(20, 12);
        state.player.pos = Pos::new(5, 2);
        spawn(&mut state, "ANGEL", Pos::new(5, 10));
        update_view(&mut state);
        update_mon_lite(&mut state);
        let first = lit(&state);
        state.floor.take_redraws();
        update_mon_lite(&mut state);
        assert_eq!(lit(&state), first);
        assert!(state.floor.take_redraws().is_empty());
        let info = |p| state.floor.cell(p).unwrap().info;
        for p in &first {
            assert!(!info(*p).intersects(CellInfo::TEMP | CellInfo::XTRA));
        }
    }

    #[test]
    fn test_sleeping_emitter_is_dark() {
        let mut state = room_state(20, 12);
        let id = spawn(&mut state, "ANGEL", Pos::new(5, 10));
        state.floor.monster_mut(id).unwrap().timers.sleep = 10;
        update_view(&mut state);
        update_mon_lite(&mut state);
        assert!(lit(&state).is_empty());
    }

    #[test]
    fn test_darkness_aura() {
        let mut state = room_state(20, 12);
        state.player.pos = Pos::new(5, 2);
        spawn(&mut state, "SHADOW", Pos::new(5, 10));
        update_view(&mut state);
        update_mon_lite(&mut state);
        let dark = state
            .floor
            .positions()
            .filter(|p| state.floor.cell(*p).unwrap().is_monster_dark())
            .count();
        assert!(dark > 9);
        assert!(lit(&state).is_empty());
    }

    #[test]
    fn test_light_removed_when_emitter_leaves() {
        let mut state = room_state(20, 12);
        state.player.pos = Pos::new(5, 2);
        let id = spawn(&mut state, "FIRE_SPIRIT", Pos::new(5, 10));
        update_view(&mut state);
        update_mon_lite(&mut state);
        state.floor.take_redraws();
        state.floor.remove_monster(id);
        update_mon_lite(&mut state);
        assert!(lit(&state).is_empty());
        assert!(state.floor.mon_lite.is_empty());
        assert_eq!(state.floor.take_redraws().len(), 9);
    }

    #[test]
    fn test_timewalk_suppresses_light() {
        let mut state = room_state(20, 12);
        let id = spawn(&mut state, "FIRE_SPIRIT", Pos::new(5, 10));
        state.world.timewalk = Some(id);
        update_view(&mut state);
        update_mon_lite(&mut state);
        assert!(lit(&state).is_empty());
    }

    #[test]
    fn test_mantle_message_on_flip() {
        let mut state = room_state(20, 12);
        state.player.pos = Pos::new(5, 9);
        state.player.flags |= PlayerFlags::SUPER_STEALTH;
        let id = spawn(&mut state, "FIRE_SPIRIT", Pos::new(5, 10));
        update_view(&mut state);
        update_mon_lite(&mut state);
        assert!(state.player.monlite);
        assert_eq!(
            state.messages.last().map(String::as_str),
            Some("Your mantle of shadow becomes thin.")
        );
        state.floor.remove_monster(id);
        update_mon_lite(&mut state);
        assert!(!state.player.monlite);
        assert_eq!(
            state.messages.last().map(String::as_str),
            Some("Your mantle of shadow is restored to its original darkness.")
        );
    }

    #[test]
    fn test_corner_test_midpoint() {
        let src = LightSource {
            pos: Pos::new(0, 0),
            radius: 1,
            emission: Emission::Lite,
            invisible: true,
        };
        // Player at (4, 2): for y = 1 the midpoint is 0 + 2*1/4 = 0
        let player = Pos::new(4, 2);
        assert!(!passes_corner_test(&src, player, Pos::new(1, 0), |_| true));
        assert!(passes_corner_test(&src, player, Pos::new(1, 1), |p| p == Pos::new(1, 0) || p == Pos::new(2, 1)));
        assert!(!passes_corner_test(&src, player, Pos::new(1, 1), |_| false));
    }
}
