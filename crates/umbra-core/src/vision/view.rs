//! The player's view and monster visibility

use std::sync::Arc;

use crate::dungeon::{CellInfo, Pos, distance, los};
use crate::gameloop::GameState;

/// Recompute VIEW and LITE for every cell.
///
/// A cell is in view when it is within sight range and has a line of sight
/// from the player. Cells within the player's light radius are also LITE.
pub fn update_view(state: &mut GameState) {
    let registry = Arc::clone(&state.registry);
    let terrain = &registry.terrain;
    let origin = state.player.pos;
    let max_sight = state.options.max_sight;
    let light_radius = state.player.light_radius;

    let floor = &mut state.floor;
    let mut changed = 0usize;
    for p in floor.positions() {
        let d = distance(origin, p);
        let visible = d <= max_sight && (p == origin || los(floor, terrain, origin, p));
        let lit = visible && d <= light_radius;
        let Some(cell) = floor.cell_mut(p) else {
            continue;
        };
        let was_visible = cell.info.contains(CellInfo::VIEW);
        cell.info.set(CellInfo::VIEW, visible);
        cell.info.set(CellInfo::LITE, lit);
        if was_visible != visible {
            cell.note_and_redraw();
            changed += 1;
        }
    }
    tracing::trace!(changed, "view updated");
}

/// Refresh each monster's distance to the player and whether it is seen.
///
/// A monster is seen when the player is not blind and the monster stands in
/// view on a lit cell (player light, monster light, or a glowing floor not
/// darkened by a monster), or right next to the player.
pub fn update_monsters(state: &mut GameState) {
    let updates: Vec<_> = state
        .floor
        .monsters()
        .map(|m| {
            let (cdis, ml) = sight_of(state, m.pos);
            (m.id, cdis, ml)
        })
        .collect();

    for (id, cdis, ml) in updates {
        if let Some(m) = state.floor.monster_mut(id) {
            m.cdis = cdis;
            m.ml = ml;
        }
    }
}

/// Distance from the player to `pos`, and whether a monster there is seen
pub(crate) fn sight_of(state: &GameState, pos: Pos) -> (i32, bool) {
    let cdis = distance(state.player.pos, pos);
    let info = state.floor.cell(pos).map(|c| c.info).unwrap_or_default();
    let lit = info.intersects(CellInfo::LITE | CellInfo::MNLT)
        || (info.contains(CellInfo::GLOW) && !info.contains(CellInfo::MNDK));
    let ml = state.player.timed.blind == 0
        && cdis <= state.options.max_sight
        && info.contains(CellInfo::VIEW)
        && (lit || cdis <= 1);
    (cdis, ml)
}
