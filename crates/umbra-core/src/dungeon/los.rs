//! Line of sight and projection paths

use super::floor::Floor;
use super::pos::{Pos, distance};
use super::terrain::{TerrainFlags, TerrainRegistry};

/// Walk the Bresenham line from `from` to `to`, excluding `from`.
///
/// `visit` is called with each cell and returns false to stop the walk.
fn walk_line(from: Pos, to: Pos, mut visit: impl FnMut(Pos) -> bool) {
    let (mut x, mut y) = (from.x, from.y);
    let dx = (to.x - x).abs();
    let dy = -(to.y - y).abs();
    let sx = if x < to.x { 1 } else { -1 };
    let sy = if y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    while x != to.x || y != to.y {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        if !visit(Pos::new(y, x)) {
            return;
        }
    }
}

/// True if `to` can be seen from `from`.
///
/// Every intermediate cell must carry LOS; the endpoint itself may block
/// (a wall is visible, the room behind it is not).
pub fn los(floor: &Floor, terrain: &TerrainRegistry, from: Pos, to: Pos) -> bool {
    if !floor.contains(from) || !floor.contains(to) {
        return false;
    }
    let mut clear = true;
    walk_line(from, to, |p| {
        if p == to {
            return false;
        }
        if !floor.has_los_terrain(terrain, p) {
            clear = false;
            return false;
        }
        true
    });
    clear
}

/// The cells a projection from `from` towards `to` passes through.
///
/// The path stops at the first cell without PROJECT (inclusive), at the
/// grid edge, at `to`, or after `range` steps.
pub fn project_path(
    floor: &Floor,
    terrain: &TerrainRegistry,
    from: Pos,
    to: Pos,
    range: i32,
) -> Vec<Pos> {
    let mut path = Vec::new();
    if from == to {
        return path;
    }
    walk_line(from, to, |p| {
        if !floor.contains(p) || distance(from, p) > range {
            return false;
        }
        path.push(p);
        p != to && floor.has_flag(terrain, p, TerrainFlags::PROJECT)
    });
    path
}

/// True if a projection from `from` reaches `to` within `range`
pub fn projectable(
    floor: &Floor,
    terrain: &TerrainRegistry,
    from: Pos,
    to: Pos,
    range: i32,
) -> bool {
    let path = project_path(floor, terrain, from, to, range);
    path.last().is_none_or(|last| *last == to)
}

/// True if a bolt from `from` reaches `to` without being stopped by terrain
/// or by a monster standing in between
pub fn clean_shot(
    floor: &Floor,
    terrain: &TerrainRegistry,
    from: Pos,
    to: Pos,
    range: i32,
) -> bool {
    let path = project_path(floor, terrain, from, to, range);
    match path.split_last() {
        Some((last, rest)) => *last == to && rest.iter().all(|p| !floor.has_monster(*p)),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(reg: &TerrainRegistry) -> Floor {
        let floor_id = reg.by_tag("FLOOR").unwrap();
        let granite = reg.by_tag("GRANITE").unwrap();
        let mut f = Floor::new(20, 12, granite);
        for y in 1..11 {
            for x in 1..19 {
                f.set_terrain(Pos::new(y, x), floor_id);
            }
        }
        f
    }

    #[test]
    fn test_los_blocked_by_wall() {
        let reg = TerrainRegistry::standard();
        let mut f = room(&reg);
        f.set_terrain(Pos::new(5, 10), reg.by_tag("GRANITE").unwrap());

        assert!(los(&f, &reg, Pos::new(5, 8), Pos::new(5, 9)));
        // The wall itself is visible
        assert!(los(&f, &reg, Pos::new(5, 8), Pos::new(5, 10)));
        assert!(!los(&f, &reg, Pos::new(5, 8), Pos::new(5, 11)));
    }

    #[test]
    fn test_projectable_respects_range() {
        let reg = TerrainRegistry::standard();
        let f = room(&reg);
        assert!(projectable(&f, &reg, Pos::new(5, 1), Pos::new(5, 18), 18));
        assert!(!projectable(&f, &reg, Pos::new(5, 1), Pos::new(5, 18), 5));
        assert!(projectable(&f, &reg, Pos::new(5, 5), Pos::new(5, 5), 5));
    }

    #[test]
    fn test_clean_shot_blocked_by_monster() {
        use crate::monster::{Monster, RaceId};

        let reg = TerrainRegistry::standard();
        let mut f = room(&reg);
        assert!(clean_shot(&f, &reg, Pos::new(5, 2), Pos::new(5, 8), 18));
        f.add_monster(Monster::new(RaceId(0), Pos::new(5, 5))).unwrap();
        assert!(!clean_shot(&f, &reg, Pos::new(5, 2), Pos::new(5, 8), 18));
        // A monster on the target cell does not spoil the shot
        assert!(clean_shot(&f, &reg, Pos::new(5, 2), Pos::new(5, 5), 18));
    }

    #[test]
    fn test_project_path_stops_at_wall() {
        let reg = TerrainRegistry::standard();
        let mut f = room(&reg);
        f.set_terrain(Pos::new(5, 6), reg.by_tag("GRANITE").unwrap());
        let path = project_path(&f, &reg, Pos::new(5, 2), Pos::new(5, 9), 18);
        assert_eq!(path.last(), Some(&Pos::new(5, 6)));
        assert!(!projectable(&f, &reg, Pos::new(5, 2), Pos::new(5, 9), 18));
    }
}
