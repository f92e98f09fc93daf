//! The current floor: cell grid plus the monster slot arena

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellInfo};
use super::definition::DungeonDef;
use super::pos::Pos;
use super::terrain::{TerrainAction, TerrainFlags, TerrainId, TerrainRegistry};
use crate::monster::{Monster, MonsterId};
use crate::rng::GameRng;

/// Floor-wide flags set by the level generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorFlags {
    /// Monster arena: no trap doors, no special abilities
    pub inside_arena: bool,
    /// A quest is active on this floor
    pub in_quest: bool,
}

/// One dungeon floor
///
/// Monsters live in a slot arena: a [`MonsterId`] is the slot index and is
/// never reused while the floor is played. Dead monsters leave an empty slot
/// until [`Floor::compact_monsters`] renumbers the survivors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    pub width: i32,
    pub height: i32,
    cells: Vec<Cell>,
    monsters: Vec<Option<Monster>>,

    /// Depth (0 = surface)
    pub dun_level: i32,
    /// Index of the dungeon definition in the registry
    pub dungeon: usize,
    pub flags: FloorFlags,

    /// Number of monsters born by reproduction on this floor
    pub num_repro: i32,

    /// Cells currently lit or darkened by monsters
    pub mon_lite: Vec<Pos>,

    /// Set when a monster made noise this turn
    pub monster_noise: bool,
}

impl Floor {
    /// Create a floor filled with one terrain
    pub fn new(width: i32, height: i32, fill: TerrainId) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![Cell::new(fill); size],
            monsters: Vec::new(),
            dun_level: 1,
            dungeon: 0,
            flags: FloorFlags::default(),
            num_repro: 0,
            mon_lite: Vec::new(),
            monster_noise: false,
        }
    }

    /// True if `pos` lies on the grid (edges included)
    pub fn contains(&self, pos: Pos) -> bool {
        pos.y >= 0 && pos.x >= 0 && pos.y < self.height && pos.x < self.width
    }

    /// True if `pos` lies strictly inside the outer edge
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.y > 0 && pos.x > 0 && pos.y < self.height - 1 && pos.x < self.width - 1
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    /// Every position on the grid, row by row
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Pos::new(y, x)))
    }

    pub fn terrain_at(&self, pos: Pos) -> Option<TerrainId> {
        self.cell(pos).map(|c| c.terrain)
    }

    /// Replace the terrain of a cell (level generation and terrain conversion)
    pub fn set_terrain(&mut self, pos: Pos, terrain: TerrainId) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.terrain = terrain;
            cell.mimic = None;
        }
    }

    /// Apply a terrain action to a cell through the conversion rules.
    ///
    /// Returns true if the terrain changed. A converted cell loses its mimic.
    pub fn alter_terrain(
        &mut self,
        terrain: &TerrainRegistry,
        dungeon: &DungeonDef,
        pos: Pos,
        action: TerrainAction,
        rng: &mut GameRng,
    ) -> bool {
        let Some(old) = self.terrain_at(pos) else {
            return false;
        };
        let new = dungeon.convert_terrain_id_by_action(terrain, old, action, rng);
        if new == old {
            return false;
        }
        self.set_terrain(pos, new);
        if let Some(cell) = self.cell_mut(pos) {
            cell.note_and_redraw();
        }
        true
    }

    /// True if the cell's actual terrain has `flag`; false off the grid
    pub fn has_flag(&self, terrain: &TerrainRegistry, pos: Pos, flag: TerrainFlags) -> bool {
        self.cell(pos)
            .is_some_and(|c| terrain.has(c.terrain, flag))
    }

    pub fn has_los_terrain(&self, terrain: &TerrainRegistry, pos: Pos) -> bool {
        self.has_flag(terrain, pos, TerrainFlags::LOS)
    }

    pub fn is_trap(&self, terrain: &TerrainRegistry, pos: Pos) -> bool {
        self.has_flag(terrain, pos, TerrainFlags::TRAP)
    }

    /// Plain floor with nothing lying on it
    pub fn is_clean(&self, terrain: &TerrainRegistry, pos: Pos) -> bool {
        self.cell(pos)
            .is_some_and(|c| terrain.has(c.terrain, TerrainFlags::FLOOR) && !c.has_object)
    }

    /// Inside the player's current view
    pub fn in_view(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(Cell::in_view)
    }

    pub fn is_underground(&self) -> bool {
        self.dun_level > 0
    }

    pub fn is_in_quest(&self) -> bool {
        self.flags.in_quest
    }

    // Monsters

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn is_valid(&self, id: MonsterId) -> bool {
        self.monster(id).is_some()
    }

    pub fn monster_at(&self, pos: Pos) -> Option<MonsterId> {
        self.cell(pos).and_then(|c| c.monster)
    }

    pub fn has_monster(&self, pos: Pos) -> bool {
        self.monster_at(pos).is_some()
    }

    /// Put a monster on the floor in a fresh slot.
    ///
    /// Returns `None` if the position is off the grid or occupied.
    pub fn add_monster(&mut self, mut monster: Monster) -> Option<MonsterId> {
        let pos = monster.pos;
        if self.cell(pos)?.monster.is_some() {
            return None;
        }
        let id = MonsterId(self.monsters.len() as u32);
        monster.id = id;
        self.monsters.push(Some(monster));
        if let Some(cell) = self.cell_mut(pos) {
            cell.monster = Some(id);
        }
        Some(id)
    }

    /// Take a monster off the floor, leaving its slot empty
    pub fn remove_monster(&mut self, id: MonsterId) -> Option<Monster> {
        let monster = self.monsters.get_mut(id.0 as usize)?.take()?;
        if let Some(cell) = self.cell_mut(monster.pos) {
            if cell.monster == Some(id) {
                cell.monster = None;
            }
        }
        Some(monster)
    }

    /// Move a monster to an empty cell
    pub fn move_monster(&mut self, id: MonsterId, to: Pos) -> bool {
        if self.cell(to).is_none_or(|c| c.monster.is_some()) {
            return false;
        }
        let Some(from) = self.monster(id).map(|m| m.pos) else {
            return false;
        };
        if let Some(cell) = self.cell_mut(from) {
            cell.monster = None;
        }
        if let Some(cell) = self.cell_mut(to) {
            cell.monster = Some(id);
        }
        if let Some(m) = self.monster_mut(id) {
            m.pos = to;
        }
        true
    }

    /// Exchange the positions of two monsters
    pub fn swap_monsters(&mut self, a: MonsterId, b: MonsterId) -> bool {
        let (Some(pa), Some(pb)) = (self.monster(a).map(|m| m.pos), self.monster(b).map(|m| m.pos))
        else {
            return false;
        };
        if let Some(cell) = self.cell_mut(pa) {
            cell.monster = Some(b);
        }
        if let Some(cell) = self.cell_mut(pb) {
            cell.monster = Some(a);
        }
        if let Some(m) = self.monster_mut(a) {
            m.pos = pb;
        }
        if let Some(m) = self.monster_mut(b) {
            m.pos = pa;
        }
        true
    }

    /// Number of slots ever handed out (live or dead)
    pub fn slot_count(&self) -> usize {
        self.monsters.len()
    }

    /// Number of live monsters
    pub fn monster_count(&self) -> usize {
        self.monsters.iter().flatten().count()
    }

    pub fn monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().flatten()
    }

    pub fn monsters_mut(&mut self) -> impl Iterator<Item = &mut Monster> {
        self.monsters.iter_mut().flatten()
    }

    /// Ids of all live monsters, highest slot first.
    ///
    /// This is the snapshot a sweep iterates, so monsters born while it runs
    /// are not part of it.
    pub fn valid_ids_descending(&self) -> Vec<MonsterId> {
        self.monsters
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| MonsterId(i as u32))
            .collect()
    }

    /// Drop empty slots and renumber the survivors.
    ///
    /// Returns the mapping from old slot index to new id. A child whose parent
    /// did not survive is pointed at itself, which marks it as orphaned.
    pub fn compact_monsters(&mut self) -> Vec<Option<MonsterId>> {
        let mut remap = Vec::with_capacity(self.monsters.len());
        let mut next = 0u32;
        for slot in &self.monsters {
            if slot.is_some() {
                remap.push(Some(MonsterId(next)));
                next += 1;
            } else {
                remap.push(None);
            }
        }

        let old = std::mem::take(&mut self.monsters);
        for mut monster in old.into_iter().flatten() {
            let Some(new_id) = remap[monster.id.0 as usize] else {
                continue;
            };
            monster.id = new_id;
            monster.parent = monster
                .parent
                .map(|p| remap.get(p.0 as usize).copied().flatten().unwrap_or(new_id));
            if let Some(cell) = self.cell_mut(monster.pos) {
                cell.monster = Some(new_id);
            }
            self.monsters.push(Some(monster));
        }

        tracing::debug!(
            before = remap.len(),
            after = self.monsters.len(),
            "compacted monster slots"
        );
        remap
    }

    /// Clear NOTE/REDRAW marks, returning the cells that carried them
    pub fn take_redraws(&mut self) -> Vec<Pos> {
        let mut out = Vec::new();
        for pos in self.positions() {
            if let Some(cell) = self.cell_mut(pos) {
                if cell.info.intersects(CellInfo::REDRAW | CellInfo::NOTE) {
                    cell.info.remove(CellInfo::REDRAW | CellInfo::NOTE);
                    out.push(pos);
                }
            }
        }
        out
    }
}
