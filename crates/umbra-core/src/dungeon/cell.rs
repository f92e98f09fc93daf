//! Map cells

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::terrain::TerrainId;
use crate::monster::MonsterId;

bitflags! {
    /// Transient per-cell state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CellInfo: u16 {
        /// Self-lit (room light)
        const GLOW = 0x0001;
        /// Remembered by the player
        const MARK = 0x0002;
        /// Part of a room
        const ROOM = 0x0004;
        /// Lit by the player's own light source
        const LITE = 0x0008;
        /// Inside the player's view
        const VIEW = 0x0010;
        /// Lit by a monster light
        const MNLT = 0x0020;
        /// Darkened by a monster dark aura
        const MNDK = 0x0040;
        /// Scratch: was monster-lit before this light pass
        const TEMP = 0x0080;
        /// Scratch: was monster-darkened before this light pass
        const XTRA = 0x0100;
        /// Needs a map note
        const NOTE = 0x0200;
        /// Needs a redraw
        const REDRAW = 0x0400;
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Actual terrain
    pub terrain: TerrainId,

    /// Terrain shown instead of `terrain` while a feature stays hidden
    pub mimic: Option<TerrainId>,

    pub info: CellInfo,

    /// Occupying monster
    pub monster: Option<MonsterId>,

    /// An object (chest, item pile) lies here
    pub has_object: bool,
}

impl Cell {
    pub const fn new(terrain: TerrainId) -> Self {
        Self {
            terrain,
            mimic: None,
            info: CellInfo::empty(),
            monster: None,
            has_object: false,
        }
    }

    /// The terrain the player perceives
    pub fn apparent_terrain(&self) -> TerrainId {
        self.mimic.unwrap_or(self.terrain)
    }

    /// True while a hidden feature (trap, secret door) disguises this cell
    pub fn is_mimicking(&self) -> bool {
        self.mimic.is_some_and(|m| m != self.terrain)
    }

    pub fn in_view(&self) -> bool {
        self.info.contains(CellInfo::VIEW)
    }

    pub fn is_monster_lit(&self) -> bool {
        self.info.contains(CellInfo::MNLT)
    }

    pub fn is_monster_dark(&self) -> bool {
        self.info.contains(CellInfo::MNDK)
    }

    /// Schedule a map note and redraw
    pub fn note_and_redraw(&mut self) {
        self.info.insert(CellInfo::NOTE | CellInfo::REDRAW);
    }
}
