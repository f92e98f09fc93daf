//! Player action system
//!
//! Traps and chests the player sets off, the area effects they cause, and
//! the movement step that leads into them.

mod chest;
mod effects;
mod movement;
mod trap;

pub use chest::{ChestTrapOutcome, chest_trap};
pub use effects::{
    ProjectEffect, activate_ty_curse, aggravate_monsters, earthquake, project, teleport_player, teleport_player_to,
};
pub use movement::move_player;
pub use trap::{check_hit, hit_trap};

/// Result of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// Action completed, time passes
    Success,
    /// Nothing happened, no time passes
    NoTime,
    /// The action was not understood
    Cancelled,
    /// Player died, with the cause of death
    Died(String),
}

impl ActionResult {
    pub fn took_time(&self) -> bool {
        matches!(self, ActionResult::Success | ActionResult::Died(_))
    }
}
