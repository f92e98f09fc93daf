//! Player system
//!
//! The player record the core reads and the status mutation interface the
//! hazard and monster code write through.

mod stats;
mod status;
mod you;

pub use stats::{STAT_MIN, Stat, Stats};
pub use status::BadStatusSetter;
pub use you::{HexFlags, Player, PlayerFlags, PlayerResists, PlayerTimers};
