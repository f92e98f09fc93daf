//! Player view and monster light
//!
//! Derived per-cell visibility state. The game loop refreshes it whenever
//! the player moves or a light source changes.

mod monster_light;
mod view;

pub use monster_light::{clear_mon_lite, update_mon_lite};
pub(crate) use view::sight_of;
pub use view::{update_monsters, update_view};
