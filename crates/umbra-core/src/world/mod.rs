//! World state
//!
//! Global, per-session context that is not part of the floor itself, plus
//! the tunable engine options.

mod context;
pub mod options;
mod registry;

pub use context::WorldContext;
pub use options::EngineOptions;
pub use registry::Registry;
