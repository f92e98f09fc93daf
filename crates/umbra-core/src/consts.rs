//! Engine-wide constants
//!
//! Balance values that a dungeon designer may want to tune live in
//! [`crate::world::EngineOptions`]; the values here are structural.

/// Default floor dimensions used by the demonstration runner and tests
pub const DEFAULT_FLOOR_WIDTH: i32 = 66;
pub const DEFAULT_FLOOR_HEIGHT: i32 = 22;

/// Maximum distance at which the player can see a grid
pub const MAX_PLAYER_SIGHT: i32 = 20;

/// Maximum distance at which a monster is processed at all
pub const MAX_MONSTER_SENSING: i32 = 100;

/// Maximum length of a projection path
pub const MAX_RANGE: i32 = 18;

/// Energy replenished after each action
pub const ENERGY_NEED: i16 = 100;

/// Speed value meaning "normal" (+0)
pub const NORMAL_SPEED: i16 = 110;

/// Cap for a monster's hit points
pub const MONSTER_MAXHP: i32 = 30000;

/// Maximum number of flee/hide search rings
pub const SAFETY_RINGS: i32 = 10;

/// Number of primary stats
pub const STAT_COUNT: usize = 6;

/// Energy gained per game turn for each speed value 0..=199.
///
/// Speeds above the table use its last entry.
const EXTRACT_ENERGY: [u8; 200] = [
    // Slow
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    // S-50
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    // S-40
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, //
    // S-30
    2, 2, 2, 2, 2, 2, 2, 3, 3, 3, //
    // S-20
    3, 3, 3, 3, 3, 4, 4, 4, 4, 4, //
    // S-10
    5, 5, 5, 5, 6, 6, 7, 7, 8, 9, //
    // Norm
    10, 11, 12, 13, 14, 15, 16, 17, 18, 19, //
    // F+10
    20, 21, 22, 23, 24, 25, 26, 27, 28, 29, //
    // F+20
    30, 31, 32, 33, 34, 35, 36, 36, 37, 37, //
    // F+30
    38, 38, 39, 39, 40, 40, 40, 41, 41, 41, //
    // F+40
    42, 42, 42, 43, 43, 43, 44, 44, 44, 44, //
    // F+50
    45, 45, 45, 45, 45, 46, 46, 46, 46, 46, //
    // F+60
    47, 47, 47, 47, 47, 48, 48, 48, 48, 48, //
    // F+70
    49, 49, 49, 49, 49, 49, 49, 49, 49, 49, //
    // Fast
    49, 49, 49, 49, 49, 49, 49, 49, 49, 49, //
];

/// Energy gained in one scheduler sweep at the given speed. Always at least 1.
pub fn speed_to_energy(speed: i16) -> i16 {
    let idx = speed.clamp(0, EXTRACT_ENERGY.len() as i16 - 1) as usize;
    EXTRACT_ENERGY[idx] as i16
}
