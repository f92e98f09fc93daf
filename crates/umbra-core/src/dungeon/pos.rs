//! Grid coordinates and the roguelike distance metric

use core::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A grid coordinate (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    /// Distance to another position (see [`distance`])
    pub fn distance(self, other: Pos) -> i32 {
        distance(self, other)
    }

    /// True if `other` is one of the 8 neighbours of `self`
    pub fn is_adjacent(self, other: Pos) -> bool {
        self != other && (self.y - other.y).abs() <= 1 && (self.x - other.x).abs() <= 1
    }

    /// The 3x3 neighbourhood including `self`
    pub fn moore_neighbourhood(self) -> impl Iterator<Item = Pos> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| Pos::new(self.y + dy, self.x + dx)))
    }

    /// One step from `self` towards `target` (sign of each delta)
    pub fn step_towards(self, target: Pos) -> Pos {
        Pos::new(
            self.y + (target.y - self.y).signum(),
            self.x + (target.x - self.x).signum(),
        )
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::new(self.y + rhs.y, self.x + rhs.x)
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos::new(self.y - rhs.y, self.x - rhs.x)
    }
}

/// The eight compass directions, clockwise from north
pub const DIRECTIONS: [Pos; 8] = [
    Pos::new(-1, 0),
    Pos::new(-1, 1),
    Pos::new(0, 1),
    Pos::new(1, 1),
    Pos::new(1, 0),
    Pos::new(1, -1),
    Pos::new(0, -1),
    Pos::new(-1, -1),
];

/// Approximate Euclidean distance: the longer axis plus half the shorter one.
pub fn distance(a: Pos, b: Pos) -> i32 {
    let dy = (a.y - b.y).abs();
    let dx = (a.x - b.x).abs();
    if dy > dx { dy + (dx >> 1) } else { dx + (dy >> 1) }
}

/// All offsets whose [`distance`] from the origin is exactly `d`.
///
/// Used as the search rings of the flee and hide searches. Ring 0 is empty.
pub fn ring_offsets(d: i32) -> Vec<Pos> {
    if d <= 0 {
        return Vec::new();
    }
    let origin = Pos::default();
    let mut ring = Vec::new();
    for dy in -d..=d {
        for dx in -d..=d {
            let off = Pos::new(dy, dx);
            if distance(origin, off) == d {
                ring.push(off);
            }
        }
    }
    ring
}
