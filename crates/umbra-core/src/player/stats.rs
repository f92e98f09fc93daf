//! Primary stats (STR, INT, WIS, DEX, CON, CHR)

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::consts::STAT_COUNT;

/// Lowest value a drained stat can reach
pub const STAT_MIN: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[repr(u8)]
pub enum Stat {
    Strength = 0,
    Intelligence = 1,
    Wisdom = 2,
    Dexterity = 3,
    Constitution = 4,
    Charisma = 5,
}

impl Stat {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn full_name(self) -> &'static str {
        match self {
            Stat::Strength => "strength",
            Stat::Intelligence => "intelligence",
            Stat::Wisdom => "wisdom",
            Stat::Dexterity => "dexterity",
            Stat::Constitution => "constitution",
            Stat::Charisma => "charisma",
        }
    }
}

/// Current and maximum value of every stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    cur: [i32; STAT_COUNT],
    max: [i32; STAT_COUNT],
}

impl Default for Stats {
    fn default() -> Self {
        Self::new([14; STAT_COUNT])
    }
}

impl Stats {
    pub const fn new(values: [i32; STAT_COUNT]) -> Self {
        Self {
            cur: values,
            max: values,
        }
    }

    pub const fn get(&self, stat: Stat) -> i32 {
        self.cur[stat as usize]
    }

    pub const fn max(&self, stat: Stat) -> i32 {
        self.max[stat as usize]
    }

    /// Lower a stat by `amount`, never below [`STAT_MIN`].
    ///
    /// A permanent drain lowers the maximum as well. Returns true if the
    /// current value changed.
    pub fn decrease(&mut self, stat: Stat, amount: i32, permanent: bool) -> bool {
        let i = stat.index();
        let before = self.cur[i];
        self.cur[i] = (self.cur[i] - amount.max(0)).max(STAT_MIN);
        if permanent {
            self.max[i] = (self.max[i] - amount.max(0)).max(STAT_MIN);
        }
        self.cur[i] != before
    }

    /// Restore a stat to its maximum
    pub fn restore(&mut self, stat: Stat) -> bool {
        let i = stat.index();
        let changed = self.cur[i] != self.max[i];
        self.cur[i] = self.max[i];
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrease_floor() {
        let mut s = Stats::default();
        assert!(s.decrease(Stat::Strength, 5, false));
        assert_eq!(s.get(Stat::Strength), 9);
        assert_eq!(s.max(Stat::Strength), 14);
        s.decrease(Stat::Strength, 50, false);
        assert_eq!(s.get(Stat::Strength), STAT_MIN);
        assert!(!s.decrease(Stat::Strength, 1, false));
    }

    #[test]
    fn test_permanent_drain_and_restore() {
        let mut s = Stats::default();
        s.decrease(Stat::Constitution, 2, true);
        assert_eq!(s.max(Stat::Constitution), 12);
        assert!(!s.restore(Stat::Constitution));
        s.decrease(Stat::Dexterity, 2, false);
        assert!(s.restore(Stat::Dexterity));
        assert_eq!(s.get(Stat::Dexterity), 14);
    }
}
