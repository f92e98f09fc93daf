//! Bad status mutation and damage to the player
//!
//! Every setter clamps its value to `0..=10000` and reports whether the
//! player would notice the change. Narration goes to the borrowed message
//! log.

use super::stats::Stat;
use super::you::Player;

const TIMER_MAX: i32 = 10000;

/// Applies bad statuses and damage to the player
pub struct BadStatusSetter<'a> {
    player: &'a mut Player,
    messages: &'a mut Vec<String>,
}

impl<'a> BadStatusSetter<'a> {
    pub fn new(player: &'a mut Player, messages: &'a mut Vec<String>) -> Self {
        Self { player, messages }
    }

    fn say(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    /// Set a timer, narrating the on and off transitions
    fn set_timer(
        &mut self,
        get: fn(&mut Player) -> &mut i32,
        value: i32,
        on_msg: &str,
        off_msg: &str,
    ) -> bool {
        if self.player.is_dead {
            return false;
        }
        let value = value.clamp(0, TIMER_MAX);
        let timer = get(self.player);
        let old = *timer;
        *timer = value;
        match (old > 0, value > 0) {
            (false, true) => {
                self.say(on_msg);
                true
            }
            (true, false) => {
                self.say(off_msg);
                true
            }
            _ => false,
        }
    }

    pub fn set_cut(&mut self, v: i32) -> bool {
        self.set_timer(|p| &mut p.timed.cut, v, "You have been cut.", "You are no longer bleeding.")
    }

    pub fn mod_cut(&mut self, v: i32) -> bool {
        let cur = self.player.timed.cut;
        self.set_cut(cur + v)
    }

    pub fn set_poison(&mut self, v: i32) -> bool {
        self.set_timer(|p| &mut p.timed.poisoned, v, "You are poisoned!", "You are no longer poisoned.")
    }

    pub fn mod_poison(&mut self, v: i32) -> bool {
        let cur = self.player.timed.poisoned;
        self.set_poison(cur + v)
    }

    pub fn set_blindness(&mut self, v: i32) -> bool {
        self.set_timer(|p| &mut p.timed.blind, v, "You are blind!", "You can see again.")
    }

    pub fn mod_blindness(&mut self, v: i32) -> bool {
        let cur = self.player.timed.blind;
        self.set_blindness(cur + v)
    }

    pub fn set_confusion(&mut self, v: i32) -> bool {
        self.set_timer(|p| &mut p.timed.confused, v, "You are confused!", "You feel less confused now.")
    }

    pub fn mod_confusion(&mut self, v: i32) -> bool {
        let cur = self.player.timed.confused;
        self.set_confusion(cur + v)
    }

    pub fn set_paralysis(&mut self, v: i32) -> bool {
        self.set_timer(|p| &mut p.timed.paralyzed, v, "You are paralysed!", "You can move again.")
    }

    /// Paralysis does not stack: an already paralysed player is unaffected
    pub fn mod_paralysis(&mut self, v: i32) -> bool {
        if self.player.timed.paralyzed > 0 {
            return false;
        }
        self.set_paralysis(v)
    }

    pub fn set_deceleration(&mut self, v: i32) -> bool {
        self.set_timer(|p| &mut p.timed.slow, v, "You feel yourself moving slower!", "You feel yourself speed up.")
    }

    pub fn mod_deceleration(&mut self, v: i32) -> bool {
        let cur = self.player.timed.slow;
        self.set_deceleration(cur + v)
    }

    pub fn set_stun(&mut self, v: i32) -> bool {
        self.set_timer(|p| &mut p.timed.stun, v, "You have been stunned.", "You are no longer stunned.")
    }

    pub fn mod_stun(&mut self, v: i32) -> bool {
        let cur = self.player.timed.stun;
        self.set_stun(cur + v)
    }

    /// Drain a stat. Returns true if it went down.
    pub fn dec_stat(&mut self, stat: Stat, amount: i32, permanent: bool) -> bool {
        if !self.player.stats.decrease(stat, amount, permanent) {
            return false;
        }
        let msg = match stat {
            Stat::Strength => "You feel very weak.",
            Stat::Intelligence => "You feel very stupid.",
            Stat::Wisdom => "You feel very naive.",
            Stat::Dexterity => "You feel very clumsy.",
            Stat::Constitution => "You feel very sickly.",
            Stat::Charisma => "You feel very ugly.",
        };
        self.say(msg);
        true
    }

    /// Hurt the player. Hit points below zero kill.
    ///
    /// Returns the damage dealt; a dead player takes none.
    pub fn take_hit(&mut self, damage: i32, killer: &str) -> i32 {
        if self.player.is_dead || damage <= 0 {
            return 0;
        }
        self.player.hp -= damage;
        if self.player.hp < 0 {
            self.player.is_dead = true;
            self.player.died_from = Some(killer.to_string());
            self.say("You die.");
            tracing::debug!(killer, "player died");
        }
        damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poison_transitions() {
        let mut p = Player::default();
        let mut log = Vec::new();
        let mut s = BadStatusSetter::new(&mut p, &mut log);
        assert!(s.mod_poison(5));
        assert!(!s.mod_poison(5));
        assert!(s.set_poison(0));
        assert_eq!(log, vec!["You are poisoned!", "You are no longer poisoned."]);
    }

    #[test]
    fn test_paralysis_does_not_stack() {
        let mut p = Player::default();
        let mut log = Vec::new();
        let mut s = BadStatusSetter::new(&mut p, &mut log);
        assert!(s.mod_paralysis(5));
        assert!(!s.mod_paralysis(5));
        assert_eq!(p.timed.paralyzed, 5);
    }

    #[test]
    fn test_take_hit_kills_below_zero() {
        let mut p = Player::default();
        let mut log = Vec::new();
        let mut s = BadStatusSetter::new(&mut p, &mut log);
        assert_eq!(s.take_hit(20, "a pit"), 20);
        assert!(!p.is_dead);
        let mut s = BadStatusSetter::new(&mut p, &mut log);
        s.take_hit(1, "a dart");
        assert!(p.is_dead);
        assert_eq!(p.died_from.as_deref(), Some("a dart"));
        let mut s = BadStatusSetter::new(&mut p, &mut log);
        assert_eq!(s.take_hit(5, "again"), 0);
    }

    #[test]
    fn test_dec_stat_message() {
        let mut p = Player::default();
        let mut log = Vec::new();
        let mut s = BadStatusSetter::new(&mut p, &mut log);
        assert!(s.dec_stat(Stat::Dexterity, 1, false));
        assert_eq!(log, vec!["You feel very clumsy."]);
    }

    #[test]
    fn test_clamped() {
        let mut p = Player::default();
        let mut log = Vec::new();
        let mut s = BadStatusSetter::new(&mut p, &mut log);
        s.mod_cut(50_000);
        assert_eq!(p.timed.cut, 10000);
    }
}
