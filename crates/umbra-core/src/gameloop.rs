//! Shared world state and the per-tick driver

use std::sync::Arc;

use bitflags::bitflags;
use strum::Display;

use crate::dungeon::{DungeonDef, Floor};
use crate::monster::{Lore, MonsterId, MonsterRace, SweepReport, process_monsters};
use crate::player::{BadStatusSetter, Player};
use crate::rng::GameRng;
use crate::vision::{clear_mon_lite, update_mon_lite, update_monsters, update_view};
use crate::world::{EngineOptions, Registry, WorldContext};

bitflags! {
    /// Derived state that must be recomputed before the next read
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UpdateFlags: u8 {
        /// Player view cone
        const VIEW = 0x01;
        /// Monster light and darkness
        const MONSTER_LITE = 0x02;
        /// Player bonuses (riding state changed)
        const BONUS = 0x04;
    }
}

/// Sound cues for the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SoundCue {
    Fall,
    Hit,
    Miss,
    Summon,
    Multiply,
    Explode,
    Shriek,
    Teleport,
}

/// A request to leave the current floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FloorChange {
    /// Fell through a trap door: one floor down, random landing spot
    Down,
    Up,
}

/// Result of a game loop tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameLoopResult {
    Continue,
    PlayerDied(String),
    FloorChange(FloorChange),
    /// The game is not running
    Stopped,
}

/// Everything a tick produced
#[derive(Debug, Clone)]
pub struct TickReport {
    pub result: GameLoopResult,
    pub sweep: SweepReport,
}

/// Main game state
pub struct GameState {
    pub registry: Arc<Registry>,
    pub options: EngineOptions,
    pub world: WorldContext,
    pub floor: Floor,
    pub player: Player,
    pub rng: GameRng,
    pub lore: Lore,

    /// Narration for the current session
    pub messages: Vec<String>,
    /// Notable events kept for the player's diary
    pub diary: Vec<String>,
    pub sounds: Vec<SoundCue>,

    pub updates: UpdateFlags,
    /// Pending floor change, consumed by the loop
    pub floor_change: Option<FloorChange>,
    pub autosave_requested: bool,
    pub playing: bool,
}

impl GameState {
    pub fn new(registry: Arc<Registry>, floor: Floor, player: Player, rng: GameRng) -> Self {
        Self {
            registry,
            options: EngineOptions::default(),
            world: WorldContext::default(),
            floor,
            player,
            rng,
            lore: Lore::default(),
            messages: Vec::new(),
            diary: Vec::new(),
            sounds: Vec::new(),
            updates: UpdateFlags::all(),
            floor_change: None,
            autosave_requested: false,
            playing: true,
        }
    }

    /// Emit a message to the player
    pub fn message(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
    }

    /// Drain pending messages
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn diary_entry(&mut self, entry: impl Into<String>) {
        self.diary.push(entry.into());
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.sounds.push(cue);
    }

    pub fn request(&mut self, flags: UpdateFlags) {
        self.updates.insert(flags);
    }

    /// Status mutation interface for the player
    pub fn bad_status(&mut self) -> BadStatusSetter<'_> {
        BadStatusSetter::new(&mut self.player, &mut self.messages)
    }

    /// Definition of the dungeon the current floor belongs to
    pub fn dungeon(&self) -> &DungeonDef {
        self.registry.dungeon(self.floor.dungeon)
    }

    /// Race of a live monster
    pub fn race_of(&self, id: MonsterId) -> Option<&MonsterRace> {
        let m = self.floor.monster(id)?;
        self.registry.race(m.race)
    }

    /// "the kobold", or the pet's nickname
    pub fn monster_name(&self, id: MonsterId) -> String {
        match (self.floor.monster(id), self.race_of(id)) {
            (Some(m), Some(race)) => m.display_name(race),
            _ => "something".to_string(),
        }
    }

    /// The sweep must stop: the player died or is leaving the floor
    pub fn is_sweep_over(&self) -> bool {
        !self.playing || self.player.is_dead || self.player.leaving
    }
}

/// Uppercase the first letter of a sentence
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Drives the simulation one tick at a time
pub struct GameLoop {
    state: GameState,
}

impl GameLoop {
    pub fn new(state: GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Run one world tick: upkeep, a monster sweep, then refresh derived
    /// visibility state.
    ///
    /// A floor change is reported once. The player's leaving mark is cleared
    /// with it, so later ticks sweep again.
    pub fn tick(&mut self) -> TickReport {
        let state = &mut self.state;
        if !state.playing {
            return TickReport {
                result: GameLoopResult::Stopped,
                sweep: SweepReport::default(),
            };
        }

        state.world.game_turn += 1;
        upkeep(state);
        refresh(state);

        let sweep = process_monsters(state);
        refresh(state);

        let result = if state.player.is_dead {
            GameLoopResult::PlayerDied(state.player.died_from.clone().unwrap_or_default())
        } else if let Some(change) = state.floor_change.take() {
            clear_mon_lite(&mut state.floor);
            state.player.leaving = false;
            tracing::debug!(%change, turn = state.world.game_turn, "leaving floor");
            GameLoopResult::FloorChange(change)
        } else {
            GameLoopResult::Continue
        };
        TickReport { result, sweep }
    }
}

/// Count timed effects down
fn upkeep(state: &mut GameState) {
    for m in state.floor.monsters_mut() {
        m.timers.tick();
    }

    let timed = state.player.timed;
    let mut setter = state.bad_status();
    if timed.poisoned > 0 {
        setter.take_hit(1, "poison");
        setter.mod_poison(-1);
    }
    if timed.cut > 0 {
        setter.mod_cut(-1);
    }
    if timed.blind > 0 {
        setter.mod_blindness(-1);
    }
    if timed.confused > 0 {
        setter.mod_confusion(-1);
    }
    if timed.paralyzed > 0 {
        let left = timed.paralyzed - 1;
        setter.set_paralysis(left);
    }
    if timed.slow > 0 {
        setter.mod_deceleration(-1);
    }
    if timed.stun > 0 {
        setter.mod_stun(-1);
    }
}

/// Recompute whatever has been flagged stale
fn refresh(state: &mut GameState) {
    if state.updates.contains(UpdateFlags::VIEW) {
        update_view(state);
        state.updates.remove(UpdateFlags::VIEW);
        state.updates.insert(UpdateFlags::MONSTER_LITE);
    }
    update_monsters(state);
    if state.updates.contains(UpdateFlags::MONSTER_LITE) {
        update_mon_lite(state);
        state.updates.remove(UpdateFlags::MONSTER_LITE);
    }
    state.updates.remove(UpdateFlags::BONUS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Pos;

    fn test_state() -> GameState {
        let registry = Arc::new(Registry::standard().unwrap());
        let floor_id = registry.terrain.by_tag("FLOOR").unwrap();
        let floor = Floor::new(20, 10, floor_id);
        GameState::new(registry, floor, Player::new(Pos::new(5, 5)), GameRng::new(7))
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("the kobold hits you."), "The kobold hits you.");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_tick_advances_turn() {
        let mut game = GameLoop::new(test_state());
        let report = game.tick();
        assert_eq!(report.result, GameLoopResult::Continue);
        assert_eq!(game.state().world.game_turn, 1);
        assert!(game.state().updates.is_empty());
    }

    #[test]
    fn test_stopped_game_does_nothing() {
        let mut state = test_state();
        state.playing = false;
        let mut game = GameLoop::new(state);
        assert_eq!(game.tick().result, GameLoopResult::Stopped);
        assert_eq!(game.state().world.game_turn, 0);
    }

    #[test]
    fn test_poison_ticks_down() {
        let mut state = test_state();
        state.player.timed.poisoned = 2;
        let mut game = GameLoop::new(state);
        game.tick();
        game.tick();
        let state = game.state();
        assert_eq!(state.player.timed.poisoned, 0);
        assert_eq!(state.player.hp, 18);
        assert!(state.messages.iter().any(|m| m == "You are no longer poisoned."));
    }

    #[test]
    fn test_floor_change_is_reported_once() {
        let mut state = test_state();
        state.floor_change = Some(FloorChange::Down);
        let mut game = GameLoop::new(state);
        assert_eq!(
            game.tick().result,
            GameLoopResult::FloorChange(FloorChange::Down)
        );
        assert_eq!(game.tick().result, GameLoopResult::Continue);
    }
}
