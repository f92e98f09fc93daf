//! Monster system
//!
//! Contains race templates (race), instances (monst), and the turn
//! machinery that drives them: the energy sweep, the per-turn behaviour
//! resolver and the movement, melee and spell steps it calls.

mod lifecycle;
mod lore;
mod melee;
mod monst;
mod movement;
mod processor;
mod race;
mod safety;
mod spell;
mod sweep;

pub use lifecycle::{
    SpawnMode, compact_monsters, damage_monster, delete_monster, fall_off_horse, individual_speed,
    multiply_monster, place_monster, polymorph_chameleon, scale_hp, scatter, summon_specific,
};
pub use lore::{Lore, LoreFlags, RaceLore};
pub use melee::{blow_power, make_attack_normal, monst_attack_monst};
pub use monst::{Monster, MonsterFlags2, MonsterId, MonsterTimers, SmartFlags, are_enemies};
pub use movement::{MoveOutcome, can_cross_terrain, can_enter, process_monster_movement, teleport_monster};
pub use processor::{decide_monster_multiplication, process_monster, process_stealth, vanish_summoned_children};
pub use race::{
    AbilityFlags, Blow, BlowEffect, BrightnessFlags, Dice, KindFlags, MiscFlags, MonsterRace, MonsterSpell,
    MoveFlags, PopulationFlags, RaceId, RaceRegistry, RaceSpecial, ResistFlags, SummonFlags, SummonKind,
};
pub use safety::{find_hiding, find_safety};
pub use spell::{make_attack_spell, monst_spell_monst};
pub use sweep::{SweepReport, SweepStop, decide_process_continue, process_monsters};
