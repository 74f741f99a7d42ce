//! Battlefield data model - units, models, weapons, terrain, engagement
//!
//! Everything the combat resolver and the turn engine act on. Nothing here
//! rolls dice or consults rules.

pub mod board;
pub mod constants;
pub mod engagement;
pub mod magic;
pub mod units;
pub mod weapon;

// Re-exports for convenient access
pub use board::{Board, Objective, TerrainKind, TerrainPiece};
pub use constants::*;
pub use engagement::{engaged_enemies, enemy_within, in_engagement, is_engaged, nearest_enemy};
pub use magic::{DamageRoll, Prayer, RitualEffect, Spell};
pub use units::{ActionFlags, DamageApplied, MagicState, Model, Stats, StrikeOrder, Unit};
pub use weapon::{Weapon, WeaponAbility};
