//! Combat resolution: attack sequences, mortal damage, ward saves

pub mod damage;
pub mod resolution;
pub mod result;

pub use damage::{resolve_mortal_wounds, ward_points, ward_roll};
pub use resolution::{resolve_attacks, resolve_combat, resolve_shooting, resolve_weapons, roll_succeeds};
pub use result::{CombatResult, MortalResult};
