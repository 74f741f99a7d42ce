//! Reports produced by combat resolution

use serde::{Deserialize, Serialize};
use std::fmt;

/// One weapon's resolution against one defender
///
/// A plain report: built once per weapon per resolution and never touched
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    pub weapon: String,
    pub attacks: u32,
    pub hits: u32,
    /// Hits scored on a natural 6
    pub critical_hits: u32,
    pub wounds: u32,
    pub saves_failed: u32,
    /// Unsaved wounds negated by a ward save
    pub ward_saved: u32,
    /// Points of mortal damage negated by a ward save
    pub mortal_ward_saved: u32,
    /// Wounds removed by normal damage
    pub damage_dealt: u32,
    /// Wounds removed by mortal damage (critical hits that bypass saves)
    pub mortal_damage_dealt: u32,
    pub models_slain: u32,
    pub unit_destroyed: bool,
    /// Messages left by rules during resolution
    pub notes: Vec<String>,
}

impl CombatResult {
    pub fn new(weapon: &str) -> Self {
        Self {
            weapon: weapon.to_string(),
            ..Default::default()
        }
    }

    /// All wounds this weapon removed
    pub fn total_damage(&self) -> u32 {
        self.damage_dealt + self.mortal_damage_dealt
    }

    /// Did anything happen at all?
    pub fn is_zero_effect(&self) -> bool {
        self.attacks == 0 && self.total_damage() == 0
    }
}

impl fmt::Display for CombatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} attacks, {} hits ({} crit), {} wounds, {} unsaved",
            self.weapon, self.attacks, self.hits, self.critical_hits, self.wounds, self.saves_failed
        )?;
        if self.ward_saved > 0 || self.mortal_ward_saved > 0 {
            write!(f, ", {} warded", self.ward_saved + self.mortal_ward_saved)?;
        }
        write!(f, ", {} damage", self.damage_dealt)?;
        if self.mortal_damage_dealt > 0 {
            write!(f, " + {} mortal", self.mortal_damage_dealt)?;
        }
        write!(f, ", {} slain", self.models_slain)?;
        if self.unit_destroyed {
            write!(f, ", unit destroyed")?;
        }
        Ok(())
    }
}

/// Result of mortal damage applied outside the attack sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MortalResult {
    pub damage_dealt: u32,
    pub ward_saved: u32,
    pub models_slain: u32,
    pub unit_destroyed: bool,
}

impl fmt::Display for MortalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mortal damage", self.damage_dealt)?;
        if self.ward_saved > 0 {
            write!(f, " ({} warded)", self.ward_saved)?;
        }
        write!(f, ", {} slain", self.models_slain)?;
        if self.unit_destroyed {
            write!(f, ", unit destroyed")?;
        }
        Ok(())
    }
}
