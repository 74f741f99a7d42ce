//! Spells and prayers known by wizards and priests

use serde::{Deserialize, Serialize};

use crate::dice::DiceRoller;

/// Amount of damage, possibly rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageRoll {
    Fixed(u32),
    D3,
    D6,
}

impl DamageRoll {
    pub fn roll<D: DiceRoller + ?Sized>(&self, dice: &mut D) -> u32 {
        match self {
            DamageRoll::Fixed(n) => *n,
            DamageRoll::D3 => dice.d3() as u32,
            DamageRoll::D6 => dice.d6() as u32,
        }
    }
}

/// What a successful spell or prayer does to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RitualEffect {
    /// Mortal damage to an enemy unit
    MortalDamage(DamageRoll),
    /// Restore wounds to a friendly unit
    Heal(u32),
    /// Hit modifier for a friendly unit until end of turn
    HitBuff(i32),
    /// Save modifier for a friendly unit until end of turn
    SaveBuff(i32),
}

impl RitualEffect {
    /// Does this effect target enemies (true) or friends (false)?
    pub fn targets_enemy(&self) -> bool {
        matches!(self, RitualEffect::MortalDamage(_))
    }
}

/// A spell: cast on 2D6 at or above `casting_value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    pub casting_value: u8,
    pub range: f64,
    pub effect: RitualEffect,
}

impl Spell {
    pub fn new(name: &str, casting_value: u8, range: f64, effect: RitualEffect) -> Self {
        Self {
            name: name.to_string(),
            casting_value,
            range,
            effect,
        }
    }

    /// Common spell: Arcane Bolt
    pub fn arcane_bolt() -> Self {
        Self::new("Arcane Bolt", 5, 12.0, RitualEffect::MortalDamage(DamageRoll::D3))
    }

    /// Common spell: Mystic Shield
    pub fn mystic_shield() -> Self {
        Self::new("Mystic Shield", 6, 12.0, RitualEffect::SaveBuff(1))
    }
}

/// A prayer: answered on D6 + ritual points at or above `chanting_value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prayer {
    pub name: String,
    pub chanting_value: u8,
    pub range: f64,
    pub effect: RitualEffect,
}

impl Prayer {
    pub fn new(name: &str, chanting_value: u8, range: f64, effect: RitualEffect) -> Self {
        Self {
            name: name.to_string(),
            chanting_value,
            range,
            effect,
        }
    }

    /// Common prayer: Heal
    pub fn heal() -> Self {
        Self::new("Heal", 3, 12.0, RitualEffect::Heal(3))
    }

    /// Common prayer: Smite
    pub fn smite() -> Self {
        Self::new("Smite", 5, 12.0, RitualEffect::MortalDamage(DamageRoll::D3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::LoadedDice;

    #[test]
    fn test_damage_roll() {
        let mut dice = LoadedDice::new(vec![6, 4]);
        assert_eq!(DamageRoll::Fixed(2).roll(&mut dice), 2);
        assert_eq!(DamageRoll::D3.roll(&mut dice), 3);
        assert_eq!(DamageRoll::D6.roll(&mut dice), 4);
    }

    #[test]
    fn test_effect_targeting() {
        assert!(Spell::arcane_bolt().effect.targets_enemy());
        assert!(!Spell::mystic_shield().effect.targets_enemy());
        assert!(!Prayer::heal().effect.targets_enemy());
    }
}
