//! Weapon profiles
//!
//! A profile covers every attack a unit makes with that weapon: `attacks` is
//! the total number of attack dice, not a per-model count.

use serde::{Deserialize, Serialize};

/// Special weapon abilities (optional capabilities)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponAbility {
    /// A critical hit wounds automatically, skipping the wound roll
    CritAutoWound,
    /// A critical hit inflicts its damage as mortal damage, skipping wound and save
    CritMortal,
    /// Ignores positive hit modifiers from rules; negative ones still apply
    Exempt,
    /// May be fired while the shooter is engaged
    ShootInCombat,
}

/// Complete weapon profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    /// Range in inches, 0 for melee weapons
    pub range: f64,
    pub attacks: u32,
    pub to_hit: u8,
    pub to_wound: u8,
    pub rend: u8,
    pub damage: u32,
    pub abilities: Vec<WeaponAbility>,
}

impl Weapon {
    /// Melee weapon profile
    pub fn melee(name: &str, attacks: u32, to_hit: u8, to_wound: u8, rend: u8, damage: u32) -> Self {
        Self {
            name: name.to_string(),
            range: 0.0,
            attacks,
            to_hit,
            to_wound,
            rend,
            damage,
            abilities: Vec::new(),
        }
    }

    /// Ranged weapon profile
    pub fn ranged(
        name: &str,
        range: f64,
        attacks: u32,
        to_hit: u8,
        to_wound: u8,
        rend: u8,
        damage: u32,
    ) -> Self {
        Self {
            range,
            ..Self::melee(name, attacks, to_hit, to_wound, rend, damage)
        }
    }

    /// Builder: add an ability
    pub fn with_ability(mut self, ability: WeaponAbility) -> Self {
        if !self.abilities.contains(&ability) {
            self.abilities.push(ability);
        }
        self
    }

    /// Check if weapon has a specific ability
    pub fn has_ability(&self, ability: WeaponAbility) -> bool {
        self.abilities.contains(&ability)
    }

    pub fn is_melee(&self) -> bool {
        self.range <= 0.0
    }

    pub fn is_ranged(&self) -> bool {
        !self.is_melee()
    }

    /// Can this weapon reach a target at `distance`?
    pub fn in_range(&self, distance: f64) -> bool {
        self.is_ranged() && distance <= self.range
    }

    /// Common weapon: Sword
    pub fn sword() -> Self {
        Self::melee("Sword", 2, 3, 4, 0, 1)
    }

    /// Common weapon: Spear
    pub fn spear() -> Self {
        Self::melee("Spear", 2, 4, 3, 1, 1)
    }

    /// Common weapon: Longbow
    pub fn longbow() -> Self {
        Self::ranged("Longbow", 18.0, 2, 4, 4, 0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melee_has_zero_range() {
        let sword = Weapon::sword();
        assert!(sword.is_melee());
        assert!(!sword.in_range(0.0));
    }

    #[test]
    fn test_ranged_in_range_inclusive() {
        let bow = Weapon::longbow();
        assert!(bow.is_ranged());
        assert!(bow.in_range(18.0));
        assert!(!bow.in_range(18.01));
    }

    #[test]
    fn test_abilities_not_duplicated() {
        let weapon = Weapon::sword()
            .with_ability(WeaponAbility::CritAutoWound)
            .with_ability(WeaponAbility::CritAutoWound);
        assert_eq!(weapon.abilities.len(), 1);
        assert!(weapon.has_ability(WeaponAbility::CritAutoWound));
        assert!(!weapon.has_ability(WeaponAbility::Exempt));
    }
}
