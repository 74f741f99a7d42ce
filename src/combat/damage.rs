//! Mortal damage and ward saves

use crate::battle::units::Unit;
use crate::combat::result::MortalResult;
use crate::dice::DiceRoller;

/// Does a single ward roll succeed? A natural 1 always fails.
pub fn ward_roll<D: DiceRoller + ?Sized>(dice: &mut D, ward: u8) -> bool {
    let roll = dice.d6();
    roll != 1 && roll >= ward
}

/// Roll a ward for each of `points` and split them into (kept, saved)
///
/// Without a ward no dice are rolled.
pub fn ward_points<D: DiceRoller + ?Sized>(dice: &mut D, ward: Option<u8>, points: u32) -> (u32, u32) {
    let Some(ward) = ward else {
        return (points, 0);
    };

    let mut saved = 0;
    for _ in 0..points {
        if ward_roll(dice, ward) {
            saved += 1;
        }
    }
    (points - saved, saved)
}

/// Apply `amount` mortal damage to `unit`, skipping hit, wound and save
/// rolls. Each point gets its own ward roll.
///
/// A destroyed unit takes nothing and no dice are rolled.
pub fn resolve_mortal_wounds<D: DiceRoller + ?Sized>(dice: &mut D, unit: &mut Unit, amount: u32) -> MortalResult {
    if unit.is_destroyed() || amount == 0 {
        return MortalResult {
            unit_destroyed: unit.is_destroyed(),
            ..MortalResult::default()
        };
    }

    let (kept, saved) = ward_points(dice, unit.ward, amount);
    let applied = unit.take_damage(kept);

    MortalResult {
        damage_dealt: applied.dealt,
        ward_saved: saved,
        models_slain: applied.slain.len() as u32,
        unit_destroyed: applied.destroyed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::units::Stats;
    use crate::core::types::{PlayerId, Position, UnitId};
    use crate::dice::LoadedDice;

    fn target(models: usize, health: u32) -> Unit {
        Unit::new(UnitId(1), PlayerId(1), "Target", Stats::new(5.0, 4, 1, health), models, Position::new(0.0, 0.0))
    }

    #[test]
    fn test_mortal_damage_ignores_saves() {
        let mut dice = LoadedDice::always(6);
        let mut unit = target(3, 2);
        let result = resolve_mortal_wounds(&mut dice, &mut unit, 3);
        assert_eq!(result.damage_dealt, 3);
        assert_eq!(result.models_slain, 1);
        assert!(!result.unit_destroyed);
        assert_eq!(dice.rolls_made(), 0);
    }

    #[test]
    fn test_ward_rolled_per_point() {
        // 5+ ward: 6 saves, 2 fails, 5 saves, 1 fails
        let mut dice = LoadedDice::new(vec![6, 2, 5, 1]);
        let mut unit = target(5, 1).with_ward(5);
        let result = resolve_mortal_wounds(&mut dice, &mut unit, 4);
        assert_eq!(result.ward_saved, 2);
        assert_eq!(result.damage_dealt, 2);
        assert_eq!(dice.rolls_made(), 4);
    }

    #[test]
    fn test_excess_mortal_damage_discarded() {
        let mut dice = LoadedDice::always(1);
        let mut unit = target(2, 1);
        let result = resolve_mortal_wounds(&mut dice, &mut unit, 10);
        assert_eq!(result.damage_dealt, 2);
        assert!(result.unit_destroyed);
    }

    #[test]
    fn test_destroyed_unit_takes_nothing() {
        let mut dice = LoadedDice::always(1);
        let mut unit = target(1, 1);
        unit.take_damage(1);
        let result = resolve_mortal_wounds(&mut dice, &mut unit, 3);
        assert_eq!(result.damage_dealt, 0);
        assert!(result.unit_destroyed);
    }

    #[test]
    fn test_ward_natural_one_fails() {
        let mut dice = LoadedDice::always(1);
        assert!(!ward_roll(&mut dice, 1));
    }
}
