//! Combat resolver integration tests

use proptest::prelude::*;

use warband::battle::{Stats, Unit, Weapon, WeaponAbility};
use warband::combat::{resolve_attacks, resolve_combat, resolve_mortal_wounds, roll_succeeds, CombatResult};
use warband::core::types::{PlayerId, Position, UnitId};
use warband::dice::{DiceRoller, DiceSource, LoadedDice};
use warband::rules::{Axis, Rule, RuleEngine, RuleSource, Trigger};

fn horde(save: u8, models: usize) -> Unit {
    Unit::new(UnitId(2), PlayerId(1), "Horde", Stats::new(5.0, save, 1, 1), models, Position::new(12.0, 10.0))
}

fn attacker() -> Unit {
    Unit::new(UnitId(1), PlayerId(0), "Champions", Stats::new(5.0, 4, 1, 3), 5, Position::new(10.0, 10.0))
}

fn hammer() -> Weapon {
    Weapon::melee("Hammer", 100, 2, 2, 5, 1)
}

fn damage_over_seeds(weapon: &Weapon, rules: &RuleEngine, defender: &Unit, seeds: u64) -> u32 {
    let attacker = attacker();
    (0..seeds)
        .map(|seed| {
            let mut dice = DiceSource::new(seed);
            let mut target = defender.clone();
            resolve_attacks(&mut dice, rules, &attacker, weapon, &mut target, false).total_damage()
        })
        .sum()
}

#[test]
fn test_rend_five_against_save_six_still_hurts() {
    let rules = RuleEngine::new();
    let attacker = attacker();
    let mut defender = horde(6, 200);
    let mut dice = DiceSource::new(17);
    let result = resolve_attacks(&mut dice, &rules, &attacker, &hammer(), &mut defender, false);
    assert!(result.damage_dealt > 0);
    assert_eq!(result.damage_dealt, result.saves_failed);
}

#[test]
fn test_ward_reduces_damage_across_seeds() {
    let rules = RuleEngine::new();
    let plain = horde(6, 200);
    let warded = horde(6, 200).with_ward(5);

    let without_ward = damage_over_seeds(&hammer(), &rules, &plain, 50);
    let with_ward = damage_over_seeds(&hammer(), &rules, &warded, 50);
    assert!(without_ward > 0);
    assert!(with_ward < without_ward);
}

#[test]
fn test_same_seed_same_results() {
    let rules = RuleEngine::new();
    let attacker = attacker().with_weapon(Weapon::sword()).with_weapon(Weapon::spear());

    let run = || -> Vec<CombatResult> {
        let mut dice = DiceSource::new(99);
        let mut defender = horde(4, 20);
        resolve_combat(&mut dice, &rules, &attacker, &mut defender)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_auto_wound_crits_never_lost() {
    let rules = RuleEngine::new();
    let attacker = attacker();
    let weapon = Weapon::melee("Lance", 100, 2, 6, 0, 1).with_ability(WeaponAbility::CritAutoWound);
    let mut defender = horde(7, 200);
    let mut dice = DiceSource::new(3);
    let result = resolve_attacks(&mut dice, &rules, &attacker, &weapon, &mut defender, false);
    assert!(result.critical_hits > 0);
    assert!(result.wounds >= result.critical_hits);
}

#[test]
fn test_exempt_weapon_ignores_buffs_but_not_penalties() {
    let weapon = Weapon::melee("Greatblade", 100, 4, 4, 0, 1).with_ability(WeaponAbility::Exempt);
    let defender = horde(7, 200);

    let plain = RuleEngine::new();
    let mut buffed = RuleEngine::new();
    buffed.add_rule(Rule::modifier("war-banner", Trigger::BeforeHitRoll, RuleSource::Global, Axis::Hit, 1));
    let mut hindered = RuleEngine::new();
    hindered.add_rule(Rule::modifier("deep-mire", Trigger::BeforeHitRoll, RuleSource::Terrain, Axis::Hit, -1));

    let base = damage_over_seeds(&weapon, &plain, &defender, 20);
    assert_eq!(damage_over_seeds(&weapon, &buffed, &defender, 20), base);
    assert!(damage_over_seeds(&weapon, &hindered, &defender, 20) < base);
}

#[test]
fn test_mortal_damage_spills_across_models() {
    let mut defender = Unit::new(UnitId(2), PlayerId(1), "Knights", Stats::new(5.0, 3, 1, 3), 3, Position::new(0.0, 0.0));
    let mut dice = LoadedDice::always(6);
    let result = resolve_mortal_wounds(&mut dice, &mut defender, 5);
    assert_eq!(result.damage_dealt, 5);
    assert_eq!(result.models_slain, 1);
    assert_eq!(defender.remaining_wounds(), 4);
    assert_eq!(dice.rolls_made(), 0);
}

proptest! {
    #[test]
    fn prop_natural_one_always_fails(modifier in -10i32..10, threshold in -5i32..8) {
        prop_assert!(!roll_succeeds(1, modifier, threshold));
    }

    #[test]
    fn prop_result_counts_are_monotone(
        seed in any::<u64>(),
        attacks in 0u32..60,
        to_hit in 2u8..=6,
        to_wound in 2u8..=6,
        rend in 0u8..3,
        damage in 1u32..3,
        save in 2u8..=7,
        ward in proptest::option::of(4u8..=6),
        crit_mortal in any::<bool>(),
    ) {
        let rules = RuleEngine::new();
        let attacker = attacker();
        let mut weapon = Weapon::melee("Blade", attacks, to_hit, to_wound, rend, damage);
        if crit_mortal {
            weapon = weapon.with_ability(WeaponAbility::CritMortal);
        }
        let mut defender = horde(save, 30);
        defender.ward = ward;
        let before = defender.remaining_wounds();

        let mut dice = DiceSource::new(seed);
        let result = resolve_attacks(&mut dice, &rules, &attacker, &weapon, &mut defender, false);

        prop_assert!(result.hits <= result.attacks);
        prop_assert!(result.critical_hits <= result.hits);
        prop_assert!(result.wounds <= result.hits);
        prop_assert!(result.saves_failed <= result.wounds);
        prop_assert!(result.ward_saved <= result.saves_failed);
        prop_assert_eq!(before - defender.remaining_wounds(), result.total_damage());
    }

    #[test]
    fn prop_loaded_ones_never_hit(bonus in 0i32..6) {
        let mut rules = RuleEngine::new();
        rules.add_rule(Rule::modifier("frenzy", Trigger::BeforeHitRoll, RuleSource::Global, Axis::Hit, bonus));
        let attacker = attacker();
        let mut defender = horde(4, 10);
        let mut dice = LoadedDice::always(1);
        let result = resolve_attacks(&mut dice, &rules, &attacker, &Weapon::sword(), &mut defender, false);
        prop_assert_eq!(result.hits, 0);
        prop_assert_eq!(defender.living_models(), 10);
    }
}
