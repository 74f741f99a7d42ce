//! Attack sequence resolution
//!
//! hit → wound → save → ward → damage allocation, one weapon at a time.
//! Rolls are made in batches (all hit rolls, then all wound rolls, ...) so
//! a fixed seed always walks the dice in the same order.

use tracing::debug;

use crate::battle::units::Unit;
use crate::battle::weapon::{Weapon, WeaponAbility};
use crate::combat::damage::{ward_points, ward_roll};
use crate::combat::result::CombatResult;
use crate::dice::DiceRoller;
use crate::rules::context::{Axis, RuleContext};
use crate::rules::engine::RuleEngine;
use crate::rules::trigger::Trigger;

/// Highest face on a d6
const CRITICAL_ROLL: u8 = 6;

/// Does a roll succeed against `threshold`? A natural 1 always fails.
pub fn roll_succeeds(roll: u8, modifier: i32, threshold: i32) -> bool {
    roll != 1 && roll as i32 + modifier >= threshold
}

/// Net hit modifier. Exempt weapons only feel the negative side.
fn hit_modifier(ctx: &RuleContext<'_>, exempt: bool) -> i32 {
    let modifier = ctx.modifier(Axis::Hit);
    if exempt {
        modifier.penalty()
    } else {
        modifier.total()
    }
}

fn keep_notes(result: &mut CombatResult, ctx: &mut RuleContext<'_>) {
    for note in ctx.take_notes() {
        if !result.notes.contains(&note) {
            result.notes.push(note);
        }
    }
}

/// Resolve every attack of one weapon against `defender`
///
/// A destroyed defender (or a destroyed attacker) yields a zero-effect
/// result and fires no triggers.
pub fn resolve_attacks<D: DiceRoller + ?Sized>(
    dice: &mut D,
    rules: &RuleEngine,
    attacker: &Unit,
    weapon: &Weapon,
    defender: &mut Unit,
    is_shooting: bool,
) -> CombatResult {
    let mut result = CombatResult::new(&weapon.name);
    if defender.is_destroyed() || attacker.is_destroyed() {
        return result;
    }

    let exempt = weapon.has_ability(WeaponAbility::Exempt);
    result.attacks = weapon.attacks;

    // Hit rolls
    let mut hits = Vec::with_capacity(weapon.attacks as usize);
    for _ in 0..weapon.attacks {
        let mut ctx = RuleContext::attack(Trigger::BeforeHitRoll, attacker, defender, weapon, is_shooting);
        rules.evaluate(Trigger::BeforeHitRoll, &mut ctx);
        if let Some(message) = ctx.block_message() {
            let note = format!("attack blocked: {message}");
            if !result.notes.contains(&note) {
                result.notes.push(note);
            }
            keep_notes(&mut result, &mut ctx);
            continue;
        }

        let roll = dice.d6();
        let modifier = hit_modifier(&ctx, exempt);
        keep_notes(&mut result, &mut ctx);
        if roll_succeeds(roll, modifier, weapon.to_hit as i32) {
            let critical = roll == CRITICAL_ROLL;
            result.hits += 1;
            if critical {
                result.critical_hits += 1;
            }
            hits.push(critical);
        }
    }

    // Wound rolls
    let mut wounds = 0;
    let mut mortal_points = 0;
    for critical in hits {
        if critical && weapon.has_ability(WeaponAbility::CritMortal) {
            mortal_points += weapon.damage;
            continue;
        }
        if critical && weapon.has_ability(WeaponAbility::CritAutoWound) {
            wounds += 1;
            continue;
        }

        let mut ctx = RuleContext::attack(Trigger::BeforeWoundRoll, attacker, defender, weapon, is_shooting);
        rules.evaluate(Trigger::BeforeWoundRoll, &mut ctx);
        let roll = dice.d6();
        let modifier = ctx.modifier(Axis::Wound).total();
        keep_notes(&mut result, &mut ctx);
        if roll_succeeds(roll, modifier, weapon.to_wound as i32) {
            wounds += 1;
        }
    }
    result.wounds = wounds;

    // Save rolls: rend lowers the number needed
    let save_threshold = defender.stats.save as i32 - weapon.rend as i32;
    for _ in 0..wounds {
        let mut ctx = RuleContext::attack(Trigger::BeforeSaveRoll, attacker, defender, weapon, is_shooting);
        rules.evaluate(Trigger::BeforeSaveRoll, &mut ctx);
        let roll = dice.d6();
        let modifier = ctx.modifier(Axis::Save).total();
        keep_notes(&mut result, &mut ctx);
        if !roll_succeeds(roll, modifier, save_threshold) {
            result.saves_failed += 1;
        }
    }

    // Ward saves: one roll per unsaved wound, one per point of mortal damage
    let mut instances = Vec::with_capacity(result.saves_failed as usize);
    for _ in 0..result.saves_failed {
        match defender.ward {
            Some(ward) if ward_roll(dice, ward) => result.ward_saved += 1,
            _ => instances.push(weapon.damage),
        }
    }
    let (mortal_kept, mortal_saved) = ward_points(dice, defender.ward, mortal_points);
    result.mortal_ward_saved = mortal_saved;

    // Damage allocation, one instance at a time
    let mut destroyed = false;
    for amount in instances {
        let applied = defender.take_damage(amount);
        result.damage_dealt += applied.dealt;
        destroyed = on_casualties(rules, attacker, weapon, defender, is_shooting, &applied.slain, &mut result);
        if destroyed {
            break;
        }
    }
    if !destroyed && mortal_kept > 0 {
        let applied = defender.take_damage(mortal_kept);
        result.mortal_damage_dealt += applied.dealt;
        on_casualties(rules, attacker, weapon, defender, is_shooting, &applied.slain, &mut result);
    }

    let mut ctx = RuleContext::attack(Trigger::AfterCombatResolve, attacker, defender, weapon, is_shooting);
    ctx.slain_count = result.models_slain;
    rules.evaluate(Trigger::AfterCombatResolve, &mut ctx);
    keep_notes(&mut result, &mut ctx);

    debug!("{} → {}: {}", attacker.name, defender.name, result);
    result
}

/// Fire slain/destroyed triggers for one damage instance. Returns true once
/// the defender is destroyed.
fn on_casualties(
    rules: &RuleEngine,
    attacker: &Unit,
    weapon: &Weapon,
    defender: &Unit,
    is_shooting: bool,
    slain: &[usize],
    result: &mut CombatResult,
) -> bool {
    for _ in slain {
        result.models_slain += 1;
        let mut ctx = RuleContext::attack(Trigger::OnModelSlain, attacker, defender, weapon, is_shooting);
        ctx.slain_count = result.models_slain;
        rules.evaluate(Trigger::OnModelSlain, &mut ctx);
        keep_notes(result, &mut ctx);
    }

    if defender.is_destroyed() && !result.unit_destroyed {
        result.unit_destroyed = true;
        let mut ctx = RuleContext::attack(Trigger::OnUnitDestroyed, attacker, defender, weapon, is_shooting);
        ctx.slain_count = result.models_slain;
        rules.evaluate(Trigger::OnUnitDestroyed, &mut ctx);
        keep_notes(result, &mut ctx);
    }
    result.unit_destroyed
}

/// Resolve `weapons` in order, stopping once the defender is destroyed
///
/// Weapons after that point are skipped entirely: they produce no result
/// and fire no triggers.
pub fn resolve_weapons<'w, D, I>(
    dice: &mut D,
    rules: &RuleEngine,
    attacker: &Unit,
    weapons: I,
    defender: &mut Unit,
    is_shooting: bool,
) -> Vec<CombatResult>
where
    D: DiceRoller + ?Sized,
    I: IntoIterator<Item = &'w Weapon>,
{
    let mut results = Vec::new();
    for weapon in weapons {
        if defender.is_destroyed() {
            break;
        }
        results.push(resolve_attacks(dice, rules, attacker, weapon, defender, is_shooting));
    }
    results
}

/// Resolve all of the attacker's melee weapons
pub fn resolve_combat<D: DiceRoller + ?Sized>(
    dice: &mut D,
    rules: &RuleEngine,
    attacker: &Unit,
    defender: &mut Unit,
) -> Vec<CombatResult> {
    resolve_weapons(dice, rules, attacker, attacker.melee_weapons(), defender, false)
}

/// Resolve the attacker's ranged weapons that reach the defender
pub fn resolve_shooting<D: DiceRoller + ?Sized>(
    dice: &mut D,
    rules: &RuleEngine,
    attacker: &Unit,
    defender: &mut Unit,
) -> Vec<CombatResult> {
    let distance = attacker.distance_to(defender);
    let weapons = attacker.ranged_weapons().filter(|w| w.in_range(distance));
    resolve_weapons(dice, rules, attacker, weapons, defender, true)
}
