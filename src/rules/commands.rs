//! Temporary rules granted by commands and rituals
//!
//! Command rules are tagged `RuleSource::Command` and stripped when the phase
//! ends. Ritual buffs are tagged `RuleSource::Spell` and last until the end
//! of the turn.

use crate::core::types::UnitId;
use crate::rules::context::{Axis, RuleContext};
use crate::rules::engine::Rule;
use crate::rules::trigger::{RuleSource, Trigger};

fn attacker_is(unit: UnitId, ctx: &RuleContext<'_>) -> bool {
    ctx.attacker.is_some_and(|a| a.id == unit)
}

fn defender_is(unit: UnitId, ctx: &RuleContext<'_>) -> bool {
    ctx.defender.is_some_and(|d| d.id == unit)
}

/// +1 to hit for every attack made by `unit`
pub fn all_out_attack(unit: UnitId) -> Rule {
    Rule::modifier(
        &format!("all-out-attack:{unit}"),
        Trigger::BeforeHitRoll,
        RuleSource::Command,
        Axis::Hit,
        1,
    )
    .when(move |ctx| attacker_is(unit, ctx))
}

/// +1 save for `unit` whenever it is attacked
pub fn all_out_defence(unit: UnitId) -> Rule {
    Rule::modifier(
        &format!("all-out-defence:{unit}"),
        Trigger::BeforeSaveRoll,
        RuleSource::Command,
        Axis::Save,
        1,
    )
    .when(move |ctx| defender_is(unit, ctx))
}

/// Hit modifier on `unit`'s attacks until end of turn
pub fn ritual_hit_buff(ritual: &str, unit: UnitId, amount: i32) -> Rule {
    Rule::modifier(
        &format!("{ritual}:{unit}"),
        Trigger::BeforeHitRoll,
        RuleSource::Spell,
        Axis::Hit,
        amount,
    )
    .when(move |ctx| attacker_is(unit, ctx))
}

/// Save modifier for `unit` until end of turn
pub fn ritual_save_buff(ritual: &str, unit: UnitId, amount: i32) -> Rule {
    Rule::modifier(
        &format!("{ritual}:{unit}"),
        Trigger::BeforeSaveRoll,
        RuleSource::Spell,
        Axis::Save,
        amount,
    )
    .when(move |ctx| defender_is(unit, ctx))
}
