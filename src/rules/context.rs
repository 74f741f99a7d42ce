//! Evaluation context passed through one rule evaluation
//!
//! A context lives for exactly one decision (one move attempt, one hit roll,
//! one charge) and is thrown away afterwards. Rules read the references and
//! write modifiers, notes, or a block.

use serde::{Deserialize, Serialize};

use crate::battle::units::Unit;
use crate::battle::weapon::Weapon;
use crate::core::types::Position;
use crate::rules::trigger::Trigger;

/// Numeric axis a rule can modify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Hit,
    Wound,
    Save,
    Move,
    Charge,
    PileIn,
}

/// Sum of contributions on one axis, positives and negatives kept apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifier {
    bonus: i32,
    penalty: i32,
}

impl Modifier {
    pub fn add(&mut self, delta: i32) {
        if delta >= 0 {
            self.bonus += delta;
        } else {
            self.penalty += delta;
        }
    }

    /// Net modifier
    pub fn total(&self) -> i32 {
        self.bonus + self.penalty
    }

    /// Sum of positive contributions (>= 0)
    pub fn bonus(&self) -> i32 {
        self.bonus
    }

    /// Sum of negative contributions (<= 0)
    pub fn penalty(&self) -> i32 {
        self.penalty
    }
}

/// One modifier per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub hit: Modifier,
    pub wound: Modifier,
    pub save: Modifier,
    pub movement: Modifier,
    pub charge: Modifier,
    pub pile_in: Modifier,
}

impl Modifiers {
    pub fn get(&self, axis: Axis) -> &Modifier {
        match axis {
            Axis::Hit => &self.hit,
            Axis::Wound => &self.wound,
            Axis::Save => &self.save,
            Axis::Move => &self.movement,
            Axis::Charge => &self.charge,
            Axis::PileIn => &self.pile_in,
        }
    }

    pub fn get_mut(&mut self, axis: Axis) -> &mut Modifier {
        match axis {
            Axis::Hit => &mut self.hit,
            Axis::Wound => &mut self.wound,
            Axis::Save => &mut self.save,
            Axis::Move => &mut self.movement,
            Axis::Charge => &mut self.charge,
            Axis::PileIn => &mut self.pile_in,
        }
    }
}

/// Mutable scratchpad for one evaluation
///
/// Only the fields relevant to the trigger are filled in: a move carries
/// origin, destination and distance; a hit roll carries attacker, defender
/// and weapon.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    pub trigger: Trigger,
    pub attacker: Option<&'a Unit>,
    pub defender: Option<&'a Unit>,
    pub weapon: Option<&'a Weapon>,
    pub is_shooting: bool,
    pub origin: Option<Position>,
    pub destination: Option<Position>,
    pub distance: f64,
    /// Models slain so far by the weapon being resolved
    pub slain_count: u32,
    modifiers: Modifiers,
    blocked: Option<String>,
    notes: Vec<String>,
}

impl<'a> RuleContext<'a> {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            attacker: None,
            defender: None,
            weapon: None,
            is_shooting: false,
            origin: None,
            destination: None,
            distance: 0.0,
            slain_count: 0,
            modifiers: Modifiers::default(),
            blocked: None,
            notes: Vec::new(),
        }
    }

    /// Context for a roll in the attack cascade
    pub fn attack(
        trigger: Trigger,
        attacker: &'a Unit,
        defender: &'a Unit,
        weapon: &'a Weapon,
        is_shooting: bool,
    ) -> Self {
        Self {
            attacker: Some(attacker),
            defender: Some(defender),
            weapon: Some(weapon),
            is_shooting,
            distance: attacker.distance_to(defender),
            ..Self::new(trigger)
        }
    }

    /// Context for a unit repositioning itself (move, run, retreat, pile-in)
    pub fn movement(trigger: Trigger, unit: &'a Unit, destination: Position) -> Self {
        Self {
            attacker: Some(unit),
            origin: Some(unit.position),
            destination: Some(destination),
            distance: unit.position.distance(&destination),
            ..Self::new(trigger)
        }
    }

    /// Context for a unit acting against a target (shoot, charge)
    pub fn targeted(trigger: Trigger, unit: &'a Unit, target: &'a Unit, is_shooting: bool) -> Self {
        Self {
            attacker: Some(unit),
            defender: Some(target),
            is_shooting,
            origin: Some(unit.position),
            destination: Some(target.position),
            distance: unit.distance_to(target),
            ..Self::new(trigger)
        }
    }

    /// Add `delta` to a modifier axis
    pub fn modify(&mut self, axis: Axis, delta: i32) {
        self.modifiers.get_mut(axis).add(delta);
    }

    pub fn modifier(&self, axis: Axis) -> &Modifier {
        self.modifiers.get(axis)
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Block the action. The first block message stands; later blocks in
    /// the same evaluation cannot replace or clear it.
    pub fn block(&mut self, message: impl Into<String>) {
        if self.blocked.is_none() {
            self.blocked = Some(message.into());
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.is_some()
    }

    pub fn block_message(&self) -> Option<&str> {
        self.blocked.as_deref()
    }

    /// Attach a human-readable note (surfaces in combat results and the log)
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn take_notes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_keeps_signs_apart() {
        let mut m = Modifier::default();
        m.add(1);
        m.add(-1);
        m.add(2);
        assert_eq!(m.total(), 2);
        assert_eq!(m.bonus(), 3);
        assert_eq!(m.penalty(), -1);
    }

    #[test]
    fn test_first_block_wins() {
        let mut ctx = RuleContext::new(Trigger::BeforeMove);
        assert!(!ctx.is_blocked());
        ctx.block("impassable");
        ctx.block("something else");
        assert!(ctx.is_blocked());
        assert_eq!(ctx.block_message(), Some("impassable"));
    }

    #[test]
    fn test_modify_axis() {
        let mut ctx = RuleContext::new(Trigger::BeforeHitRoll);
        ctx.modify(Axis::Hit, 1);
        ctx.modify(Axis::Save, -1);
        assert_eq!(ctx.modifier(Axis::Hit).total(), 1);
        assert_eq!(ctx.modifier(Axis::Save).total(), -1);
        assert_eq!(ctx.modifier(Axis::Wound).total(), 0);
    }
}
