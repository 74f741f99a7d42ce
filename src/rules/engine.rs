//! Rule registry and evaluation
//!
//! Rules are stored per trigger in registration order and evaluated in that
//! order. Nothing is re-sorted: since modifiers are additive, order only
//! decides whose block message wins.

use ahash::AHashMap;
use std::fmt;

use crate::rules::context::{Axis, RuleContext};
use crate::rules::trigger::{RuleSource, Trigger};

type Condition = Box<dyn Fn(&RuleContext<'_>) -> bool + Send + Sync>;
type Effect = Box<dyn Fn(&mut RuleContext<'_>) + Send + Sync>;

/// A named, triggerable effect
pub struct Rule {
    pub name: String,
    pub trigger: Trigger,
    pub source: RuleSource,
    condition: Option<Condition>,
    effect: Effect,
}

impl Rule {
    pub fn new<F>(name: &str, trigger: Trigger, source: RuleSource, effect: F) -> Self
    where
        F: Fn(&mut RuleContext<'_>) + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            trigger,
            source,
            condition: None,
            effect: Box::new(effect),
        }
    }

    /// Rule that adds `delta` to one modifier axis
    pub fn modifier(name: &str, trigger: Trigger, source: RuleSource, axis: Axis, delta: i32) -> Self {
        Self::new(name, trigger, source, move |ctx| ctx.modify(axis, delta))
    }

    /// Rule that blocks the action with `message`
    pub fn blocker(name: &str, trigger: Trigger, source: RuleSource, message: &str) -> Self {
        let message = message.to_string();
        Self::new(name, trigger, source, move |ctx| ctx.block(message.clone()))
    }

    /// Builder: only apply when `condition` holds
    pub fn when<C>(mut self, condition: C) -> Self
    where
        C: Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Is the rule enabled for this context?
    pub fn is_enabled(&self, ctx: &RuleContext<'_>) -> bool {
        self.condition.as_ref().map_or(true, |condition| condition(ctx))
    }

    pub fn apply(&self, ctx: &mut RuleContext<'_>) {
        (self.effect)(ctx);
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("source", &self.source)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// Registry of rules for one game
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: AHashMap<Trigger, Vec<Rule>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule under its trigger. Duplicate names coexist.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.entry(rule.trigger).or_default().push(rule);
    }

    /// Apply every enabled rule for `trigger`, in registration order
    ///
    /// A rule that blocks does not stop later rules; the block itself can
    /// never be lifted within the evaluation. Returns how many rules applied.
    pub fn evaluate(&self, trigger: Trigger, ctx: &mut RuleContext<'_>) -> usize {
        let Some(rules) = self.rules.get(&trigger) else {
            return 0;
        };

        let mut applied = 0;
        for rule in rules {
            if rule.is_enabled(ctx) {
                rule.apply(ctx);
                applied += 1;
            }
        }
        applied
    }

    /// Strip every rule from `source` whose name contains `name_filter`
    /// (an empty filter matches all). Returns how many were removed.
    pub fn remove_rules_by_source(&mut self, source: RuleSource, name_filter: &str) -> usize {
        let mut removed = 0;
        for rules in self.rules.values_mut() {
            let before = rules.len();
            rules.retain(|rule| {
                !(rule.source == source && (name_filter.is_empty() || rule.name.contains(name_filter)))
            });
            removed += before - rules.len();
        }
        removed
    }

    pub fn has_rules_for(&self, trigger: Trigger) -> bool {
        self.rules.get(&trigger).is_some_and(|rules| !rules.is_empty())
    }

    /// Names of the rules registered for `trigger`, in evaluation order
    pub fn rules_for(&self, trigger: Trigger) -> Vec<&str> {
        self.rules
            .get(&trigger)
            .map(|rules| rules.iter().map(|r| r.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Total registered rules
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_engine() {
        let engine = RuleEngine::new();
        assert!(engine.is_empty());
        assert!(!engine.has_rules_for(Trigger::BeforeHitRoll));
        let mut ctx = RuleContext::new(Trigger::BeforeHitRoll);
        assert_eq!(engine.evaluate(Trigger::BeforeHitRoll, &mut ctx), 0);
    }

    #[test]
    fn test_modifiers_are_additive() {
        let mut engine = RuleEngine::new();
        engine.add_rule(Rule::modifier("a", Trigger::BeforeHitRoll, RuleSource::Global, Axis::Hit, 1));
        engine.add_rule(Rule::modifier("b", Trigger::BeforeHitRoll, RuleSource::Terrain, Axis::Hit, -1));
        engine.add_rule(Rule::modifier("c", Trigger::BeforeHitRoll, RuleSource::Command, Axis::Hit, 1));

        let mut ctx = RuleContext::new(Trigger::BeforeHitRoll);
        assert_eq!(engine.evaluate(Trigger::BeforeHitRoll, &mut ctx), 3);
        assert_eq!(ctx.modifier(Axis::Hit).total(), 1);
        assert_eq!(ctx.modifier(Axis::Hit).bonus(), 2);
        assert_eq!(ctx.modifier(Axis::Hit).penalty(), -1);
    }

    #[test]
    fn test_only_matching_trigger_runs() {
        let mut engine = RuleEngine::new();
        engine.add_rule(Rule::modifier("save", Trigger::BeforeSaveRoll, RuleSource::Global, Axis::Save, 1));

        let mut ctx = RuleContext::new(Trigger::BeforeHitRoll);
        engine.evaluate(Trigger::BeforeHitRoll, &mut ctx);
        assert_eq!(ctx.modifier(Axis::Save).total(), 0);
    }

    #[test]
    fn test_condition_gates_rule() {
        let mut engine = RuleEngine::new();
        engine.add_rule(
            Rule::modifier("shooting only", Trigger::BeforeHitRoll, RuleSource::Global, Axis::Hit, -1)
                .when(|ctx| ctx.is_shooting),
        );

        let mut melee = RuleContext::new(Trigger::BeforeHitRoll);
        assert_eq!(engine.evaluate(Trigger::BeforeHitRoll, &mut melee), 0);

        let mut ranged = RuleContext::new(Trigger::BeforeHitRoll);
        ranged.is_shooting = true;
        assert_eq!(engine.evaluate(Trigger::BeforeHitRoll, &mut ranged), 1);
        assert_eq!(ranged.modifier(Axis::Hit).total(), -1);
    }

    #[test]
    fn test_block_does_not_stop_later_rules() {
        let mut engine = RuleEngine::new();
        engine.add_rule(Rule::blocker("wall", Trigger::BeforeMove, RuleSource::Terrain, "wall in the way"));
        engine.add_rule(Rule::modifier("haste", Trigger::BeforeMove, RuleSource::Spell, Axis::Move, 2));
        engine.add_rule(Rule::blocker("river", Trigger::BeforeMove, RuleSource::Terrain, "river"));

        let mut ctx = RuleContext::new(Trigger::BeforeMove);
        engine.evaluate(Trigger::BeforeMove, &mut ctx);
        assert!(ctx.is_blocked());
        assert_eq!(ctx.block_message(), Some("wall in the way"));
        assert_eq!(ctx.modifier(Axis::Move).total(), 2);
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut engine = RuleEngine::new();
        for name in ["first", "second", "third"] {
            engine.add_rule(Rule::modifier(name, Trigger::BeforeCharge, RuleSource::Global, Axis::Charge, 1));
        }
        assert_eq!(engine.rules_for(Trigger::BeforeCharge), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_duplicate_names_coexist() {
        let mut engine = RuleEngine::new();
        engine.add_rule(Rule::modifier("dup", Trigger::BeforeHitRoll, RuleSource::Global, Axis::Hit, 1));
        engine.add_rule(Rule::modifier("dup", Trigger::BeforeHitRoll, RuleSource::Global, Axis::Hit, 1));
        assert_eq!(engine.len(), 2);

        let mut ctx = RuleContext::new(Trigger::BeforeHitRoll);
        engine.evaluate(Trigger::BeforeHitRoll, &mut ctx);
        assert_eq!(ctx.modifier(Axis::Hit).total(), 2);
    }

    #[test]
    fn test_remove_by_source() {
        let mut engine = RuleEngine::new();
        engine.add_rule(Rule::modifier("all-out-attack:unit#1", Trigger::BeforeHitRoll, RuleSource::Command, Axis::Hit, 1));
        engine.add_rule(Rule::modifier("all-out-defence:unit#2", Trigger::BeforeSaveRoll, RuleSource::Command, Axis::Save, 1));
        engine.add_rule(Rule::modifier("cover", Trigger::BeforeSaveRoll, RuleSource::Terrain, Axis::Save, 1));

        assert_eq!(engine.remove_rules_by_source(RuleSource::Command, "attack"), 1);
        assert_eq!(engine.len(), 2);

        assert_eq!(engine.remove_rules_by_source(RuleSource::Command, ""), 1);
        assert_eq!(engine.len(), 1);
        assert!(!engine.has_rules_for(Trigger::BeforeHitRoll));
        assert!(engine.has_rules_for(Trigger::BeforeSaveRoll));
    }
}
