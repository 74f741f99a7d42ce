//! Trigger points and rule sources

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instant in the resolution flow where rules are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    BeforeMove,
    BeforeShoot,
    BeforeCharge,
    BeforePileIn,
    BeforeHitRoll,
    BeforeWoundRoll,
    BeforeSaveRoll,
    OnModelSlain,
    OnUnitDestroyed,
    AfterCombatResolve,
}

impl Trigger {
    pub const ALL: [Trigger; 10] = [
        Trigger::BeforeMove,
        Trigger::BeforeShoot,
        Trigger::BeforeCharge,
        Trigger::BeforePileIn,
        Trigger::BeforeHitRoll,
        Trigger::BeforeWoundRoll,
        Trigger::BeforeSaveRoll,
        Trigger::OnModelSlain,
        Trigger::OnUnitDestroyed,
        Trigger::AfterCombatResolve,
    ];
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::BeforeMove => "before-move",
            Trigger::BeforeShoot => "before-shoot",
            Trigger::BeforeCharge => "before-charge",
            Trigger::BeforePileIn => "before-pile-in",
            Trigger::BeforeHitRoll => "before-hit-roll",
            Trigger::BeforeWoundRoll => "before-wound-roll",
            Trigger::BeforeSaveRoll => "before-save-roll",
            Trigger::OnModelSlain => "on-model-slain",
            Trigger::OnUnitDestroyed => "on-unit-destroyed",
            Trigger::AfterCombatResolve => "after-combat-resolve",
        };
        f.write_str(name)
    }
}

/// Where a rule came from, which decides when it expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleSource {
    /// Army-wide or battlefield-wide rules, present all game
    Global,
    /// Registered with a terrain piece
    Terrain,
    /// Granted by spending a command point; expires at end of phase
    Command,
    /// Granted by a spell or prayer; expires at end of turn
    Spell,
}
