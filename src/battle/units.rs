//! Unit hierarchy: Model → Unit
//!
//! Models are the physical bodies on the table. A unit owns its models,
//! weapons and per-turn state. Units are never removed from a game:
//! "destroyed" just means no model is left alive.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::magic::{Prayer, Spell};
use crate::battle::weapon::Weapon;
use crate::core::types::{PlayerId, Position, UnitId};

/// Spacing between models when a unit is first set up
const MODEL_SPACING: f64 = 1.0;

/// Characteristics shared by every model in a unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Move characteristic in inches
    pub movement: f64,
    /// Save roll needed (lower is better)
    pub save: u8,
    /// Control characteristic per model, used for objectives
    pub control: u32,
    /// Wounds per model
    pub health: u32,
}

impl Stats {
    pub fn new(movement: f64, save: u8, control: u32, health: u32) -> Self {
        Self {
            movement,
            save,
            control,
            health,
        }
    }
}

/// Sub-pass of the combat phase in which a unit fights
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum StrikeOrder {
    StrikeFirst,
    #[default]
    Normal,
    StrikeLast,
}

impl StrikeOrder {
    /// Tiers in the order they are fought
    pub const ALL: [StrikeOrder; 3] = [
        StrikeOrder::StrikeFirst,
        StrikeOrder::Normal,
        StrikeOrder::StrikeLast,
    ];
}

impl fmt::Display for StrikeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrikeOrder::StrikeFirst => "strike-first",
            StrikeOrder::Normal => "normal",
            StrikeOrder::StrikeLast => "strike-last",
        };
        f.write_str(name)
    }
}

/// What a unit has done this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionFlags {
    pub moved: bool,
    pub ran: bool,
    pub retreated: bool,
    pub shot: bool,
    pub fought: bool,
    pub charged: bool,
    pub piled_in: bool,
}

/// Spellcasting and prayer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MagicState {
    /// Spells attempted this turn
    pub casts: u32,
    /// Prayers attempted this turn
    pub chants: u32,
    /// Banked prayer points, kept across turns until spent or lost
    pub ritual_points: u32,
    /// Set by a miscast; no further casting this turn
    pub miscast: bool,
}

/// A single model in a unit
///
/// Invariant: `current_wounds <= max_wounds`, and a model with
/// `current_wounds == 0` is not alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub position: Position,
    pub current_wounds: u32,
    pub max_wounds: u32,
    pub alive: bool,
    /// Base diameter in inches
    pub base_size: f64,
}

impl Model {
    pub fn new(position: Position, wounds: u32) -> Self {
        Self {
            position,
            current_wounds: wounds,
            max_wounds: wounds,
            alive: wounds > 0,
            base_size: 1.0,
        }
    }

    /// Remove up to `amount` wounds, returning how many were taken
    fn take(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.current_wounds);
        self.current_wounds -= taken;
        if self.current_wounds == 0 {
            self.alive = false;
        }
        taken
    }
}

/// Outcome of allocating damage to a unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageApplied {
    /// Wounds actually removed
    pub dealt: u32,
    /// Indices of models slain, in the order they fell
    pub slain: Vec<usize>,
    /// The unit has no living models left
    pub destroyed: bool,
}

/// A unit of models fighting together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub name: String,
    pub models: Vec<Model>,
    pub weapons: Vec<Weapon>,
    pub stats: Stats,
    pub ward: Option<u8>,
    pub strike_order: StrikeOrder,

    // Position (anchor the models are laid out around)
    pub position: Position,

    // State
    pub flags: ActionFlags,
    pub magic: MagicState,

    // Magic
    /// Spells this unit may attempt per turn (0 = not a wizard)
    pub wizard: u32,
    /// Prayers this unit may attempt per turn (0 = not a priest)
    pub priest: u32,
    pub spells: Vec<Spell>,
    pub prayers: Vec<Prayer>,
}

impl Unit {
    /// Create a unit with `model_count` models laid out in a row centred
    /// on `position`
    pub fn new(
        id: UnitId,
        owner: PlayerId,
        name: &str,
        stats: Stats,
        model_count: usize,
        position: Position,
    ) -> Self {
        let offset = (model_count.saturating_sub(1)) as f64 * MODEL_SPACING / 2.0;
        let models = (0..model_count)
            .map(|i| {
                let at = Position::new(position.x - offset + i as f64 * MODEL_SPACING, position.y);
                Model::new(at, stats.health)
            })
            .collect();

        Self {
            id,
            owner,
            name: name.to_string(),
            models,
            weapons: Vec::new(),
            stats,
            ward: None,
            strike_order: StrikeOrder::default(),
            position,
            flags: ActionFlags::default(),
            magic: MagicState::default(),
            wizard: 0,
            priest: 0,
            spells: Vec::new(),
            prayers: Vec::new(),
        }
    }

    /// Builder: add a weapon
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapons.push(weapon);
        self
    }

    /// Builder: set a ward save
    pub fn with_ward(mut self, ward: u8) -> Self {
        self.ward = Some(ward);
        self
    }

    /// Builder: set the strike order
    pub fn with_strike_order(mut self, strike_order: StrikeOrder) -> Self {
        self.strike_order = strike_order;
        self
    }

    /// Builder: make the unit a wizard knowing `spells`
    pub fn with_spells(mut self, casts: u32, spells: Vec<Spell>) -> Self {
        self.wizard = casts;
        self.spells = spells;
        self
    }

    /// Builder: make the unit a priest knowing `prayers`
    pub fn with_prayers(mut self, chants: u32, prayers: Vec<Prayer>) -> Self {
        self.priest = chants;
        self.prayers = prayers;
        self
    }

    /// Number of living models
    pub fn living_models(&self) -> usize {
        self.models.iter().filter(|m| m.alive).count()
    }

    /// Is this unit destroyed? (no living models)
    pub fn is_destroyed(&self) -> bool {
        self.living_models() == 0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_destroyed()
    }

    /// Wounds left across living models
    pub fn remaining_wounds(&self) -> u32 {
        self.models
            .iter()
            .filter(|m| m.alive)
            .map(|m| m.current_wounds)
            .sum()
    }

    /// Wounds of the unit at full strength
    pub fn max_wounds(&self) -> u32 {
        self.models.iter().map(|m| m.max_wounds).sum()
    }

    pub fn melee_weapons(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons.iter().filter(|w| w.is_melee())
    }

    pub fn ranged_weapons(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons.iter().filter(|w| w.is_ranged())
    }

    pub fn spell(&self, name: &str) -> Option<&Spell> {
        self.spells.iter().find(|s| s.name == name)
    }

    pub fn prayer(&self, name: &str) -> Option<&Prayer> {
        self.prayers.iter().find(|p| p.name == name)
    }

    /// Distance between unit anchors
    pub fn distance_to(&self, other: &Unit) -> f64 {
        self.position.distance(&other.position)
    }

    /// Move the unit; every model keeps its offset from the anchor
    pub fn move_to(&mut self, destination: Position) {
        let delta = destination - self.position;
        for model in &mut self.models {
            model.position = model.position + delta;
        }
        self.position = destination;
    }

    /// Clear per-turn action flags and spell counters
    ///
    /// Ritual points survive: they bank across turns.
    pub fn reset_turn(&mut self) {
        self.flags = ActionFlags::default();
        self.magic.casts = 0;
        self.magic.chants = 0;
        self.magic.miscast = false;
    }

    /// Allocate `amount` damage one wound at a time to the first living
    /// model in list order; overflow carries to the next living model.
    ///
    /// Damage beyond the last living model is discarded.
    pub fn take_damage(&mut self, amount: u32) -> DamageApplied {
        let mut applied = DamageApplied::default();
        let mut remaining = amount;

        while remaining > 0 {
            let Some(index) = self.models.iter().position(|m| m.alive) else {
                break;
            };
            let model = &mut self.models[index];
            let taken = model.take(remaining);
            remaining -= taken;
            applied.dealt += taken;
            if !model.alive {
                applied.slain.push(index);
            }
        }

        applied.destroyed = self.is_destroyed();
        applied
    }

    /// Spend `points` restoring wounds: damaged living models first, then
    /// slain models (each costs its full wounds and returns at full health).
    ///
    /// Returns (wounds healed, models returned).
    pub fn restore(&mut self, points: u32) -> (u32, u32) {
        let mut remaining = points;
        let mut healed = 0;
        let mut returned = 0;

        for model in self.models.iter_mut().filter(|m| m.alive) {
            let missing = model.max_wounds - model.current_wounds;
            let heal = missing.min(remaining);
            model.current_wounds += heal;
            healed += heal;
            remaining -= heal;
        }

        for model in self.models.iter_mut().filter(|m| !m.alive) {
            if model.max_wounds == 0 || model.max_wounds > remaining {
                continue;
            }
            remaining -= model.max_wounds;
            model.current_wounds = model.max_wounds;
            model.alive = true;
            returned += 1;
        }

        (healed, returned)
    }
}
