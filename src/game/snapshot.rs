//! Read-only view of a game handed to decision providers
//!
//! Carries everything a player needs to choose a command and nothing that
//! lets it reach into engine internals (rules, dice, ledgers).

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::battle::units::{ActionFlags, StrikeOrder};
use crate::battle::weapon::Weapon;
use crate::core::types::{PlayerId, Position, Round, UnitId};
use crate::game::phase::Phase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub owner: PlayerId,
    pub name: String,
    pub position: Position,
    pub movement: f64,
    pub save: u8,
    pub models_alive: usize,
    pub models_total: usize,
    pub wounds_remaining: u32,
    pub wounds_max: u32,
    pub weapons: Vec<Weapon>,
    pub strike_order: StrikeOrder,
    pub flags: ActionFlags,
    pub engaged: bool,
    pub spells: Vec<String>,
    pub prayers: Vec<String>,
}

impl UnitSnapshot {
    pub fn distance_to(&self, other: &UnitSnapshot) -> f64 {
        self.position.distance(&other.position)
    }

    /// Longest range among ranged weapons (0 when none)
    pub fn max_range(&self) -> f64 {
        self.weapons.iter().filter(|w| w.is_ranged()).map(|w| w.range).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub command_points: u32,
    pub victory_points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSnapshot {
    pub name: String,
    pub position: Position,
    pub controller: Option<PlayerId>,
}

/// Game state at one decision point. Only living units are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub round: Round,
    pub phase: Phase,
    pub active_player: Option<PlayerId>,
    pub priority_player: Option<PlayerId>,
    pub combat_tier: Option<StrikeOrder>,
    pub players: Vec<PlayerSnapshot>,
    pub units: Vec<UnitSnapshot>,
    pub objectives: Vec<ObjectiveSnapshot>,
}

impl GameSnapshot {
    pub fn unit(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &UnitSnapshot> {
        self.units.iter().filter(move |u| u.owner == player)
    }

    pub fn enemies_of(&self, player: PlayerId) -> impl Iterator<Item = &UnitSnapshot> {
        self.units.iter().filter(move |u| u.owner != player)
    }

    /// Closest enemy of `unit`, lowest id breaking ties
    pub fn nearest_enemy(&self, unit: &UnitSnapshot) -> Option<&UnitSnapshot> {
        self.enemies_of(unit.owner)
            .min_by_key(|enemy| (OrderedFloat(unit.distance_to(enemy)), enemy.id))
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }
}
