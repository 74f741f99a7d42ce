//! Engagement detection between units
//!
//! A unit is engaged while a living enemy is within engagement range and,
//! when the config asks for it, visible. Engaged units must fight and may
//! not make normal moves or shoot.

use ordered_float::OrderedFloat;

use crate::battle::board::Board;
use crate::battle::units::Unit;
use crate::core::config::GameConfig;
use crate::core::types::Position;

/// Are these two units close enough (and visible) to fight each other?
pub fn in_engagement(a: &Unit, b: &Unit, board: &Board, config: &GameConfig) -> bool {
    if a.owner == b.owner || a.is_destroyed() || b.is_destroyed() {
        return false;
    }

    if a.distance_to(b) > config.engagement_range {
        return false;
    }

    !config.engagement_requires_line_of_sight || board.has_line_of_sight(&a.position, &b.position)
}

/// Is `unit` engaged with any enemy?
pub fn is_engaged(unit: &Unit, units: &[Unit], board: &Board, config: &GameConfig) -> bool {
    units.iter().any(|other| in_engagement(unit, other, board, config))
}

/// All enemies `unit` is engaged with
pub fn engaged_enemies<'a>(
    unit: &Unit,
    units: &'a [Unit],
    board: &Board,
    config: &GameConfig,
) -> Vec<&'a Unit> {
    units
        .iter()
        .filter(|other| in_engagement(unit, other, board, config))
        .collect()
}

/// Closest living enemy, lowest id breaking ties
pub fn nearest_enemy<'a>(unit: &Unit, units: &'a [Unit]) -> Option<&'a Unit> {
    units
        .iter()
        .filter(|other| other.owner != unit.owner && other.is_alive())
        .min_by_key(|other| (OrderedFloat(unit.distance_to(other)), other.id))
}

/// Does any living enemy of `unit` sit within `range` of `position`?
pub fn enemy_within(unit: &Unit, position: &Position, units: &[Unit], range: f64) -> bool {
    units
        .iter()
        .filter(|other| other.owner != unit.owner && other.is_alive())
        .any(|other| other.position.distance(position) <= range)
}
