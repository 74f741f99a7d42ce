//! Game configuration with documented constants
//!
//! Every distance and economy number the engine consults lives here, with
//! the boundary rule it is checked against.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::battle::constants::*;
use crate::core::error::ConfigError;

/// Configuration for one game
///
/// Loadable from TOML; missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === STRUCTURE ===
    /// Number of battle rounds before final victory evaluation
    pub battle_rounds: u32,

    // === BOARD ===
    /// Board width in inches (x runs from 0 to width, inclusive)
    pub board_width: f64,

    /// Board height in inches (y runs from 0 to height, inclusive)
    pub board_height: f64,

    // === COMMAND ECONOMY ===
    /// Command points every player receives at the start of each battle round
    pub base_command_points: u32,

    /// Extra points for the player with strictly fewer remaining wounds
    ///
    /// A tie for fewest wounds grants nobody the bonus.
    pub underdog_bonus: u32,

    // === DISTANCES (all checks inclusive, `<=`) ===
    /// Units this close to a living enemy are engaged
    pub engagement_range: f64,

    /// Engagement also needs unobstructed line of sight when set
    ///
    /// Terrain that blocks line of sight then separates units that are
    /// otherwise close enough to fight.
    pub engagement_requires_line_of_sight: bool,

    /// Maximum pile-in move toward the nearest enemy
    pub pile_in_distance: f64,

    /// Closest two units may get (centre to centre)
    ///
    /// Pile-ins and charges stop here instead of overlapping bases.
    pub base_contact_distance: f64,

    /// Maximum distance to a charge target
    pub charge_range: f64,

    /// Models this close to an objective contribute to its control score
    pub objective_range: f64,

    /// Victory points for each objective held at the end of your turn
    pub points_per_objective: u32,

    // === SAFETY ===
    /// Rejected commands allowed in one phase before it is force-ended
    ///
    /// Invalid commands re-prompt the player; this caps a provider that
    /// never produces a valid one. Accepted commands are not counted.
    pub max_prompts_per_phase: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            battle_rounds: DEFAULT_BATTLE_ROUNDS,
            board_width: DEFAULT_BOARD_WIDTH,
            board_height: DEFAULT_BOARD_HEIGHT,
            base_command_points: BASE_COMMAND_POINTS,
            underdog_bonus: UNDERDOG_BONUS,
            engagement_range: ENGAGEMENT_RANGE,
            engagement_requires_line_of_sight: true,
            pile_in_distance: PILE_IN_DISTANCE,
            base_contact_distance: BASE_CONTACT_DISTANCE,
            charge_range: CHARGE_RANGE,
            objective_range: OBJECTIVE_RANGE,
            points_per_objective: POINTS_PER_OBJECTIVE,
            max_prompts_per_phase: MAX_PROMPTS_PER_PHASE,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.battle_rounds == 0 {
            return Err("battle_rounds must be at least 1".into());
        }

        if self.board_width <= 0.0 || self.board_height <= 0.0 {
            return Err(format!(
                "board must have positive size, got {}x{}",
                self.board_width, self.board_height
            ));
        }

        let distances = [
            ("engagement_range", self.engagement_range),
            ("pile_in_distance", self.pile_in_distance),
            ("base_contact_distance", self.base_contact_distance),
            ("charge_range", self.charge_range),
            ("objective_range", self.objective_range),
        ];
        if let Some((name, value)) = distances.iter().find(|(_, v)| *v < 0.0 || v.is_nan()) {
            return Err(format!("{} must be non-negative, got {}", name, value));
        }

        // Base contact inside engagement range, or charges could never engage
        if self.base_contact_distance >= self.engagement_range {
            return Err(format!(
                "base_contact_distance ({}) should be < engagement_range ({})",
                self.base_contact_distance, self.engagement_range
            ));
        }

        if self.max_prompts_per_phase == 0 {
            return Err("max_prompts_per_phase must be at least 1".into());
        }

        Ok(())
    }
}
