//! Battle constants - all tunable defaults in one place
//!
//! Distances are inches, compared inclusively (`<=`).

// Structure
pub const DEFAULT_BATTLE_ROUNDS: u32 = 5;
pub const DEFAULT_BOARD_WIDTH: f64 = 60.0;
pub const DEFAULT_BOARD_HEIGHT: f64 = 44.0;

// Command economy
pub const BASE_COMMAND_POINTS: u32 = 4;
pub const UNDERDOG_BONUS: u32 = 1;
pub const COMMAND_COST: u32 = 1;

// Distances
pub const ENGAGEMENT_RANGE: f64 = 3.0;
pub const PILE_IN_DISTANCE: f64 = 3.0;
pub const BASE_CONTACT_DISTANCE: f64 = 1.0;
pub const CHARGE_RANGE: f64 = 12.0;
pub const OBJECTIVE_RANGE: f64 = 3.0;

// Scoring
pub const POINTS_PER_OBJECTIVE: u32 = 1;

// Dice thresholds
pub const RALLY_DICE: usize = 6;
pub const RALLY_SUCCESS: u8 = 4;
pub const INTERVENTION_PENALTY: i32 = -1;

// Safety valve for decision providers
pub const MAX_PROMPTS_PER_PHASE: u32 = 256;
