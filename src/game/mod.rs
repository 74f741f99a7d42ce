//! Game session - state, command application and the battle round loop
//!
//! `Game` owns one battle. Command handlers live in their own files as
//! `impl Game` blocks grouped by phase.

mod abilities;
mod attacks;
mod combat_phase;
pub mod log;
mod magic;
mod movement;
pub mod phase;
pub mod snapshot;
pub mod state;
mod turn;
pub mod victory;

// Re-exports for convenient access
pub use log::BattleLog;
pub use phase::Phase;
pub use snapshot::{GameSnapshot, ObjectiveSnapshot, PlayerSnapshot, UnitSnapshot};
pub use state::{Controller, Dice, Game, PlayerSlot};
pub use victory::{BattleOutcome, VictoryReason};
