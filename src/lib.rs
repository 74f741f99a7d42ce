//! Warband - deterministic squad battle simulator
//!
//! Units of models fight through battle rounds of six phases. Every dice roll
//! comes from one seeded source, so a seed plus a command sequence replays a
//! battle exactly.

pub mod battle;
pub mod combat;
pub mod command;
pub mod core;
pub mod dice;
pub mod game;
pub mod player;
pub mod rules;
