//! Commands and the command-point economy
//!
//! `Command` is the closed set of orders a player can give. Paid commands
//! (rally, all-out attack, ...) also go through a `CommandTracker`.

pub mod points;
pub mod types;

pub use points::{underdog, CommandTracker};
pub use types::{Command, CommandKind, CommandOutcome, Invocation};
