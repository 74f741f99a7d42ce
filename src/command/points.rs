//! Command-point ledger
//!
//! Each player gets a fresh allotment every battle round. Within a phase an
//! army may use each paid command once, and each unit may receive one paid
//! command. The balance carries over between phases of the same round.

use ahash::AHashSet;

use crate::command::types::CommandKind;
use crate::core::error::CommandError;
use crate::core::types::{PlayerId, UnitId};

/// One player's command points and per-phase usage
#[derive(Debug, Clone, Default)]
pub struct CommandTracker {
    points: u32,
    used_commands: AHashSet<CommandKind>,
    units_commanded: AHashSet<UnitId>,
}

impl CommandTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a battle round with `base + bonus` points
    pub fn init_round(&mut self, base: u32, bonus: u32) {
        self.points = base + bonus;
        self.reset_phase();
    }

    /// Forget which commands and units were used. The balance is kept.
    pub fn reset_phase(&mut self) {
        self.used_commands.clear();
        self.units_commanded.clear();
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn has_used(&self, kind: CommandKind) -> bool {
        self.used_commands.contains(&kind)
    }

    pub fn has_commanded(&self, unit: UnitId) -> bool {
        self.units_commanded.contains(&unit)
    }

    /// Could `kind` be spent on `unit` right now?
    ///
    /// Checked in order: balance, army-wide reuse, unit reuse. The first
    /// failing check is the one reported.
    pub fn check(&self, kind: CommandKind, unit: Option<UnitId>) -> Result<(), CommandError> {
        let needed = kind.cost();
        if self.points < needed {
            return Err(CommandError::InsufficientPoints {
                needed,
                available: self.points,
            });
        }
        if self.has_used(kind) {
            return Err(CommandError::CommandAlreadyUsed(kind));
        }
        if let Some(unit) = unit {
            if self.has_commanded(unit) {
                return Err(CommandError::UnitAlreadyCommanded(unit));
            }
        }
        Ok(())
    }

    /// Spend `kind` on `unit`, or leave the ledger untouched on error
    pub fn spend(&mut self, kind: CommandKind, unit: Option<UnitId>) -> Result<(), CommandError> {
        self.check(kind, unit)?;
        self.points -= kind.cost();
        self.used_commands.insert(kind);
        if let Some(unit) = unit {
            self.units_commanded.insert(unit);
        }
        Ok(())
    }
}

/// Player with strictly the fewest remaining wounds, if there is one
///
/// A tie for fewest means nobody is the underdog.
pub fn underdog(wounds: &[(PlayerId, u32)]) -> Option<PlayerId> {
    let fewest = wounds.iter().map(|(_, w)| *w).min()?;
    let mut at_fewest = wounds.iter().filter(|(_, w)| *w == fewest);
    let (player, _) = at_fewest.next()?;
    if at_fewest.next().is_some() {
        return None;
    }
    Some(*player)
}
