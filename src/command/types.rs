//! Commands a player can issue

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::constants::COMMAND_COST;
use crate::core::types::{Position, UnitId};

/// Spell or prayer attempted through a magical intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Invocation {
    Spell { name: String, target: UnitId },
    Prayer { name: String, target: UnitId },
}

/// Every command the engine accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Move { unit: UnitId, destination: Position },
    Run { unit: UnitId, destination: Position },
    Retreat { unit: UnitId, destination: Position },
    Shoot { unit: UnitId, target: UnitId },
    Charge { unit: UnitId, target: UnitId },
    /// Pile in toward the nearest enemy, then fight `target` (or the nearest
    /// engaged enemy)
    PileIn { unit: UnitId, target: Option<UnitId> },
    Fight { unit: UnitId, target: UnitId },
    Cast { unit: UnitId, spell: String, target: UnitId },
    Chant { unit: UnitId, prayer: String, target: UnitId },
    Rally { unit: UnitId },
    MagicalIntervention { unit: UnitId, invocation: Invocation },
    AllOutAttack { unit: UnitId },
    AllOutDefence { unit: UnitId },
    PowerThrough { unit: UnitId, target: UnitId },
    EndPhase,
}

/// Command tag without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Move,
    Run,
    Retreat,
    Shoot,
    Charge,
    PileIn,
    Fight,
    Cast,
    Chant,
    Rally,
    MagicalIntervention,
    AllOutAttack,
    AllOutDefence,
    PowerThrough,
    EndPhase,
}

impl CommandKind {
    /// Command points this command costs
    pub fn cost(&self) -> u32 {
        match self {
            CommandKind::Rally
            | CommandKind::MagicalIntervention
            | CommandKind::AllOutAttack
            | CommandKind::AllOutDefence
            | CommandKind::PowerThrough => COMMAND_COST,
            _ => 0,
        }
    }

    /// Does this command go through the command-point ledger?
    pub fn is_paid(&self) -> bool {
        self.cost() > 0
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::Move => "Move",
            CommandKind::Run => "Run",
            CommandKind::Retreat => "Retreat",
            CommandKind::Shoot => "Shoot",
            CommandKind::Charge => "Charge",
            CommandKind::PileIn => "Pile In",
            CommandKind::Fight => "Fight",
            CommandKind::Cast => "Cast",
            CommandKind::Chant => "Chant",
            CommandKind::Rally => "Rally",
            CommandKind::MagicalIntervention => "Magical Intervention",
            CommandKind::AllOutAttack => "All-out Attack",
            CommandKind::AllOutDefence => "All-out Defence",
            CommandKind::PowerThrough => "Power Through",
            CommandKind::EndPhase => "End Phase",
        };
        f.write_str(name)
    }
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Move { .. } => CommandKind::Move,
            Command::Run { .. } => CommandKind::Run,
            Command::Retreat { .. } => CommandKind::Retreat,
            Command::Shoot { .. } => CommandKind::Shoot,
            Command::Charge { .. } => CommandKind::Charge,
            Command::PileIn { .. } => CommandKind::PileIn,
            Command::Fight { .. } => CommandKind::Fight,
            Command::Cast { .. } => CommandKind::Cast,
            Command::Chant { .. } => CommandKind::Chant,
            Command::Rally { .. } => CommandKind::Rally,
            Command::MagicalIntervention { .. } => CommandKind::MagicalIntervention,
            Command::AllOutAttack { .. } => CommandKind::AllOutAttack,
            Command::AllOutDefence { .. } => CommandKind::AllOutDefence,
            Command::PowerThrough { .. } => CommandKind::PowerThrough,
            Command::EndPhase => CommandKind::EndPhase,
        }
    }

    /// Unit issuing the command, if any
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Command::Move { unit, .. }
            | Command::Run { unit, .. }
            | Command::Retreat { unit, .. }
            | Command::Shoot { unit, .. }
            | Command::Charge { unit, .. }
            | Command::PileIn { unit, .. }
            | Command::Fight { unit, .. }
            | Command::Cast { unit, .. }
            | Command::Chant { unit, .. }
            | Command::Rally { unit }
            | Command::MagicalIntervention { unit, .. }
            | Command::AllOutAttack { unit }
            | Command::AllOutDefence { unit }
            | Command::PowerThrough { unit, .. } => Some(*unit),
            Command::EndPhase => None,
        }
    }

    pub fn is_end_phase(&self) -> bool {
        matches!(self, Command::EndPhase)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { unit, destination }
            | Command::Run { unit, destination }
            | Command::Retreat { unit, destination } => {
                write!(f, "{} {} to {}", self.kind(), unit, destination)
            }
            Command::Shoot { unit, target }
            | Command::Charge { unit, target }
            | Command::Fight { unit, target }
            | Command::PowerThrough { unit, target } => {
                write!(f, "{} {} → {}", self.kind(), unit, target)
            }
            Command::PileIn { unit, target } => match target {
                Some(target) => write!(f, "Pile In {unit} → {target}"),
                None => write!(f, "Pile In {unit}"),
            },
            Command::Cast { unit, spell, target } => write!(f, "Cast {spell} by {unit} on {target}"),
            Command::Chant { unit, prayer, target } => write!(f, "Chant {prayer} by {unit} on {target}"),
            Command::MagicalIntervention { unit, invocation } => match invocation {
                Invocation::Spell { name, target } | Invocation::Prayer { name, target } => {
                    write!(f, "Magical Intervention: {name} by {unit} on {target}")
                }
            },
            Command::Rally { unit } | Command::AllOutAttack { unit } | Command::AllOutDefence { unit } => {
                write!(f, "{} {}", self.kind(), unit)
            }
            Command::EndPhase => f.write_str("End Phase"),
        }
    }
}

/// What an applied command did
///
/// `success == false` is still a legal, applied command: a failed charge roll
/// or an unanswered prayer changes state (flags, ritual points) without
/// achieving its aim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub description: String,
    pub success: bool,
}

impl CommandOutcome {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: true,
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_commands() {
        assert_eq!(CommandKind::Rally.cost(), 1);
        assert_eq!(CommandKind::AllOutAttack.cost(), 1);
        assert_eq!(CommandKind::Move.cost(), 0);
        assert!(!CommandKind::EndPhase.is_paid());
    }

    #[test]
    fn test_kind_and_unit() {
        let cmd = Command::Move {
            unit: UnitId(3),
            destination: Position::new(1.0, 2.0),
        };
        assert_eq!(cmd.kind(), CommandKind::Move);
        assert_eq!(cmd.unit(), Some(UnitId(3)));
        assert_eq!(Command::EndPhase.unit(), None);
    }

    #[test]
    fn test_display() {
        let cmd = Command::Charge {
            unit: UnitId(1),
            target: UnitId(2),
        };
        assert_eq!(cmd.to_string(), "Charge unit#1 → unit#2");
        assert_eq!(CommandKind::AllOutDefence.to_string(), "All-out Defence");
    }
}
