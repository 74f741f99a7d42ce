//! The six phases of a turn

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::command::CommandKind;

/// Phase of a player's turn, in the order they are played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Hero,
    Movement,
    Shooting,
    Charge,
    Combat,
    EndOfTurn,
}

impl Phase {
    /// Every phase in turn order
    pub const ALL: [Phase; 6] = [
        Phase::Hero,
        Phase::Movement,
        Phase::Shooting,
        Phase::Charge,
        Phase::Combat,
        Phase::EndOfTurn,
    ];

    /// Can a command of this kind be issued in this phase?
    pub fn allows(&self, kind: CommandKind) -> bool {
        use CommandKind::*;
        match self {
            Phase::Hero => matches!(kind, Cast | Chant | Rally | MagicalIntervention | EndPhase),
            Phase::Movement => matches!(kind, Move | Run | Retreat | EndPhase),
            Phase::Shooting => matches!(kind, Shoot | AllOutAttack | EndPhase),
            Phase::Charge => matches!(kind, Charge | EndPhase),
            Phase::Combat => matches!(kind, PileIn | Fight | AllOutAttack | AllOutDefence | EndPhase),
            Phase::EndOfTurn => matches!(kind, PowerThrough | EndPhase),
        }
    }

    /// Players take turns activating units (combat only)
    pub fn is_alternating(&self) -> bool {
        matches!(self, Phase::Combat)
    }

    /// Following phase, `None` after end of turn
    pub fn next(&self) -> Option<Phase> {
        let index = Phase::ALL.iter().position(|p| p == self)?;
        Phase::ALL.get(index + 1).copied()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Hero => "Hero",
            Phase::Movement => "Movement",
            Phase::Shooting => "Shooting",
            Phase::Charge => "Charge",
            Phase::Combat => "Combat",
            Phase::EndOfTurn => "End of Turn",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert_eq!(Phase::Hero.next(), Some(Phase::Movement));
        assert_eq!(Phase::Combat.next(), Some(Phase::EndOfTurn));
        assert_eq!(Phase::EndOfTurn.next(), None);
    }

    #[test]
    fn test_only_combat_alternates() {
        let alternating: Vec<_> = Phase::ALL.iter().filter(|p| p.is_alternating()).collect();
        assert_eq!(alternating, vec![&Phase::Combat]);
    }

    #[test]
    fn test_allowed_commands() {
        assert!(Phase::Movement.allows(CommandKind::Run));
        assert!(!Phase::Movement.allows(CommandKind::Shoot));
        assert!(Phase::Combat.allows(CommandKind::AllOutDefence));
        assert!(!Phase::Shooting.allows(CommandKind::AllOutDefence));
        for phase in Phase::ALL {
            assert!(phase.allows(CommandKind::EndPhase));
        }
    }
}
