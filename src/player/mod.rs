//! Decision providers
//!
//! The engine asks a `Player` for one command at a time and applies it
//! before asking again. Humans, AIs and test scripts all sit behind this
//! trait.

use std::collections::VecDeque;

use crate::command::{Command, CommandKind};
use crate::core::error::CommandError;
use crate::core::types::PlayerId;
use crate::game::phase::Phase;
use crate::game::snapshot::GameSnapshot;

/// Supplies commands for one player
pub trait Player {
    fn name(&self) -> &str;

    /// Next command for `player` in `phase`
    ///
    /// `Some(Command::EndPhase)` and `None` both end the phase.
    fn next_command(&mut self, player: PlayerId, phase: Phase, snapshot: &GameSnapshot) -> Option<Command>;

    /// Called when the engine rejects a command this player issued
    fn on_rejected(&mut self, _command: &Command, _error: &CommandError) {}
}

/// Never does anything; every phase ends at once
#[derive(Debug, Clone, Default)]
pub struct PassivePlayer {
    name: String,
}

impl PassivePlayer {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl Player for PassivePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_command(&mut self, _player: PlayerId, _phase: Phase, _snapshot: &GameSnapshot) -> Option<Command> {
        None
    }
}

/// Replays a fixed queue of commands
///
/// When the command at the front of the queue cannot be issued right now
/// (wrong phase, or another player's turn outside the combat phase) the
/// player ends the phase and keeps the command for later. Magical
/// interventions are only issued on other players' turns. Rejections are
/// recorded for inspection.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    name: String,
    queue: VecDeque<Command>,
    rejections: Vec<(Command, CommandError)>,
}

impl ScriptedPlayer {
    pub fn new(name: &str, commands: Vec<Command>) -> Self {
        Self {
            name: name.to_string(),
            queue: commands.into(),
            rejections: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn rejections(&self) -> &[(Command, CommandError)] {
        &self.rejections
    }
}

impl Player for ScriptedPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_command(&mut self, player: PlayerId, phase: Phase, snapshot: &GameSnapshot) -> Option<Command> {
        let own_turn = snapshot.active_player == Some(player);
        let command = self.queue.front()?;
        let ready = match command.kind() {
            CommandKind::MagicalIntervention => !own_turn,
            _ => own_turn || phase.is_alternating(),
        };
        if ready && phase.allows(command.kind()) {
            self.queue.pop_front()
        } else {
            Some(Command::EndPhase)
        }
    }

    fn on_rejected(&mut self, command: &Command, error: &CommandError) {
        self.rejections.push((command.clone(), error.clone()));
    }
}
