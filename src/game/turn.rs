//! Battle round loop
//!
//! Round: priority roll-off, then one turn per player starting with the
//! priority winner. Turn: the six phases in order. Non-alternating phases
//! prompt the active player until it ends the phase.

use tracing::{info, warn};

use crate::core::error::GameError;
use crate::core::types::PlayerId;
use crate::dice::DiceRoller;
use crate::game::phase::Phase;
use crate::game::state::Game;
use crate::game::victory::BattleOutcome;

impl Game {
    /// Play the whole battle
    ///
    /// Stops early when an army is wiped out; otherwise the battle is
    /// decided on victory points after the last round.
    pub fn run(&mut self) -> Result<BattleOutcome, GameError> {
        if self.players.len() < 2 {
            let count = self.players.len();
            self.log.push(format!("Cannot start: {count} player(s) registered, at least 2 required"));
            warn!(players = count, "not enough players to start a battle");
            return Err(GameError::NotEnoughPlayers(count));
        }

        info!(
            players = self.players.len(),
            units = self.units.len(),
            rounds = self.config.battle_rounds,
            "battle starting"
        );
        if let Some(outcome) = self.check_victory() {
            return Ok(outcome);
        }

        for round in 1..=self.config.battle_rounds {
            self.init_round(round);
            let first = self.roll_priority();
            for player in self.turn_order(first) {
                self.play_turn(player);
                if let Some(outcome) = self.outcome {
                    return Ok(outcome);
                }
            }
        }

        Ok(self.decide_on_points())
    }

    /// Every player rolls a D6; tied top rollers roll again until one wins
    pub fn roll_priority(&mut self) -> PlayerId {
        let mut contenders: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();

        loop {
            let rolls: Vec<(PlayerId, u8)> = contenders.iter().map(|&p| (p, self.dice.d6())).collect();
            let best = rolls.iter().map(|(_, r)| *r).max().unwrap_or(0);
            let summary: Vec<String> = rolls
                .iter()
                .map(|(p, r)| format!("{} {r}", self.player_name(*p)))
                .collect();
            self.log.push(format!("Priority roll: {}", summary.join(", ")));

            contenders = rolls.iter().filter(|(_, r)| *r == best).map(|(p, _)| *p).collect();
            if contenders.len() <= 1 {
                break;
            }
            self.log.push("Priority tied, rolling again");
        }

        let winner = contenders.first().copied().unwrap_or(PlayerId(0));
        self.priority = Some(winner);
        self.log.push(format!("{} has priority", self.player_name(winner)));
        info!(round = self.round, player = %winner, "priority won");
        winner
    }

    /// `first`, then everyone else in registration order, wrapping
    pub(crate) fn turn_order(&self, first: PlayerId) -> Vec<PlayerId> {
        let count = self.players.len() as u32;
        if count == 0 {
            return Vec::new();
        }
        (0..count).map(|i| PlayerId((first.0 + i) % count)).collect()
    }

    /// One player's turn through all six phases
    pub fn play_turn(&mut self, player: PlayerId) {
        self.start_turn(player);

        for phase in Phase::ALL {
            self.begin_phase(phase);
            if phase.is_alternating() {
                self.run_combat_phase();
            } else {
                self.run_prompt_phase(player);
                if phase == Phase::Hero {
                    self.run_reaction_window(player);
                }
            }

            if self.is_over() {
                return;
            }
            self.end_phase();
        }
    }

    /// Other players may answer the Hero phase with magical interventions
    fn run_reaction_window(&mut self, active: PlayerId) {
        let first = self.priority.unwrap_or(active);
        let responders: Vec<PlayerId> = self
            .turn_order(first)
            .into_iter()
            .filter(|&p| p != active)
            .collect();

        for responder in responders {
            if self.is_over() {
                break;
            }
            self.acting = Some(responder);
            self.run_prompt_phase(responder);
        }
        self.acting = self.active;
    }

    /// Prompt `player` until it ends the phase
    ///
    /// Rejected commands are reported back and the player is asked again.
    /// Only rejections count toward the configured prompt limit.
    pub(crate) fn run_prompt_phase(&mut self, player: PlayerId) {
        let mut rejections = 0;
        while rejections < self.config.max_prompts_per_phase {
            if self.is_over() {
                return;
            }
            let Some(command) = self.ask(player) else {
                return;
            };
            if command.is_end_phase() {
                return;
            }
            if let Err(err) = self.execute(player, command.clone()) {
                self.notify_rejected(player, &command, &err);
                rejections += 1;
            }
        }

        let phase = self.phase;
        self.log.push(format!(
            "{} reached the prompt limit, the {phase} phase ends",
            self.player_name(player)
        ));
        warn!(player = %player, %phase, "prompt limit reached");
    }
}
