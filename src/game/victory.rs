//! Objective control and victory conditions

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::core::types::PlayerId;
use crate::game::state::Game;

/// Why a player won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryReason {
    /// Every other army was wiped out
    Annihilation,
    /// Most victory points after the last battle round
    VictoryPoints,
}

/// How a battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory { winner: PlayerId, reason: VictoryReason },
    Draw,
}

impl BattleOutcome {
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            BattleOutcome::Victory { winner, .. } => Some(*winner),
            BattleOutcome::Draw => None,
        }
    }
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::Victory { winner, reason: VictoryReason::Annihilation } => {
                write!(f, "{winner} wins by annihilation")
            }
            BattleOutcome::Victory { winner, reason: VictoryReason::VictoryPoints } => {
                write!(f, "{winner} wins on victory points")
            }
            BattleOutcome::Draw => write!(f, "draw"),
        }
    }
}

impl Game {
    /// Update objective control, then pay the active player for each
    /// objective they hold
    pub(crate) fn score_objectives(&mut self) {
        let range = self.config.objective_range;

        for index in 0..self.board.objectives.len() {
            let position = self.board.objectives[index].position;
            let mut control: AHashMap<PlayerId, u32> = AHashMap::new();
            for unit in self.units.iter().filter(|u| u.is_alive()) {
                let near = unit
                    .models
                    .iter()
                    .filter(|m| m.alive && m.position.distance(&position) <= range)
                    .count() as u32;
                if near > 0 {
                    *control.entry(unit.owner).or_insert(0) += near * unit.stats.control;
                }
            }

            let best = control.values().copied().max().unwrap_or(0);
            let mut leaders = control.iter().filter(|&(_, &c)| c == best && best > 0);
            let leader = match (leaders.next(), leaders.next()) {
                (Some((&player, _)), None) => Some(player),
                _ => None,
            };

            let objective = &mut self.board.objectives[index];
            if let Some(player) = leader {
                if objective.controller != Some(player) {
                    objective.controller = Some(player);
                    let line = format!("{} seizes {}", self.player_name(player), self.board.objectives[index].name);
                    self.log.push(line);
                }
            }
        }

        let Some(active) = self.active else {
            return;
        };
        let held = self
            .board
            .objectives
            .iter()
            .filter(|o| o.controller == Some(active))
            .count() as u32;
        if held > 0 {
            let points = held * self.config.points_per_objective;
            self.players[active.index()].victory_points += points;
            self.log.push(format!(
                "{} scores {points} victory point(s) for {held} objective(s)",
                self.player_name(active)
            ));
        }
    }

    /// Players with at least one living unit, in registration order
    fn surviving_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .map(|p| p.id)
            .filter(|&id| self.units.iter().any(|u| u.owner == id && u.is_alive()))
            .collect()
    }

    /// End the game early if at most one army is left standing
    pub(crate) fn check_victory(&mut self) -> Option<BattleOutcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }
        let survivors = self.surviving_players();
        let outcome = match survivors.as_slice() {
            [] => BattleOutcome::Draw,
            [winner] => BattleOutcome::Victory {
                winner: *winner,
                reason: VictoryReason::Annihilation,
            },
            _ => return None,
        };
        self.finish(outcome);
        Some(outcome)
    }

    /// Decide the battle on victory points after the final round
    pub(crate) fn decide_on_points(&mut self) -> BattleOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let best = self.players.iter().map(|p| p.victory_points).max().unwrap_or(0);
        let mut leaders = self.players.iter().filter(|p| p.victory_points == best);
        let outcome = match (leaders.next(), leaders.next()) {
            (Some(slot), None) => BattleOutcome::Victory {
                winner: slot.id,
                reason: VictoryReason::VictoryPoints,
            },
            _ => BattleOutcome::Draw,
        };
        self.finish(outcome);
        outcome
    }

    fn finish(&mut self, outcome: BattleOutcome) {
        let line = match outcome {
            BattleOutcome::Victory { winner, reason } => {
                let how = match reason {
                    VictoryReason::Annihilation => "annihilation",
                    VictoryReason::VictoryPoints => "victory points",
                };
                format!("=== {} wins by {how} ===", self.player_name(winner))
            }
            BattleOutcome::Draw => "=== The battle is a draw ===".to_string(),
        };
        self.log.push(line);
        info!(round = self.round, %outcome, "battle over");
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::board::Objective;
    use crate::battle::units::{Stats, Unit};
    use crate::core::config::GameConfig;
    use crate::core::types::{Position, UnitId};
    use crate::game::phase::Phase;
    use crate::player::PassivePlayer;

    fn game_with_players() -> Game {
        let mut game = Game::new(GameConfig::default(), 5).unwrap();
        game.add_player("Red", Box::new(PassivePlayer::new("Red")));
        game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
        game
    }

    fn squad(owner: u32, models: usize, control: u32, x: f64) -> Unit {
        Unit::new(UnitId(0), PlayerId(owner), "Squad", Stats::new(5.0, 4, control, 1), models, Position::new(x, 20.0))
    }

    #[test]
    fn test_highest_control_takes_objective() {
        let mut game = game_with_players();
        game.add_objective(Objective::new("Ruins", Position::new(20.0, 20.0)));
        game.add_unit(squad(0, 3, 1, 19.0));
        game.add_unit(squad(1, 1, 2, 22.0));
        game.set_phase(PlayerId(0), Phase::EndOfTurn);
        game.score_objectives();
        assert_eq!(game.board().objectives[0].controller, Some(PlayerId(0)));
        assert_eq!(game.victory_points(PlayerId(0)), 1);
        assert_eq!(game.victory_points(PlayerId(1)), 0);
    }

    #[test]
    fn test_tie_keeps_previous_controller() {
        let mut game = game_with_players();
        let mut objective = Objective::new("Well", Position::new(20.0, 20.0));
        objective.controller = Some(PlayerId(1));
        game.add_objective(objective);
        game.add_unit(squad(0, 1, 2, 19.0));
        game.add_unit(squad(1, 2, 1, 21.0));
        game.set_phase(PlayerId(0), Phase::EndOfTurn);
        game.score_objectives();
        assert_eq!(game.board().objectives[0].controller, Some(PlayerId(1)));
        assert_eq!(game.victory_points(PlayerId(0)), 0);
    }

    #[test]
    fn test_last_army_standing_wins() {
        let mut game = game_with_players();
        game.add_unit(squad(0, 1, 1, 10.0));
        let b = game.add_unit(squad(1, 1, 1, 30.0));
        assert_eq!(game.check_victory(), None);

        if let Ok(index) = game.index_of(b) {
            game.units[index].take_damage(1);
        }
        let outcome = game.check_victory();
        assert_eq!(
            outcome,
            Some(BattleOutcome::Victory { winner: PlayerId(0), reason: VictoryReason::Annihilation })
        );
        assert!(game.is_over());
    }

    #[test]
    fn test_mutual_destruction_is_draw() {
        let mut game = game_with_players();
        let a = game.add_unit(squad(0, 1, 1, 10.0));
        let b = game.add_unit(squad(1, 1, 1, 30.0));
        for id in [a, b] {
            if let Ok(index) = game.index_of(id) {
                game.units[index].take_damage(1);
            }
        }
        assert_eq!(game.check_victory(), Some(BattleOutcome::Draw));
    }

    #[test]
    fn test_points_decide_after_final_round() {
        let mut game = game_with_players();
        game.players[1].victory_points = 3;
        assert_eq!(game.decide_on_points().winner(), Some(PlayerId(1)));

        let mut game = game_with_players();
        game.players[0].victory_points = 2;
        game.players[1].victory_points = 2;
        assert_eq!(game.decide_on_points(), BattleOutcome::Draw);
        assert!(game.log().contains("draw"));
    }
}
