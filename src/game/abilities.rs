//! Paid command abilities: rally, all-out attack/defence, power through
//!
//! Each costs command points from the issuing player's ledger. Validation
//! runs before the ledger is touched, so a rejected ability costs nothing.

use crate::battle::constants::{RALLY_DICE, RALLY_SUCCESS};
use crate::battle::engagement::in_engagement;
use crate::combat::resolve_mortal_wounds;
use crate::command::{CommandKind, CommandOutcome};
use crate::core::error::CommandError;
use crate::core::types::{PlayerId, UnitId};
use crate::dice::DiceRoller;
use crate::game::state::Game;
use crate::rules::commands::{all_out_attack, all_out_defence};

impl Game {
    fn spend(&mut self, player: PlayerId, kind: CommandKind, unit: UnitId) -> Result<(), CommandError> {
        self.players[player.index()].tracker.spend(kind, Some(unit))
    }

    /// Roll 6D6; each 4+ is a point spent healing, then returning models
    pub(crate) fn rally(&mut self, player: PlayerId, unit: UnitId) -> Result<CommandOutcome, CommandError> {
        let index = self.own_unit(player, unit)?;
        if self.engaged_at(index) {
            return Err(CommandError::Engaged(unit));
        }
        self.spend(player, CommandKind::Rally, unit)?;

        let rolls = self.dice.roll_d6s(RALLY_DICE);
        let points = rolls.iter().filter(|&&r| r >= RALLY_SUCCESS).count() as u32;
        let rallied = &mut self.units[index];
        let (healed, returned) = rallied.restore(points);

        Ok(CommandOutcome::success(format!(
            "{} rallies with {points} point(s) ({rolls:?}): {healed} wound(s) healed, {returned} model(s) return",
            rallied.name
        )))
    }

    pub(crate) fn all_out_attack(&mut self, player: PlayerId, unit: UnitId) -> Result<CommandOutcome, CommandError> {
        let index = self.own_unit(player, unit)?;
        self.spend(player, CommandKind::AllOutAttack, unit)?;
        self.rules.add_rule(all_out_attack(unit));
        Ok(CommandOutcome::success(format!(
            "{} makes an all-out attack (+1 to hit this phase)",
            self.units[index].name
        )))
    }

    pub(crate) fn all_out_defence(&mut self, player: PlayerId, unit: UnitId) -> Result<CommandOutcome, CommandError> {
        let index = self.own_unit(player, unit)?;
        self.spend(player, CommandKind::AllOutDefence, unit)?;
        self.rules.add_rule(all_out_defence(unit));
        Ok(CommandOutcome::success(format!(
            "{} braces for an all-out defence (+1 save this phase)",
            self.units[index].name
        )))
    }

    /// A unit that charged this turn shoves through a smaller enemy for D3
    /// mortal damage
    pub(crate) fn power_through(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        target: UnitId,
    ) -> Result<CommandOutcome, CommandError> {
        let index = self.own_unit(player, unit)?;
        let charger = &self.units[index];
        if !charger.flags.charged {
            return Err(CommandError::InvalidTarget(format!("{unit} did not charge this turn")));
        }

        let target_index = self.enemy_unit(player, target)?;
        let defender = &self.units[target_index];
        if !in_engagement(charger, defender, &self.board, &self.config) {
            return Err(CommandError::OutOfRange {
                distance: charger.distance_to(defender),
                max: self.config.engagement_range,
            });
        }
        if defender.remaining_wounds() >= charger.remaining_wounds() {
            return Err(CommandError::InvalidTarget(format!(
                "{target} is not smaller than {unit} ({} vs {} wounds)",
                defender.remaining_wounds(),
                charger.remaining_wounds()
            )));
        }
        self.spend(player, CommandKind::PowerThrough, unit)?;

        let amount = self.dice.d3() as u32;
        let damage = resolve_mortal_wounds(&mut self.dice, &mut self.units[target_index], amount);
        Ok(CommandOutcome::success(format!(
            "{} powers through {}: {damage}",
            self.units[index].name, self.units[target_index].name
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::units::{Stats, Unit};
    use crate::battle::weapon::Weapon;
    use crate::command::{Command, CommandKind};
    use crate::core::config::GameConfig;
    use crate::core::error::CommandError;
    use crate::core::types::{PlayerId, Position, UnitId};
    use crate::dice::LoadedDice;
    use crate::game::phase::Phase;
    use crate::game::state::Game;
    use crate::player::PassivePlayer;
    use crate::rules::{RuleSource, Trigger};

    fn scripted_game(faces: Vec<u8>) -> Game {
        let mut game = Game::with_dice(GameConfig::default(), LoadedDice::new(faces)).unwrap();
        game.add_player("Red", Box::new(PassivePlayer::new("Red")));
        game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
        game
    }

    fn squad(owner: u32, models: usize, x: f64) -> Unit {
        Unit::new(UnitId(0), PlayerId(owner), "Squad", Stats::new(5.0, 4, 1, 2), models, Position::new(x, 20.0))
            .with_weapon(Weapon::sword())
    }

    #[test]
    fn test_rally_heals_then_returns_models() {
        // Four successes: heal 1, then return one 2-wound model, 1 left over
        let mut game = scripted_game(vec![4, 5, 6, 4, 1, 2]);
        let a = game.add_unit(squad(0, 3, 10.0));
        game.add_unit(squad(1, 3, 40.0));
        if let Ok(index) = game.index_of(a) {
            game.units[index].take_damage(3);
        }
        game.init_round(1);
        game.set_phase(PlayerId(0), Phase::Hero);

        let outcome = game.execute(PlayerId(0), Command::Rally { unit: a }).unwrap();
        assert!(outcome.success);
        let rallied = game.unit(a).unwrap();
        assert_eq!(rallied.living_models(), 3);
        assert_eq!(rallied.remaining_wounds(), 6);
        assert_eq!(game.command_points(PlayerId(0)), 4);
    }

    #[test]
    fn test_rally_rejected_when_engaged() {
        let mut game = scripted_game(vec![6]);
        let a = game.add_unit(squad(0, 3, 10.0));
        game.add_unit(squad(1, 3, 12.0));
        game.init_round(1);
        game.set_phase(PlayerId(0), Phase::Hero);
        let err = game.execute(PlayerId(0), Command::Rally { unit: a }).unwrap_err();
        assert_eq!(err, CommandError::Engaged(a));
        assert_eq!(game.command_points(PlayerId(0)), 4);
    }

    #[test]
    fn test_command_once_per_phase_army_wide() {
        let mut game = scripted_game(vec![6]);
        let a = game.add_unit(squad(0, 3, 10.0));
        let b = game.add_unit(squad(0, 3, 20.0));
        game.add_unit(squad(1, 3, 40.0));
        game.init_round(1);
        game.set_phase(PlayerId(0), Phase::Shooting);

        game.execute(PlayerId(0), Command::AllOutAttack { unit: a }).unwrap();
        let err = game.execute(PlayerId(0), Command::AllOutAttack { unit: b }).unwrap_err();
        assert_eq!(err, CommandError::CommandAlreadyUsed(CommandKind::AllOutAttack));
        assert_eq!(game.command_points(PlayerId(0)), 3);
        assert_eq!(game.rules().rules_for(Trigger::BeforeHitRoll), vec!["all-out-attack:unit#1"]);
    }

    #[test]
    fn test_unit_takes_one_command_per_phase() {
        let mut game = scripted_game(vec![6]);
        let a = game.add_unit(squad(0, 3, 10.0));
        game.add_unit(squad(1, 3, 12.0));
        game.init_round(1);
        game.set_phase(PlayerId(0), Phase::Combat);

        game.execute(PlayerId(0), Command::AllOutAttack { unit: a }).unwrap();
        let err = game.execute(PlayerId(0), Command::AllOutDefence { unit: a }).unwrap_err();
        assert_eq!(err, CommandError::UnitAlreadyCommanded(a));
    }

    #[test]
    fn test_command_rules_expire_at_phase_end() {
        let mut game = scripted_game(vec![6]);
        let a = game.add_unit(squad(0, 3, 10.0));
        game.add_unit(squad(1, 3, 12.0));
        game.init_round(1);
        game.set_phase(PlayerId(0), Phase::Combat);
        game.execute(PlayerId(0), Command::AllOutDefence { unit: a }).unwrap();
        assert!(game.rules().has_rules_for(Trigger::BeforeSaveRoll));

        game.end_phase();
        assert!(!game.rules().has_rules_for(Trigger::BeforeSaveRoll));
        assert_eq!(game.rules_mut().remove_rules_by_source(RuleSource::Command, ""), 0);
    }

    #[test]
    fn test_insufficient_points() {
        let mut game = scripted_game(vec![6]);
        let a = game.add_unit(squad(0, 3, 10.0));
        game.add_unit(squad(1, 3, 40.0));
        game.set_phase(PlayerId(0), Phase::Shooting);
        let err = game.execute(PlayerId(0), Command::AllOutAttack { unit: a }).unwrap_err();
        assert_eq!(err, CommandError::InsufficientPoints { needed: 1, available: 0 });
    }

    #[test]
    fn test_power_through() {
        let mut game = scripted_game(vec![6]);
        let a = game.add_unit(squad(0, 5, 10.0));
        let b = game.add_unit(squad(1, 2, 12.0));
        game.init_round(1);
        game.set_phase(PlayerId(0), Phase::EndOfTurn);

        let err = game.execute(PlayerId(0), Command::PowerThrough { unit: a, target: b }).unwrap_err();
        assert!(matches!(err, CommandError::InvalidTarget(_)));

        if let Ok(index) = game.index_of(a) {
            game.units[index].flags.charged = true;
        }
        let outcome = game.execute(PlayerId(0), Command::PowerThrough { unit: a, target: b }).unwrap();
        assert!(outcome.success);
        assert_eq!(game.unit(b).unwrap().remaining_wounds(), 1);
    }

    #[test]
    fn test_power_through_needs_smaller_target() {
        let mut game = scripted_game(vec![6]);
        let a = game.add_unit(squad(0, 2, 10.0));
        let b = game.add_unit(squad(1, 2, 12.0));
        game.init_round(1);
        game.set_phase(PlayerId(0), Phase::EndOfTurn);
        if let Ok(index) = game.index_of(a) {
            game.units[index].flags.charged = true;
        }
        let err = game.execute(PlayerId(0), Command::PowerThrough { unit: a, target: b }).unwrap_err();
        assert!(matches!(err, CommandError::InvalidTarget(_)));
        assert_eq!(game.command_points(PlayerId(0)), 4);
    }
}
