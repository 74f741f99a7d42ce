//! Movement and charge phase commands

use crate::battle::engagement::enemy_within;
use crate::combat::resolve_mortal_wounds;
use crate::command::CommandOutcome;
use crate::core::error::CommandError;
use crate::core::types::{PlayerId, Position, UnitId};
use crate::dice::DiceRoller;
use crate::game::state::Game;
use crate::rules::{Axis, RuleContext, Trigger};

/// How a repositioning move is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stride {
    Normal,
    Run,
    Retreat,
}

impl Game {
    /// Checks shared by move, run and retreat. Returns the unit index and
    /// the rule modifier to its movement.
    fn validate_move(
        &self,
        player: PlayerId,
        unit: UnitId,
        destination: Position,
        stride: Stride,
    ) -> Result<(usize, i32), CommandError> {
        let index = self.own_unit(player, unit)?;
        let mover = &self.units[index];

        if mover.flags.moved {
            return Err(CommandError::AlreadyActed { unit, action: "moved" });
        }

        let engaged = self.engaged_at(index);
        match stride {
            Stride::Retreat if !engaged => return Err(CommandError::NotEngaged(unit)),
            Stride::Normal | Stride::Run if engaged => return Err(CommandError::Engaged(unit)),
            _ => {}
        }

        if !self.board.in_bounds(&destination) {
            return Err(CommandError::OutOfBounds);
        }

        let mut ctx = RuleContext::movement(Trigger::BeforeMove, mover, destination);
        self.rules.evaluate(Trigger::BeforeMove, &mut ctx);
        if let Some(message) = ctx.block_message() {
            return Err(CommandError::Blocked(message.to_string()));
        }
        let modifier = ctx.modifier(Axis::Move).total();

        // Runs are checked against the best possible roll here; the actual
        // roll is made once the command is accepted.
        let bonus = if stride == Stride::Run { 6.0 } else { 0.0 };
        let max = mover.stats.movement + modifier as f64 + bonus;
        let distance = mover.position.distance(&destination);
        if distance > max {
            return Err(CommandError::OutOfRange { distance, max });
        }

        if enemy_within(mover, &destination, &self.units, self.config.engagement_range) {
            return Err(CommandError::EndsInEngagement);
        }

        Ok((index, modifier))
    }

    pub(crate) fn move_unit(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        destination: Position,
    ) -> Result<CommandOutcome, CommandError> {
        let (index, _) = self.validate_move(player, unit, destination, Stride::Normal)?;
        let mover = &mut self.units[index];
        let from = mover.position;
        mover.move_to(destination);
        mover.flags.moved = true;
        Ok(CommandOutcome::success(format!(
            "{} moves from {} to {}",
            mover.name, from, destination
        )))
    }

    /// Move + D6. A run that rolls short still uses up the unit's move.
    pub(crate) fn run_unit(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        destination: Position,
    ) -> Result<CommandOutcome, CommandError> {
        let (index, modifier) = self.validate_move(player, unit, destination, Stride::Run)?;
        let roll = self.dice.d6();
        let mover = &mut self.units[index];
        let allowance = mover.stats.movement + modifier as f64 + roll as f64;
        let distance = mover.position.distance(&destination);
        mover.flags.moved = true;
        mover.flags.ran = true;

        if distance > allowance {
            return Ok(CommandOutcome::failure(format!(
                "{} runs (rolled {}) but falls short of {}",
                mover.name, roll, destination
            )));
        }

        mover.move_to(destination);
        Ok(CommandOutcome::success(format!(
            "{} runs to {} (rolled {})",
            mover.name, destination, roll
        )))
    }

    /// Leave combat, taking D3 mortal damage first
    pub(crate) fn retreat_unit(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        destination: Position,
    ) -> Result<CommandOutcome, CommandError> {
        let (index, _) = self.validate_move(player, unit, destination, Stride::Retreat)?;
        let amount = self.dice.d3() as u32;
        let damage = resolve_mortal_wounds(&mut self.dice, &mut self.units[index], amount);
        let mover = &mut self.units[index];
        mover.flags.moved = true;
        mover.flags.retreated = true;

        if damage.unit_destroyed {
            return Ok(CommandOutcome::failure(format!(
                "{} is destroyed while retreating ({})",
                mover.name, damage
            )));
        }

        mover.move_to(destination);
        Ok(CommandOutcome::success(format!(
            "{} retreats to {} suffering {}",
            mover.name, destination, damage
        )))
    }

    /// Charge: 2D6 against the gap to the target
    pub(crate) fn charge(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        target: UnitId,
    ) -> Result<CommandOutcome, CommandError> {
        let index = self.own_unit(player, unit)?;
        let charger = &self.units[index];

        if charger.flags.charged {
            return Err(CommandError::AlreadyActed { unit, action: "charged" });
        }
        if charger.flags.ran {
            return Err(CommandError::AlreadyActed { unit, action: "run" });
        }
        if charger.flags.retreated {
            return Err(CommandError::AlreadyActed { unit, action: "retreated" });
        }
        if self.engaged_at(index) {
            return Err(CommandError::Engaged(unit));
        }

        let target_index = self.enemy_unit(player, target)?;
        let defender = &self.units[target_index];
        let distance = charger.distance_to(defender);
        if distance > self.config.charge_range {
            return Err(CommandError::OutOfRange {
                distance,
                max: self.config.charge_range,
            });
        }

        let mut ctx = RuleContext::targeted(Trigger::BeforeCharge, charger, defender, false);
        self.rules.evaluate(Trigger::BeforeCharge, &mut ctx);
        if let Some(message) = ctx.block_message() {
            return Err(CommandError::Blocked(message.to_string()));
        }
        let modifier = ctx.modifier(Axis::Charge).total();
        let target_position = defender.position;

        // ===== ROLL =====
        let (a, b) = self.dice.two_d6();
        let roll = (a as i32 + b as i32 + modifier).max(0) as f64;
        let gap = distance - roll;
        let charger = &mut self.units[index];
        charger.flags.charged = true;

        if gap > self.config.engagement_range {
            return Ok(CommandOutcome::failure(format!(
                "{} fails to charge {} (rolled {}, needed {:.1})",
                charger.name,
                target,
                roll,
                distance - self.config.engagement_range
            )));
        }

        // Stop at the rolled distance, but never inside base contact
        let stop = gap.max(self.config.base_contact_distance);
        let travel = (distance - stop).max(0.0);
        let destination = charger.position.toward(&target_position, travel);
        charger.move_to(destination);
        Ok(CommandOutcome::success(format!(
            "{} charges {} (rolled {}) and ends at {}",
            charger.name, target, roll, destination
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::board::{TerrainKind, TerrainPiece};
    use crate::battle::units::{Stats, Unit};
    use crate::command::Command;
    use crate::core::config::GameConfig;
    use crate::core::error::CommandError;
    use crate::core::types::{PlayerId, Position, UnitId};
    use crate::dice::LoadedDice;
    use crate::game::phase::Phase;
    use crate::game::state::Game;
    use crate::player::PassivePlayer;
    use crate::rules::{Axis, Rule, RuleSource, Trigger};

    fn setup() -> (Game, UnitId, UnitId) {
        let mut game = Game::new(GameConfig::default(), 3).unwrap();
        game.add_player("Red", Box::new(PassivePlayer::new("Red")));
        game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
        let mover = game.add_unit(Unit::new(
            UnitId(0),
            PlayerId(0),
            "Runners",
            Stats::new(5.0, 4, 1, 1),
            1,
            Position::new(10.0, 10.0),
        ));
        let enemy = game.add_unit(Unit::new(
            UnitId(0),
            PlayerId(1),
            "Foes",
            Stats::new(5.0, 4, 1, 1),
            1,
            Position::new(40.0, 10.0),
        ));
        (game, mover, enemy)
    }

    fn move_to(unit: UnitId, x: f64, y: f64) -> Command {
        Command::Move {
            unit,
            destination: Position::new(x, y),
        }
    }

    #[test]
    fn test_move_range_inclusive() {
        let (mut game, mover, _) = setup();
        game.set_phase(PlayerId(0), Phase::Movement);

        let err = game.execute(PlayerId(0), move_to(mover, 20.0, 10.0)).unwrap_err();
        assert!(matches!(err, CommandError::OutOfRange { .. }));
        assert!(!game.unit(mover).unwrap().flags.moved);

        let outcome = game.execute(PlayerId(0), move_to(mover, 15.0, 10.0)).unwrap();
        assert!(outcome.success);
        assert!(game.unit(mover).unwrap().flags.moved);
        assert_eq!(game.unit(mover).unwrap().position, Position::new(15.0, 10.0));
    }

    #[test]
    fn test_cannot_move_twice() {
        let (mut game, mover, _) = setup();
        game.set_phase(PlayerId(0), Phase::Movement);
        game.execute(PlayerId(0), move_to(mover, 12.0, 10.0)).unwrap();
        let err = game.execute(PlayerId(0), move_to(mover, 13.0, 10.0)).unwrap_err();
        assert_eq!(err, CommandError::AlreadyActed { unit: mover, action: "moved" });
    }

    #[test]
    fn test_cannot_end_in_engagement() {
        let (mut game, mover, _) = setup();
        game.units[0].move_to(Position::new(33.0, 10.0));
        game.set_phase(PlayerId(0), Phase::Movement);
        let err = game.execute(PlayerId(0), move_to(mover, 37.5, 10.0)).unwrap_err();
        assert_eq!(err, CommandError::EndsInEngagement);
    }

    #[test]
    fn test_out_of_bounds() {
        let (mut game, mover, _) = setup();
        game.units[0].move_to(Position::new(1.0, 1.0));
        game.set_phase(PlayerId(0), Phase::Movement);
        let err = game.execute(PlayerId(0), move_to(mover, -1.0, 1.0)).unwrap_err();
        assert_eq!(err, CommandError::OutOfBounds);
    }

    #[test]
    fn test_impassable_terrain_blocks_move() {
        let (mut game, mover, _) = setup();
        game.add_terrain(TerrainPiece::new("Chasm", TerrainKind::Impassable, Position::new(13.0, 10.0), 1.0));
        game.set_phase(PlayerId(0), Phase::Movement);
        let err = game.execute(PlayerId(0), move_to(mover, 13.0, 10.0)).unwrap_err();
        assert_eq!(err, CommandError::Blocked("Chasm is impassable".into()));
    }

    #[test]
    fn test_retreat_requires_engagement() {
        let (mut game, mover, _) = setup();
        game.set_phase(PlayerId(0), Phase::Movement);
        let err = game
            .execute(
                PlayerId(0),
                Command::Retreat {
                    unit: mover,
                    destination: Position::new(8.0, 10.0),
                },
            )
            .unwrap_err();
        assert_eq!(err, CommandError::NotEngaged(mover));
    }

    #[test]
    fn test_engaged_unit_cannot_move_but_can_retreat() {
        let (mut game, mover, _) = setup();
        game.units[0] = Unit::new(mover, PlayerId(0), "Brutes", Stats::new(5.0, 4, 1, 6), 1, Position::new(38.0, 10.0));
        game.set_phase(PlayerId(0), Phase::Movement);

        let err = game.execute(PlayerId(0), move_to(mover, 34.0, 10.0)).unwrap_err();
        assert_eq!(err, CommandError::Engaged(mover));

        let outcome = game
            .execute(
                PlayerId(0),
                Command::Retreat {
                    unit: mover,
                    destination: Position::new(34.0, 10.0),
                },
            )
            .unwrap();
        assert!(outcome.success);
        let unit = game.unit(mover).unwrap();
        assert!(unit.flags.retreated);
        assert!(unit.remaining_wounds() < 6);
    }

    #[test]
    fn test_charge_out_of_range() {
        let (mut game, mover, enemy) = setup();
        game.set_phase(PlayerId(0), Phase::Charge);
        let err = game
            .execute(PlayerId(0), Command::Charge { unit: mover, target: enemy })
            .unwrap_err();
        assert!(matches!(err, CommandError::OutOfRange { .. }));
        assert!(!game.unit(mover).unwrap().flags.charged);
    }

    #[test]
    fn test_short_charge_always_succeeds() {
        let (mut game, mover, enemy) = setup();
        game.units[0].move_to(Position::new(35.0, 10.0));
        game.set_phase(PlayerId(0), Phase::Charge);
        // gap of 5: any 2D6 roll of at least 2 closes to within 3
        let outcome = game
            .execute(PlayerId(0), Command::Charge { unit: mover, target: enemy })
            .unwrap();
        assert!(outcome.success);
        let charger = game.unit(mover).unwrap();
        assert!(charger.flags.charged);
        let gap = charger.distance_to(game.unit(enemy).unwrap());
        assert!(gap <= 3.0 + 1e-9);
        assert!(gap >= 1.0 - 1e-9);
        assert!(game.is_engaged(mover));
    }

    /// Charger 12" from its target, rolling a double 2
    fn long_charge(bonus: Option<i32>) -> (Game, UnitId, UnitId) {
        let mut game = Game::with_dice(GameConfig::default(), LoadedDice::new(vec![2, 2])).unwrap();
        game.add_player("Red", Box::new(PassivePlayer::new("Red")));
        game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
        let stats = Stats::new(5.0, 4, 1, 1);
        let charger = game.add_unit(Unit::new(UnitId(0), PlayerId(0), "Riders", stats, 1, Position::new(28.0, 10.0)));
        let target = game.add_unit(Unit::new(UnitId(0), PlayerId(1), "Foes", stats, 1, Position::new(40.0, 10.0)));
        if let Some(bonus) = bonus {
            game.rules_mut()
                .add_rule(Rule::modifier("war-horn", Trigger::BeforeCharge, RuleSource::Command, Axis::Charge, bonus));
        }
        game.set_phase(PlayerId(0), Phase::Charge);
        (game, charger, target)
    }

    #[test]
    fn test_charge_modifier_adds_to_roll() {
        let (mut game, charger, target) = long_charge(None);
        let outcome = game.execute(PlayerId(0), Command::Charge { unit: charger, target }).unwrap();
        assert!(!outcome.success);
        assert!(outcome.description.contains("rolled 4"));
        assert_eq!(game.unit(charger).unwrap().position, Position::new(28.0, 10.0));

        let (mut game, charger, target) = long_charge(Some(5));
        let outcome = game.execute(PlayerId(0), Command::Charge { unit: charger, target }).unwrap();
        assert!(outcome.success);
        assert!(outcome.description.contains("rolled 9"));
        assert!(game.is_engaged(charger));
    }
}
