//! Turn and phase engine integration tests
//!
//! Whole battles driven through `Game::run` plus single commands applied
//! against a forced phase.

use warband::battle::{Stats, Unit, Weapon};
use warband::command::Command;
use warband::core::config::GameConfig;
use warband::core::error::{CommandError, GameError};
use warband::core::types::{PlayerId, Position, UnitId};
use warband::game::{BattleOutcome, Game, Phase};
use warband::player::{PassivePlayer, ScriptedPlayer};

fn warriors(owner: u32, x: f64) -> Unit {
    Unit::new(UnitId(0), PlayerId(owner), "Warriors", Stats::new(5.0, 4, 1, 1), 5, Position::new(x, 20.0))
        .with_weapon(Weapon::melee("Axe", 10, 3, 3, 1, 1))
}

/// Two lines already locked in combat
fn brawl(seed: u64) -> Game {
    let mut game = Game::new(GameConfig::default(), seed).unwrap();
    game.add_player("Red", Box::new(PassivePlayer::new("Red")));
    game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
    game.add_unit(warriors(0, 20.0));
    game.add_unit(warriors(1, 22.0));
    game
}

#[test]
fn test_no_players_is_fatal() {
    let mut game = Game::new(GameConfig::default(), 1).unwrap();
    assert!(matches!(game.run(), Err(GameError::NotEnoughPlayers(0))));
}

#[test]
fn test_invalid_config_is_fatal() {
    let config = GameConfig { battle_rounds: 0, ..GameConfig::default() };
    assert!(matches!(Game::new(config, 1), Err(GameError::InvalidConfig(_))));
}

#[test]
fn test_engaged_units_fight_without_orders() {
    let mut game = brawl(11);
    let outcome = game.run().unwrap();
    assert_eq!(game.outcome(), Some(&outcome));
    assert!(game.log().contains("fights automatically"));
    assert!(game.dice_rolled() > 0);
}

#[test]
fn test_same_seed_same_battle() {
    let mut first = brawl(42);
    let mut second = brawl(42);
    let a = first.run().unwrap();
    let b = second.run().unwrap();
    assert_eq!(a, b);
    assert_eq!(first.log().entries(), second.log().entries());
    assert_eq!(first.dice_rolled(), second.dice_rolled());
}

#[test]
fn test_every_round_starts_with_priority() {
    let config = GameConfig { battle_rounds: 3, ..GameConfig::default() };
    let mut game = Game::new(config, 8).unwrap();
    game.add_player("Red", Box::new(PassivePlayer::new("Red")));
    game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
    game.add_unit(warriors(0, 5.0));
    game.add_unit(warriors(1, 55.0));

    assert_eq!(game.run().unwrap(), BattleOutcome::Draw);
    let priority_rolls = game.log().iter().filter(|e| e.starts_with("Priority roll")).count();
    assert!(priority_rolls >= 3);
    assert!(game.log().contains("=== Battle round 3 ==="));
    assert!(!game.log().contains("=== Battle round 4 ==="));
}

#[test]
fn test_move_allowance_is_inclusive() {
    let mut game = Game::new(GameConfig::default(), 3).unwrap();
    game.add_player("Red", Box::new(PassivePlayer::new("Red")));
    game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
    let unit = game.add_unit(warriors(0, 10.0));
    game.add_unit(warriors(1, 50.0));
    game.set_phase(PlayerId(0), Phase::Movement);

    let too_far = game.execute(PlayerId(0), Command::Move { unit, destination: Position::new(15.5, 20.0) });
    assert!(matches!(too_far, Err(CommandError::OutOfRange { .. })));
    assert_eq!(game.unit(unit).unwrap().position, Position::new(10.0, 20.0));

    game.execute(PlayerId(0), Command::Move { unit, destination: Position::new(15.0, 20.0) })
        .unwrap();
    assert_eq!(game.unit(unit).unwrap().position, Position::new(15.0, 20.0));

    let again = game.execute(PlayerId(0), Command::Move { unit, destination: Position::new(16.0, 20.0) });
    assert_eq!(again, Err(CommandError::AlreadyActed { unit, action: "moved" }));
}

#[test]
fn test_only_the_active_player_moves() {
    let mut game = Game::new(GameConfig::default(), 3).unwrap();
    game.add_player("Red", Box::new(PassivePlayer::new("Red")));
    game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
    game.add_unit(warriors(0, 10.0));
    let blue = game.add_unit(warriors(1, 50.0));
    game.set_phase(PlayerId(0), Phase::Movement);

    let result = game.execute(PlayerId(1), Command::Move { unit: blue, destination: Position::new(48.0, 20.0) });
    assert_eq!(result, Err(CommandError::NotYourTurn(PlayerId(1))));
    assert!(game.log().contains("Rejected"));
}

#[test]
fn test_scripted_armies_meet_in_combat() {
    let red = ScriptedPlayer::new(
        "Red",
        vec![
            Command::Move { unit: UnitId(1), destination: Position::new(25.0, 20.0) },
            Command::Charge { unit: UnitId(1), target: UnitId(2) },
        ],
    );
    let mut game = Game::new(GameConfig::default(), 6).unwrap();
    game.add_player("Red", Box::new(red));
    game.add_player("Blue", Box::new(PassivePlayer::new("Blue")));
    game.add_unit(warriors(0, 20.0));
    game.add_unit(warriors(1, 34.0));

    game.run().unwrap();
    assert!(game.log().contains("Warriors moves from"));
    assert!(game.log().contains("charge"));
    assert!(game.is_over());
}
