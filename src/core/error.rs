use thiserror::Error;

use crate::command::CommandKind;
use crate::core::types::{PlayerId, UnitId};
use crate::game::Phase;

/// Fatal errors: the battle round loop cannot run at all
#[derive(Error, Debug)]
pub enum GameError {
    #[error("At least two players are required, {0} registered")]
    NotEnoughPlayers(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading a `GameConfig`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// A rejected command. Recoverable: game state is untouched and the
/// player may try again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown unit {0}")]
    UnknownUnit(UnitId),

    #[error("{unit} is not controlled by {player}")]
    NotOwner { unit: UnitId, player: PlayerId },

    #[error("It is not {0}'s turn to act")]
    NotYourTurn(PlayerId),

    #[error("{command} cannot be used in the {phase} phase")]
    WrongPhase { command: CommandKind, phase: Phase },

    #[error("{0} has been destroyed")]
    UnitDestroyed(UnitId),

    #[error("{unit} has already {action} this turn")]
    AlreadyActed { unit: UnitId, action: &'static str },

    #[error("Out of range: {distance:.2}\" exceeds {max:.2}\"")]
    OutOfRange { distance: f64, max: f64 },

    #[error("Destination is outside the battlefield")]
    OutOfBounds,

    #[error("{0} is engaged with the enemy")]
    Engaged(UnitId),

    #[error("{0} is not engaged with the enemy")]
    NotEngaged(UnitId),

    #[error("Destination is within engagement range of an enemy unit")]
    EndsInEngagement,

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("No line of sight to {0}")]
    NoLineOfSight(UnitId),

    #[error("{0} has no usable weapons")]
    NoWeapons(UnitId),

    #[error("Blocked: {0}")]
    Blocked(String),

    #[error("{0} does not strike in this combat tier")]
    WrongStrikeTier(UnitId),

    #[error("{0} cannot cast any more spells this turn")]
    NoCastsLeft(UnitId),

    #[error("{0} cannot chant any more prayers this turn")]
    NoChantsLeft(UnitId),

    #[error("{unit} does not know '{name}'")]
    UnknownRitual { unit: UnitId, name: String },

    #[error("Not enough command points: need {needed}, have {available}")]
    InsufficientPoints { needed: u32, available: u32 },

    #[error("{0} has already been used this phase")]
    CommandAlreadyUsed(CommandKind),

    #[error("{0} has already received a command this phase")]
    UnitAlreadyCommanded(UnitId),

    #[error("The game is over")]
    GameOver,
}

pub type Result<T> = std::result::Result<T, GameError>;
