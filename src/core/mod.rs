pub mod config;
pub mod error;
pub mod types;

pub use config::GameConfig;
pub use error::{CommandError, ConfigError, GameError};
pub use types::{PlayerId, Position, Round, UnitId};
