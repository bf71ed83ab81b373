//! Core types: players, colors, RNG, configuration, errors, actions, and the
//! shared table.

pub mod action;
pub mod color;
pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{ActionRecord, TurnAction, TurnRecord};
pub use color::{Color, ColorCounts, ALL_COLORS, COLOR_COUNT};
pub use config::{GameConfig, DEFAULT_COLUMNS, DEFAULT_ROWS};
pub use error::{ConfigError, GameError};
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use state::{ActionOutcome, GameResult, Table};
