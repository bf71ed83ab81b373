//! Error taxonomy.
//!
//! Every `GameError` is local and recoverable: the operation that returned it
//! left the table exactly as it was before the call. The game loop decides
//! whether to re-prompt, skip or stop.

use std::path::PathBuf;
use std::time::Duration;

use super::color::Color;
use super::player::PlayerId;

/// Errors raised by dispenser, player and turn operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("position ({row}, {col}) is outside the {rows}x{cols} dispenser")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("no marble at ({row}, {col})")]
    EmptySlot { row: usize, col: usize },

    #[error("supply of {supply} marbles cannot fill {capacity} slots")]
    SupplyExhausted { supply: usize, capacity: usize },

    #[error("no {0} marble held")]
    NoSuchColorHeld(Color),

    #[error("recipe slot {slot} is not available ({active} active, {open} open)")]
    InvalidRecipeSlot {
        slot: usize,
        active: usize,
        open: usize,
    },

    #[error("recipe choice {choice} is not in the catalog of {available}")]
    InvalidRecipeChoice { choice: usize, available: usize },

    #[error("{player} exceeded the turn limit of {limit:?}")]
    TurnTimeout { player: PlayerId, limit: Duration },

    #[error("actor for {0} stopped unexpectedly")]
    ActorFailed(PlayerId),

    #[error("no seat {0}: only players 0 and 1 exist")]
    InvalidPlayer(u8),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur when loading configuration or a recipe catalog.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
