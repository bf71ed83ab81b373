//! # potion-dispenser
//!
//! A two-player marble-drafting game engine: a shared dispenser of colored
//! marbles, a chain-reaction extraction rule, and a turn token that lets two
//! concurrent actors take strictly alternating turns over the same table.
//!
//! ## Design Principles
//!
//! 1. **Atomic Actions**: every operation either succeeds completely or
//!    leaves the table untouched, so a rejected decision can simply be
//!    asked again.
//!
//! 2. **Whole-Turn Exclusion**: the table is owned by the turn coordinator
//!    and lent to one actor per turn. Handing it back is the only
//!    synchronization point.
//!
//! 3. **Deterministic Replay**: a seed fixes the dispenser fill and the
//!    scripted actors; the action history records everything else.
//!
//! ## Modules
//!
//! - `core`: Players, colors, RNG, configuration, errors, actions, the table
//! - `dispenser`: Color grid and cascade resolution
//! - `recipes`: Recipe definitions and catalog
//! - `players`: Collected marbles, recipe tiles, score
//! - `turns`: Turn token, guard and notices
//! - `game`: Actors, per-seat game loop, match runner

pub mod core;
pub mod dispenser;
pub mod game;
pub mod players;
pub mod recipes;
pub mod turns;

// Re-export commonly used types
pub use crate::core::{
    ActionOutcome, ActionRecord, Color, ColorCounts, ConfigError, GameConfig, GameError,
    GameResult, GameRng, PlayerId, PlayerMap, Table, TurnAction, TurnRecord,
};

pub use crate::dispenser::{CascadeEngine, CascadePlan, CascadeResult, CascadeRules, ColorGrid};

pub use crate::recipes::{Recipe, RecipeCatalog, RecipeSpec};

pub use crate::players::{CompletionEvent, PlayerState};

pub use crate::turns::{TurnCoordinator, TurnGuard, TurnNotice, TurnOutcome, TurnState};

pub use crate::game::{run_match, Actor, GameLoop, GreedyActor, MatchReport, RandomActor};
