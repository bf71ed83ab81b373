//! The shared table: dispenser plus both players.
//!
//! `Table` is the one structure the two actors contend for. It is owned by
//! the turn coordinator and lent to whichever actor holds the turn token.
//! Histories use `im` vectors so the snapshot taken at the start of every
//! turn (for rollback) stays cheap as the match grows.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::{ActionRecord, TurnAction, TurnRecord};
use super::config::GameConfig;
use super::error::GameError;
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::dispenser::{CascadeEngine, CascadeResult, ColorGrid};
use crate::players::{CompletionEvent, PlayerState};
use crate::recipes::RecipeCatalog;

/// Result of a finished match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(PlayerId),
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }
}

/// What a successful [`TurnAction`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    RecipesSelected,
    Captured(CascadeResult),
    Assigned,
    Brewed(Option<CompletionEvent>),
}

/// Dispenser and player records shared by both actors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub grid: ColorGrid,
    pub players: PlayerMap<PlayerState>,

    /// Turn number (starts at 1).
    turn_number: u32,

    /// Action sequence within the current turn.
    action_sequence: u32,

    /// Marbles loaded at the start of the match.
    initial_marbles: usize,

    history: Vector<ActionRecord>,
    turns: Vector<TurnRecord>,
}

impl Table {
    /// Set up a match: fill the dispenser from the configured supply and seat
    /// both players.
    pub fn new(config: &GameConfig, names: [&str; 2]) -> Result<Self, GameError> {
        let mut rng = GameRng::new(config.seed).for_context("dispenser");
        let grid = ColorGrid::initialize(config.rows, config.columns, &config.supply(), &mut rng)?;
        Ok(Self::with_grid(grid, names))
    }

    /// Seat both players at an explicit dispenser.
    #[must_use]
    pub fn with_grid(grid: ColorGrid, names: [&str; 2]) -> Self {
        let initial_marbles = grid.marble_count();
        Self {
            grid,
            players: PlayerMap::new(|p| PlayerState::new(names[p.index()])),
            turn_number: 1,
            action_sequence: 0,
            initial_marbles,
            history: Vector::new(),
            turns: Vector::new(),
        }
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub fn initial_marbles(&self) -> usize {
        self.initial_marbles
    }

    /// Marbles in the dispenser plus every marble any player accounts for.
    /// Equal to `initial_marbles()` at all times.
    #[must_use]
    pub fn marble_total(&self) -> usize {
        self.grid.marble_count()
            + self
                .players
                .iter()
                .map(|(_, p)| p.marble_total())
                .sum::<usize>()
    }

    /// Successful actions, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    /// Finished turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &Vector<TurnRecord> {
        &self.turns
    }

    /// Apply one action for `player`.
    ///
    /// On error the table is unchanged and nothing is recorded.
    pub fn apply(
        &mut self,
        player: PlayerId,
        action: &TurnAction,
        catalog: &RecipeCatalog,
        engine: &CascadeEngine,
    ) -> Result<ActionOutcome, GameError> {
        let outcome = match action {
            TurnAction::SelectRecipes(choices) => {
                self.players[player].select_recipes(catalog, choices)?;
                ActionOutcome::RecipesSelected
            }
            TurnAction::Extract { row, col } => {
                let result = engine.resolve(&mut self.grid, *row, *col)?;
                self.players[player].collect(&result.captured);
                ActionOutcome::Captured(result)
            }
            TurnAction::Assign { color, slot } => {
                self.players[player].assign(*color, *slot)?;
                ActionOutcome::Assigned
            }
            TurnAction::Brew { slot } => {
                ActionOutcome::Brewed(self.players[player].check_completion(*slot)?)
            }
        };

        let sequence = self.action_sequence;
        self.action_sequence += 1;
        self.history.push_back(ActionRecord::new(
            player,
            action.clone(),
            self.turn_number,
            sequence,
        ));
        Ok(outcome)
    }

    /// Close the current turn and advance the turn counter.
    ///
    /// The record's turn number and action list are filled in from the table.
    pub fn end_turn(&mut self, mut record: TurnRecord) {
        record.turn = self.turn_number;
        record.actions = self
            .history
            .iter()
            .filter(|r| r.turn == self.turn_number)
            .map(|r| r.action.clone())
            .collect();
        self.turns.push_back(record);
        self.turn_number += 1;
        self.action_sequence = 0;
    }

    /// Whether the match is over: the dispenser is empty, or `max_turns`
    /// turns have been played.
    #[must_use]
    pub fn is_over(&self, max_turns: Option<u32>) -> bool {
        self.grid.is_empty() || max_turns.is_some_and(|max| self.turns.len() as u32 >= max)
    }

    /// Result by score.
    #[must_use]
    pub fn result(&self) -> GameResult {
        let first = self.players[PlayerId::FIRST].score();
        let second = self.players[PlayerId::SECOND].score();
        match first.cmp(&second) {
            std::cmp::Ordering::Greater => GameResult::Winner(PlayerId::FIRST),
            std::cmp::Ordering::Less => GameResult::Winner(PlayerId::SECOND),
            std::cmp::Ordering::Equal => GameResult::Draw,
        }
    }
}
