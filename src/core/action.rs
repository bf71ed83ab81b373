//! Turn actions and their history records.
//!
//! Every mutation a player makes to the table is expressed as a
//! [`TurnAction`]. Successful actions are appended to the table's history as
//! [`ActionRecord`]s, which makes a match replayable from its seed and the
//! action log.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::color::Color;
use super::player::PlayerId;

/// One step of a player's turn.
///
/// ## Example
///
/// ```
/// use potion_dispenser::core::{Color, TurnAction};
///
/// let pick = TurnAction::Extract { row: 19, col: 2 };
/// let place = TurnAction::Assign { color: Color::Blue, slot: 0 };
/// assert_ne!(pick, place);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnAction {
    /// Fill open recipe slots with catalog positions.
    SelectRecipes(SmallVec<[usize; 2]>),

    /// Take the marble at a dispenser position and resolve the cascade.
    Extract { row: usize, col: usize },

    /// Move one held marble onto an active recipe.
    Assign { color: Color, slot: usize },

    /// Brew the recipe in a slot if it is complete.
    Brew { slot: usize },
}

impl TurnAction {
    /// Build a `SelectRecipes` action from catalog positions.
    #[must_use]
    pub fn select_recipes(choices: &[usize]) -> Self {
        TurnAction::SelectRecipes(SmallVec::from_slice(choices))
    }
}

impl std::fmt::Display for TurnAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnAction::SelectRecipes(choices) => write!(f, "select recipes {:?}", choices.as_slice()),
            TurnAction::Extract { row, col } => write!(f, "extract row {} col {}", row + 1, col + 1),
            TurnAction::Assign { color, slot } => write!(f, "assign {} to slot {}", color, slot + 1),
            TurnAction::Brew { slot } => write!(f, "brew slot {}", slot + 1),
        }
    }
}

/// A recorded action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: TurnAction,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number within the turn (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    #[must_use]
    pub fn new(player: PlayerId, action: TurnAction, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}

/// Summary of one finished turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub player: PlayerId,
    pub turn: u32,
    /// Successful actions, in order.
    pub actions: Vec<TurnAction>,
    /// Marbles captured by the turn's extraction, in capture order.
    pub captured: Vec<Color>,
    /// Recipes brewed during the turn.
    pub brewed: Vec<String>,
    /// The turn was forfeited and rolled back.
    pub skipped: bool,
}
