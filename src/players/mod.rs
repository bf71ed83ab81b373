//! Player state: collected marbles, recipe tiles and score.

mod state;

pub use state::{CompletionEvent, PlayerState, RecipeTile, RECIPE_SLOTS};
