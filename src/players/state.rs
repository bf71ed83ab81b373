//! Per-player collection, recipe progress and score.
//!
//! Marbles move one way only: captured into `collected`, assigned from
//! `collected` onto an active recipe, and carried with that recipe into
//! `completed` once it is brewed. Nothing is ever returned to the dispenser.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Color, ColorCounts, GameError, ALL_COLORS};
use crate::recipes::{Recipe, RecipeCatalog};

/// Recipe tiles a player may work on at once.
pub const RECIPE_SLOTS: usize = 2;

/// A recipe a player has selected, with the ingredients assigned to it so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeTile {
    pub recipe: Recipe,
    pub assigned: ColorCounts,
}

impl RecipeTile {
    fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            assigned: ColorCounts::new(),
        }
    }

    /// Ingredients still needed.
    #[must_use]
    pub fn missing(&self) -> ColorCounts {
        self.recipe.required.missing_from(&self.assigned)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.recipe.is_satisfied_by(&self.assigned)
    }
}

/// Emitted when a recipe is brewed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub recipe: String,
    pub points: u32,
    /// Score after adding `points`.
    pub score: u32,
}

impl std::fmt::Display for CompletionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "brewed {} (+{}, score {})", self.recipe, self.points, self.score)
    }
}

/// Everything one player owns at the table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    name: String,
    collected: ColorCounts,
    active: SmallVec<[RecipeTile; RECIPE_SLOTS]>,
    completed: Vector<RecipeTile>,
    score: u32,
}

impl PlayerState {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Marbles held but not yet assigned.
    #[must_use]
    pub fn collected(&self) -> &ColorCounts {
        &self.collected
    }

    /// Recipes in progress, in slot order.
    #[must_use]
    pub fn active(&self) -> &[RecipeTile] {
        &self.active
    }

    /// Brewed recipes, oldest first.
    #[must_use]
    pub fn completed(&self) -> &Vector<RecipeTile> {
        &self.completed
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Free recipe slots.
    #[must_use]
    pub fn open_slots(&self) -> usize {
        RECIPE_SLOTS - self.active.len()
    }

    /// Whether this player has never selected a recipe.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }

    /// Marbles this player accounts for: held, assigned, and brewed.
    #[must_use]
    pub fn marble_total(&self) -> usize {
        self.collected.total()
            + self.active.iter().map(|t| t.assigned.total()).sum::<usize>()
            + self.completed.iter().map(|t| t.assigned.total()).sum::<usize>()
    }

    /// Add captured marbles to the pool.
    pub fn collect(&mut self, colors: &[Color]) {
        for &color in colors {
            self.collected.add(color);
        }
    }

    /// Fill open slots with recipes chosen by catalog position.
    ///
    /// All choices are validated before any slot is filled.
    pub fn select_recipes(
        &mut self,
        catalog: &RecipeCatalog,
        choices: &[usize],
    ) -> Result<(), GameError> {
        if choices.is_empty() || choices.len() > self.open_slots() {
            return Err(GameError::InvalidRecipeSlot {
                slot: self.active.len() + choices.len().saturating_sub(1),
                active: self.active.len(),
                open: self.open_slots(),
            });
        }

        let recipes = choices
            .iter()
            .map(|&choice| catalog.choose(choice).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        self.active.extend(recipes.into_iter().map(RecipeTile::new));
        Ok(())
    }

    /// Move one held marble onto the recipe in `slot`.
    pub fn assign(&mut self, color: Color, slot: usize) -> Result<(), GameError> {
        self.check_slot(slot)?;
        if !self.collected.remove(color) {
            return Err(GameError::NoSuchColorHeld(color));
        }
        self.active[slot].assigned.add(color);
        Ok(())
    }

    /// Brew the recipe in `slot` if its ingredients are all assigned.
    ///
    /// A brewed recipe leaves the active slots, so later slots shift down.
    pub fn check_completion(&mut self, slot: usize) -> Result<Option<CompletionEvent>, GameError> {
        self.check_slot(slot)?;
        if !self.active[slot].is_complete() {
            return Ok(None);
        }

        let tile = self.active.remove(slot);
        self.score += tile.recipe.points;
        let event = CompletionEvent {
            recipe: tile.recipe.name.clone(),
            points: tile.recipe.points,
            score: self.score,
        };
        self.completed.push_back(tile);
        Ok(Some(event))
    }

    /// Assignments that move a recipe closer to completion:
    /// `(color, slot)` pairs where the color is held and still missing.
    #[must_use]
    pub fn useful_assignments(&self) -> Vec<(Color, usize)> {
        let mut out = Vec::new();
        for (slot, tile) in self.active.iter().enumerate() {
            let missing = tile.missing();
            for color in ALL_COLORS {
                if missing.count(color) > 0 && self.collected.count(color) > 0 {
                    out.push((color, slot));
                }
            }
        }
        out
    }

    fn check_slot(&self, slot: usize) -> Result<(), GameError> {
        if slot >= self.active.len() {
            return Err(GameError::InvalidRecipeSlot {
                slot,
                active: self.active.len(),
                open: self.open_slots(),
            });
        }
        Ok(())
    }
}
