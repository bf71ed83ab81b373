//! Decision-makers for a seat at the table.
//!
//! An [`Actor`] only ever sees the table read-only and answers with
//! positions and indices. The [`GameLoop`](super::GameLoop) turns those
//! answers into [`TurnAction`](crate::core::TurnAction)s, validates them and
//! re-prompts on rejection, so an actor may be as naive as it likes.

use crate::core::{Color, ColorCounts, GameError, GameRng, PlayerId, Table};
use crate::dispenser::{CascadeEngine, CascadeRules};
use crate::recipes::RecipeCatalog;

/// Console-side collaborator that makes one seat's choices.
pub trait Actor: Send {
    /// Display name for the seat.
    fn name(&self) -> &str;

    /// Pick `count` recipes by catalog position.
    fn choose_recipes(
        &mut self,
        table: &Table,
        catalog: &RecipeCatalog,
        player: PlayerId,
        count: usize,
    ) -> Vec<usize>;

    /// Pick the `(row, col)` to extract.
    fn choose_extraction(&mut self, table: &Table, player: PlayerId) -> (usize, usize);

    /// Pick one held marble and the recipe slot to put it on, or `None` to
    /// keep the rest in reserve.
    fn choose_assignment(&mut self, table: &Table, player: PlayerId) -> Option<(Color, usize)>;

    /// Called when the last decision was rejected.
    fn on_rejected(&mut self, _error: &GameError) {}
}

impl<A: Actor + ?Sized> Actor for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn choose_recipes(
        &mut self,
        table: &Table,
        catalog: &RecipeCatalog,
        player: PlayerId,
        count: usize,
    ) -> Vec<usize> {
        (**self).choose_recipes(table, catalog, player, count)
    }

    fn choose_extraction(&mut self, table: &Table, player: PlayerId) -> (usize, usize) {
        (**self).choose_extraction(table, player)
    }

    fn choose_assignment(&mut self, table: &Table, player: PlayerId) -> Option<(Color, usize)> {
        (**self).choose_assignment(table, player)
    }

    fn on_rejected(&mut self, error: &GameError) {
        (**self).on_rejected(error);
    }
}

// =============================================================================
// Random Actor
// =============================================================================

/// Uniformly random choices among the positions and moves that are
/// currently possible.
#[derive(Clone, Debug)]
pub struct RandomActor {
    name: String,
    rng: GameRng,
}

impl RandomActor {
    pub fn new(name: impl Into<String>, rng: GameRng) -> Self {
        Self {
            name: name.into(),
            rng,
        }
    }
}

impl Actor for RandomActor {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_recipes(
        &mut self,
        _table: &Table,
        catalog: &RecipeCatalog,
        _player: PlayerId,
        count: usize,
    ) -> Vec<usize> {
        (0..count)
            .map(|_| self.rng.gen_range_usize(0..catalog.len().max(1)))
            .collect()
    }

    fn choose_extraction(&mut self, table: &Table, _player: PlayerId) -> (usize, usize) {
        let occupied: Vec<_> = table.grid.occupied().map(|(row, col, _)| (row, col)).collect();
        self.rng.choose(&occupied).copied().unwrap_or((0, 0))
    }

    fn choose_assignment(&mut self, table: &Table, player: PlayerId) -> Option<(Color, usize)> {
        let useful = table.player(player).useful_assignments();
        self.rng.choose(&useful).copied()
    }
}

// =============================================================================
// Greedy Actor
// =============================================================================

/// One-ply greedy play: previews every extraction with the cascade engine and
/// takes the one that captures the most marbles its recipes still need.
#[derive(Clone, Debug)]
pub struct GreedyActor {
    name: String,
    engine: CascadeEngine,
    rng: GameRng,
}

impl GreedyActor {
    /// `rules` should match the table's, or previews will be wrong.
    pub fn new(name: impl Into<String>, rules: CascadeRules, rng: GameRng) -> Self {
        Self {
            name: name.into(),
            engine: CascadeEngine::new(rules),
            rng,
        }
    }

    /// Marbles still missing across every active recipe, minus what is
    /// already held.
    fn wanted(table: &Table, player: PlayerId) -> ColorCounts {
        let state = table.player(player);
        let mut wanted = ColorCounts::new();
        for tile in state.active() {
            for (color, n) in tile.missing().iter() {
                for _ in 0..n {
                    wanted.add(color);
                }
            }
        }
        wanted.missing_from(state.collected())
    }

    /// Needed marbles count ten, any other marble one.
    fn score_capture(wanted: &ColorCounts, captured: &[Color]) -> usize {
        let mut wanted = *wanted;
        captured
            .iter()
            .map(|&color| if wanted.remove(color) { 10 } else { 1 })
            .sum()
    }
}

impl Actor for GreedyActor {
    fn name(&self) -> &str {
        &self.name
    }

    /// Best points per ingredient first; ties go to the catalog order.
    fn choose_recipes(
        &mut self,
        _table: &Table,
        catalog: &RecipeCatalog,
        _player: PlayerId,
        count: usize,
    ) -> Vec<usize> {
        let mut ranked: Vec<(usize, f64)> = catalog
            .iter()
            .enumerate()
            .map(|(i, recipe)| (i, recipe.points as f64 / recipe.required.total().max(1) as f64))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().map(|(i, _)| i).cycle().take(count).collect()
    }

    fn choose_extraction(&mut self, table: &Table, player: PlayerId) -> (usize, usize) {
        let wanted = Self::wanted(table, player);
        let mut best: Vec<(usize, usize)> = Vec::new();
        let mut best_score = 0;

        for (row, col, _) in table.grid.occupied() {
            let Ok(plan) = self.engine.plan(&table.grid, row, col) else {
                continue;
            };
            let score = Self::score_capture(&wanted, &plan.captured);
            if score > best_score {
                best_score = score;
                best.clear();
            }
            if score == best_score {
                best.push((row, col));
            }
        }

        log::trace!("{} weighs {} extractions at score {}", self.name, best.len(), best_score);
        self.rng.choose(&best).copied().unwrap_or((0, 0))
    }

    /// Feed the recipe closest to completion first.
    fn choose_assignment(&mut self, table: &Table, player: PlayerId) -> Option<(Color, usize)> {
        let state = table.player(player);
        state
            .useful_assignments()
            .into_iter()
            .min_by_key(|&(_, slot)| state.active()[slot].missing().total())
    }
}
