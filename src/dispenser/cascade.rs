//! Chain-reaction resolution for a single extraction.
//!
//! Taking a marble opens a gap in its column. Once gravity closes the gap,
//! the run of same-colored marbles directly above it lands on the run
//! directly below it. If both runs share a color and together reach
//! [`CascadeRules::min_run`] marbles, every marble in both runs is captured
//! along with the chosen one.
//!
//! Top to bottom, extracting the middle marble:
//!
//! - `A A B A A`: runs `A A` and `A A` touch, 2 + 2 >= 3, all five captured.
//! - `A B C B A`: runs `B` and `B` touch, 1 + 1 < 3, only `C` captured.
//! - `R R Y B B`: `R` and `B` differ, only `Y` captured.
//!
//! Capture order is fixed: the chosen marble, then the run above from the
//! nearest marble upward, then the run below from the nearest marble
//! downward.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::grid::ColorGrid;
use crate::core::{Color, GameError};

/// Chain-reaction rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeRules {
    /// Combined length the two touching runs must reach to be captured.
    /// `2` captures whenever any two same-colored marbles touch.
    pub min_run: usize,
}

impl Default for CascadeRules {
    fn default() -> Self {
        Self { min_run: 3 }
    }
}

/// What one extraction will capture, computed without touching the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadePlan {
    /// Column of the extraction.
    pub col: usize,
    /// Captured rows, in capture order.
    pub rows: SmallVec<[usize; 8]>,
    /// Captured colors, parallel to `rows`.
    pub captured: SmallVec<[Color; 8]>,
}

impl CascadePlan {
    /// Whether anything beyond the chosen marble is captured.
    #[must_use]
    pub fn is_chain(&self) -> bool {
        self.captured.len() > 1
    }
}

/// Outcome of one extraction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeResult {
    /// Extraction point.
    pub row: usize,
    pub col: usize,
    /// Captured colors: chosen marble first, then the run above, then the
    /// run below.
    pub captured: SmallVec<[Color; 8]>,
}

impl CascadeResult {
    /// Color of the marble the player picked. `None` only for a result
    /// that was built by hand with nothing captured.
    #[must_use]
    pub fn chosen(&self) -> Option<Color> {
        self.captured.first().copied()
    }

    /// Number of marbles captured by the chain reaction alone.
    #[must_use]
    pub fn chain_len(&self) -> usize {
        self.captured.len().saturating_sub(1)
    }
}

/// A maximal run of one color starting next to the gap.
struct Run {
    color: Color,
    rows: SmallVec<[usize; 8]>,
}

/// Resolves extractions against a [`ColorGrid`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CascadeEngine {
    rules: CascadeRules,
}

impl CascadeEngine {
    #[must_use]
    pub fn new(rules: CascadeRules) -> Self {
        Self { rules }
    }

    /// Compute what extracting at `(row, col)` would capture.
    ///
    /// Fails with `OutOfBounds` or `EmptySlot`; never mutates.
    pub fn plan(&self, grid: &ColorGrid, row: usize, col: usize) -> Result<CascadePlan, GameError> {
        let chosen = grid.at(row, col)?.ok_or(GameError::EmptySlot { row, col })?;

        let mut plan = CascadePlan {
            col,
            rows: smallvec![row],
            captured: smallvec![chosen],
        };

        let above = Self::run(grid, col, (0..row).rev());
        let below = Self::run(grid, col, row + 1..grid.rows());

        if let (Some(above), Some(below)) = (above, below) {
            let combined = above.rows.len() + below.rows.len();
            if above.color == below.color && combined >= self.rules.min_run {
                for r in above.rows.into_iter().chain(below.rows) {
                    plan.rows.push(r);
                    plan.captured.push(above.color);
                }
            }
        }

        Ok(plan)
    }

    /// Extract at `(row, col)`, capture the chain and let the column settle.
    ///
    /// Preconditions are checked before the first mutation, so on error the
    /// grid is unchanged.
    pub fn resolve(
        &self,
        grid: &mut ColorGrid,
        row: usize,
        col: usize,
    ) -> Result<CascadeResult, GameError> {
        let plan = self.plan(grid, row, col)?;

        for &r in &plan.rows {
            grid.take(r, plan.col)?;
        }
        grid.compact(plan.col)?;

        log::debug!(
            "extracted ({}, {}): captured {:?}",
            row,
            col,
            plan.captured.as_slice()
        );

        Ok(CascadeResult {
            row,
            col,
            captured: plan.captured,
        })
    }

    /// Walk outward from the gap while slots hold the first color seen.
    /// Stops at a grid edge, an empty slot or a color change.
    fn run(grid: &ColorGrid, col: usize, rows: impl Iterator<Item = usize>) -> Option<Run> {
        let mut run: Option<Run> = None;
        for r in rows {
            let Ok(Some(color)) = grid.at(r, col) else {
                break;
            };
            let current = run.get_or_insert_with(|| Run {
                color,
                rows: SmallVec::new(),
            });
            if current.color != color {
                break;
            }
            current.rows.push(r);
        }
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color::{Black, Blue, Red, Yellow};
    use crate::dispenser::Slot;

    fn column(colors: &[Color]) -> ColorGrid {
        let slots: Vec<Slot> = colors.iter().copied().map(Some).collect();
        ColorGrid::from_columns(&[slots])
    }

    #[test]
    fn test_symmetric_runs_collapse() {
        let mut grid = column(&[Red, Red, Blue, Red, Red]);
        let result = CascadeEngine::default().resolve(&mut grid, 2, 0).unwrap();

        assert_eq!(result.captured.as_slice(), &[Blue, Red, Red, Red, Red]);
        assert_eq!(result.chain_len(), 4);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_result_accessors_tolerate_empty_capture() {
        let result = CascadeResult {
            row: 0,
            col: 0,
            captured: SmallVec::new(),
        };

        assert_eq!(result.chosen(), None);
        assert_eq!(result.chain_len(), 0);

        let mut grid = column(&[Yellow]);
        let result = CascadeEngine::default().resolve(&mut grid, 0, 0).unwrap();
        assert_eq!(result.chosen(), Some(Yellow));
        assert_eq!(result.chain_len(), 0);
    }

    #[test]
    fn test_single_touching_pair_below_threshold() {
        let mut grid = column(&[Red, Blue, Yellow, Blue, Red]);
        let result = CascadeEngine::default().resolve(&mut grid, 2, 0).unwrap();

        assert_eq!(result.captured.as_slice(), &[Yellow]);
        assert_eq!(
            grid.column(0).unwrap(),
            vec![None, Some(Red), Some(Blue), Some(Blue), Some(Red)]
        );
    }

    #[test]
    fn test_pair_rule_captures_touching_pair() {
        let mut grid = column(&[Red, Blue, Yellow, Blue, Red]);
        let engine = CascadeEngine::new(CascadeRules { min_run: 2 });
        let result = engine.resolve(&mut grid, 2, 0).unwrap();

        assert_eq!(result.captured.as_slice(), &[Yellow, Blue, Blue]);
        assert_eq!(
            grid.column(0).unwrap(),
            vec![None, None, None, Some(Red), Some(Red)]
        );
    }

    #[test]
    fn test_mismatched_neighbors_capture_only_chosen() {
        let mut grid = column(&[Red, Red, Yellow, Blue, Blue]);
        let result = CascadeEngine::default().resolve(&mut grid, 2, 0).unwrap();

        assert_eq!(result.captured.as_slice(), &[Yellow]);
        assert_eq!(
            grid.column(0).unwrap(),
            vec![None, Some(Red), Some(Red), Some(Blue), Some(Blue)]
        );
    }

    #[test]
    fn test_capture_order_up_then_down() {
        let mut grid = column(&[Black, Blue, Blue, Red, Blue, Yellow]);
        let engine = CascadeEngine::default();
        let plan = engine.plan(&grid, 3, 0).unwrap();

        assert_eq!(plan.rows.as_slice(), &[3, 2, 1, 4]);
        assert_eq!(plan.captured.as_slice(), &[Red, Blue, Blue, Blue]);

        engine.resolve(&mut grid, 3, 0).unwrap();
        assert_eq!(
            grid.column(0).unwrap(),
            vec![None, None, None, None, Some(Black), Some(Yellow)]
        );
    }

    #[test]
    fn test_scan_stops_at_grid_edge() {
        let mut grid = column(&[Blue, Blue, Red]);
        let result = CascadeEngine::default().resolve(&mut grid, 2, 0).unwrap();

        assert_eq!(result.captured.as_slice(), &[Red]);
        assert_eq!(grid.marble_count(), 2);
    }

    #[test]
    fn test_scan_stops_at_empty_slot() {
        let mut grid = ColorGrid::from_columns(&[vec![
            Some(Blue),
            None,
            Some(Blue),
            Some(Red),
            Some(Blue),
            Some(Blue),
        ]]);
        let plan = CascadeEngine::default().plan(&grid, 3, 0).unwrap();
        assert_eq!(plan.rows.as_slice(), &[3, 2, 4, 5]);

        CascadeEngine::default().resolve(&mut grid, 3, 0).unwrap();
        assert_eq!(grid.column(0).unwrap()[5], Some(Blue));
        assert_eq!(grid.marble_count(), 1);
    }

    #[test]
    fn test_sole_marble_in_column() {
        let mut grid = ColorGrid::from_columns(&[vec![None, None, Some(Black)]]);
        let result = CascadeEngine::default().resolve(&mut grid, 2, 0).unwrap();

        assert_eq!(result.captured.as_slice(), &[Black]);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_empty_slot_is_caller_error() {
        let mut grid = ColorGrid::from_columns(&[vec![None, Some(Red)]]);
        let before = grid.clone();

        let err = CascadeEngine::default().resolve(&mut grid, 0, 0).unwrap_err();
        assert_eq!(err, GameError::EmptySlot { row: 0, col: 0 });
        assert_eq!(grid, before);
    }

    #[test]
    fn test_out_of_bounds_leaves_grid_unchanged() {
        let mut grid = column(&[Red, Blue]);
        let before = grid.clone();

        let err = CascadeEngine::default().resolve(&mut grid, 0, 3).unwrap_err();
        assert!(matches!(err, GameError::OutOfBounds { .. }));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_other_columns_untouched() {
        let mut grid = ColorGrid::from_columns(&[
            vec![Some(Red), Some(Blue), Some(Red)],
            vec![Some(Yellow), Some(Yellow), Some(Yellow)],
        ]);
        CascadeEngine::default().resolve(&mut grid, 1, 0).unwrap();

        assert_eq!(
            grid.column(1).unwrap(),
            vec![Some(Yellow), Some(Yellow), Some(Yellow)]
        );
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let grid = column(&[Red, Red, Blue, Red, Red]);
        let before = grid.clone();

        let plan = CascadeEngine::default().plan(&grid, 2, 0).unwrap();
        assert!(plan.is_chain());
        assert_eq!(grid, before);
    }
}
