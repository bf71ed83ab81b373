//! The marble dispenser grid.
//!
//! Columns hang vertically. Row 0 is the top of each column and row
//! `rows - 1` is the accessible end, so gravity moves marbles toward higher
//! row indices and vacated slots collect at the top.
//!
//! Slots are stored in an `im::Vector` so that taking a snapshot of the
//! table at the start of a turn (for rollback) is cheap.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{Color, ColorCounts, GameError, GameRng};

/// One dispenser slot: a marble, or `None` when empty.
pub type Slot = Option<Color>;

/// Fixed-size grid of colored-marble slots organised as columns with gravity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorGrid {
    rows: usize,
    cols: usize,
    /// Row-major: `slots[row * cols + col]`.
    slots: Vector<Slot>,
}

impl ColorGrid {
    /// Fill a `rows x cols` grid at random without letting any color exceed
    /// its cap in `supply`.
    ///
    /// Each slot draws from the remaining supply with probability
    /// proportional to what is left of each color, so caps hold by
    /// construction. Fails with `SupplyExhausted` if the caps cannot cover
    /// every slot.
    ///
    /// ```
    /// use potion_dispenser::core::{ColorCounts, GameRng, ALL_COLORS};
    /// use potion_dispenser::dispenser::ColorGrid;
    ///
    /// let mut rng = GameRng::new(1);
    /// let grid = ColorGrid::initialize(20, 4, &ColorCounts::uniform(20), &mut rng).unwrap();
    ///
    /// assert_eq!(grid.marble_count(), 80);
    /// for color in ALL_COLORS {
    ///     assert_eq!(grid.counts().count(color), 20);
    /// }
    /// ```
    pub fn initialize(
        rows: usize,
        cols: usize,
        supply: &ColorCounts,
        rng: &mut GameRng,
    ) -> Result<Self, GameError> {
        assert!(rows > 0 && cols > 0, "Dispenser must have at least one slot");

        let capacity = rows * cols;
        if supply.total() < capacity {
            return Err(GameError::SupplyExhausted {
                supply: supply.total(),
                capacity,
            });
        }

        let mut remaining = *supply;
        let mut slots = Vector::new();
        for _ in 0..capacity {
            let weights: Vec<u32> = crate::core::ALL_COLORS
                .iter()
                .map(|&c| remaining.count(c) as u32)
                .collect();
            let color = rng
                .choose_weighted(&weights)
                .and_then(Color::from_index)
                .ok_or(GameError::SupplyExhausted {
                    supply: supply.total(),
                    capacity,
                })?;
            remaining.remove(color);
            slots.push_back(Some(color));
        }

        log::debug!("filled {}x{} dispenser from supply {}", rows, cols, supply);
        Ok(Self { rows, cols, slots })
    }

    /// Build a grid from explicit columns, each listed top to bottom.
    ///
    /// Panics if there are no columns or the columns differ in height.
    #[must_use]
    pub fn from_columns(columns: &[Vec<Slot>]) -> Self {
        assert!(!columns.is_empty(), "Dispenser must have at least one column");
        let rows = columns[0].len();
        assert!(rows > 0, "Dispenser must have at least one row");
        assert!(
            columns.iter().all(|c| c.len() == rows),
            "All columns must have the same height"
        );

        let cols = columns.len();
        let slots = (0..rows)
            .flat_map(|row| columns.iter().map(move |column| column[row]))
            .collect();

        Self { rows, cols, slots }
    }

    /// Slots per column.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.cols
    }

    /// Read one slot.
    pub fn at(&self, row: usize, col: usize) -> Result<Slot, GameError> {
        let idx = self.index(row, col)?;
        Ok(self.slots[idx])
    }

    /// Remove the marble at a position and return its color.
    ///
    /// Does not apply gravity; callers compact afterwards.
    pub fn take(&mut self, row: usize, col: usize) -> Result<Color, GameError> {
        let idx = self.index(row, col)?;
        let color = self.slots[idx].ok_or(GameError::EmptySlot { row, col })?;
        self.slots.set(idx, None);
        Ok(color)
    }

    /// Let every marble in a column fall toward the accessible end.
    ///
    /// Relative order of the marbles is preserved; all empties end up at the
    /// top. Compacting an already compact column changes nothing.
    pub fn compact(&mut self, col: usize) -> Result<(), GameError> {
        let column = self.column(col)?;
        let marbles: Vec<Color> = column.iter().flatten().copied().collect();
        let gap = self.rows - marbles.len();

        for row in 0..self.rows {
            let slot = if row < gap { None } else { Some(marbles[row - gap]) };
            self.slots.set(row * self.cols + col, slot);
        }
        Ok(())
    }

    /// One column, top to bottom.
    pub fn column(&self, col: usize) -> Result<Vec<Slot>, GameError> {
        self.index(0, col)?;
        Ok((0..self.rows)
            .map(|row| self.slots[row * self.cols + col])
            .collect())
    }

    /// Number of marbles still in the dispenser.
    #[must_use]
    pub fn marble_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Per-color marble counts.
    #[must_use]
    pub fn counts(&self) -> ColorCounts {
        self.slots.iter().flatten().copied().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marble_count() == 0
    }

    /// Iterate over occupied positions as `(row, col, color)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(idx, slot)| {
            slot.map(|color| (idx / self.cols, idx % self.cols, color))
        })
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, GameError> {
        if row >= self.rows || col >= self.cols {
            return Err(GameError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }
}

impl std::fmt::Display for ColorGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "    ")?;
        for col in 0..self.cols {
            write!(f, " {:>8}", format!("Col {}", col + 1))?;
        }
        writeln!(f)?;

        for row in 0..self.rows {
            write!(f, "{:>3}.", row + 1)?;
            for col in 0..self.cols {
                let name = self.slots[row * self.cols + col].map_or("-", Color::name);
                write!(f, " {:>8}", name)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color::{Black, Blue, Red, Yellow};

    fn single_column(slots: &[Slot]) -> ColorGrid {
        ColorGrid::from_columns(&[slots.to_vec()])
    }

    #[test]
    fn test_from_columns_layout() {
        let grid = ColorGrid::from_columns(&[
            vec![Some(Red), Some(Yellow)],
            vec![Some(Blue), None],
        ]);

        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.at(0, 0), Ok(Some(Red)));
        assert_eq!(grid.at(1, 0), Ok(Some(Yellow)));
        assert_eq!(grid.at(0, 1), Ok(Some(Blue)));
        assert_eq!(grid.at(1, 1), Ok(None));
        assert_eq!(grid.marble_count(), 3);
    }

    #[test]
    fn test_at_out_of_bounds() {
        let grid = single_column(&[Some(Red)]);
        assert!(matches!(grid.at(1, 0), Err(GameError::OutOfBounds { .. })));
        assert!(matches!(grid.at(0, 1), Err(GameError::OutOfBounds { .. })));
    }

    #[test]
    fn test_take_leaves_gap_without_gravity() {
        let mut grid = single_column(&[Some(Red), Some(Blue), Some(Black)]);

        assert_eq!(grid.take(1, 0), Ok(Blue));
        assert_eq!(grid.column(0).unwrap(), vec![Some(Red), None, Some(Black)]);
    }

    #[test]
    fn test_take_empty_slot_fails_without_mutation() {
        let mut grid = single_column(&[None, Some(Red)]);
        let before = grid.clone();

        assert_eq!(grid.take(0, 0), Err(GameError::EmptySlot { row: 0, col: 0 }));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_compact_moves_marbles_down_in_order() {
        let mut grid = single_column(&[Some(Red), None, Some(Blue), None, Some(Black)]);
        grid.compact(0).unwrap();

        assert_eq!(
            grid.column(0).unwrap(),
            vec![None, None, Some(Red), Some(Blue), Some(Black)]
        );
    }

    #[test]
    fn test_compact_twice_is_noop() {
        let mut grid = single_column(&[Some(Yellow), None, Some(Red), None]);
        grid.compact(0).unwrap();
        let once = grid.clone();
        grid.compact(0).unwrap();

        assert_eq!(grid, once);
    }

    #[test]
    fn test_compact_touches_only_its_column() {
        let mut grid = ColorGrid::from_columns(&[
            vec![Some(Red), None],
            vec![Some(Blue), None],
        ]);
        grid.compact(0).unwrap();

        assert_eq!(grid.column(0).unwrap(), vec![None, Some(Red)]);
        assert_eq!(grid.column(1).unwrap(), vec![Some(Blue), None]);
    }

    #[test]
    fn test_initialize_respects_caps() {
        let mut rng = GameRng::new(99);
        let supply = ColorCounts::uniform(5);
        let grid = ColorGrid::initialize(4, 4, &supply, &mut rng).unwrap();

        assert_eq!(grid.marble_count(), 16);
        assert!(grid.counts().is_subset_of(&supply));
    }

    #[test]
    fn test_initialize_is_deterministic() {
        let supply = ColorCounts::uniform(20);
        let a = ColorGrid::initialize(20, 4, &supply, &mut GameRng::new(3)).unwrap();
        let b = ColorGrid::initialize(20, 4, &supply, &mut GameRng::new(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_initialize_supply_exhausted() {
        let mut rng = GameRng::new(1);
        let result = ColorGrid::initialize(20, 4, &ColorCounts::uniform(19), &mut rng);

        assert_eq!(
            result,
            Err(GameError::SupplyExhausted {
                supply: 76,
                capacity: 80
            })
        );
    }

    #[test]
    fn test_occupied_positions() {
        let grid = ColorGrid::from_columns(&[vec![None, Some(Red)], vec![Some(Blue), None]]);
        let occupied: Vec<_> = grid.occupied().collect();

        assert_eq!(occupied, vec![(0, 1, Blue), (1, 0, Red)]);
    }

    #[test]
    fn test_display_marks_empty_slots() {
        let grid = single_column(&[None, Some(Red)]);
        let rendered = grid.to_string();

        assert!(rendered.contains("Col 1"));
        assert!(rendered.contains("  1.        -"));
        assert!(rendered.contains("  2.      Red"));
    }
}
