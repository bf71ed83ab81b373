//! Marble colors and color multisets.
//!
//! `ColorCounts` is the one multiset type used throughout: dispenser supply
//! caps, a player's held marbles, a recipe's required ingredients and the
//! ingredients already assigned to it.

use serde::{Deserialize, Serialize};

/// Number of distinct marble colors.
pub const COLOR_COUNT: usize = 4;

/// Marble colors (order fixed for display and counting).
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    Red = 0,
    Yellow = 1,
    Blue = 2,
    Black = 3,
}

/// All colors in index order.
pub const ALL_COLORS: [Color; COLOR_COUNT] = [Color::Red, Color::Yellow, Color::Blue, Color::Black];

impl Color {
    /// Convert from a 0-based index.
    #[must_use]
    pub fn from_index(idx: usize) -> Option<Color> {
        ALL_COLORS.get(idx).copied()
    }

    /// Get the 0-based index of this color.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Yellow => "Yellow",
            Color::Blue => "Blue",
            Color::Black => "Black",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Multiset of colors stored as one counter per color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorCounts {
    counts: [u16; COLOR_COUNT],
}

impl ColorCounts {
    /// Empty multiset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: [0; COLOR_COUNT],
        }
    }

    /// Same count for every color.
    #[must_use]
    pub const fn uniform(count: u16) -> Self {
        Self {
            counts: [count; COLOR_COUNT],
        }
    }

    /// Build from a list of colors, counting repeats.
    ///
    /// ```
    /// use potion_dispenser::core::{Color, ColorCounts};
    ///
    /// let bag = ColorCounts::from_colors(&[Color::Black, Color::Black, Color::Red]);
    /// assert_eq!(bag.count(Color::Black), 2);
    /// assert_eq!(bag.count(Color::Red), 1);
    /// assert_eq!(bag.total(), 3);
    /// ```
    #[must_use]
    pub fn from_colors(colors: &[Color]) -> Self {
        colors.iter().copied().collect()
    }

    /// Number of marbles of `color`.
    #[must_use]
    pub fn count(&self, color: Color) -> u16 {
        self.counts[color.index()]
    }

    /// Total number of marbles.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Add one marble.
    pub fn add(&mut self, color: Color) {
        self.counts[color.index()] += 1;
    }

    /// Remove one marble. Returns `false` (and leaves the multiset unchanged)
    /// if none of that color is present.
    pub fn remove(&mut self, color: Color) -> bool {
        let slot = &mut self.counts[color.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Multiset inclusion: every color appears here at most as often as in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &ColorCounts) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(mine, theirs)| mine <= theirs)
    }

    /// Colors still needed from `self` once `have` is accounted for.
    #[must_use]
    pub fn missing_from(&self, have: &ColorCounts) -> ColorCounts {
        let mut out = ColorCounts::new();
        for color in ALL_COLORS {
            out.counts[color.index()] = self.count(color).saturating_sub(have.count(color));
        }
        out
    }

    /// Iterate over (color, count) for colors with a non-zero count.
    pub fn iter(&self) -> impl Iterator<Item = (Color, u16)> + '_ {
        ALL_COLORS
            .iter()
            .map(move |&c| (c, self.count(c)))
            .filter(|&(_, n)| n > 0)
    }
}

impl FromIterator<Color> for ColorCounts {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut counts = ColorCounts::new();
        for color in iter {
            counts.add(color);
        }
        counts
    }
}

impl std::fmt::Display for ColorCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(c, n)| format!("{c}x{n}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_index_roundtrip() {
        for (i, color) in ALL_COLORS.iter().enumerate() {
            assert_eq!(color.index(), i);
            assert_eq!(Color::from_index(i), Some(*color));
        }
        assert_eq!(Color::from_index(COLOR_COUNT), None);
    }

    #[test]
    fn test_remove_missing_color_is_noop() {
        let mut bag = ColorCounts::from_colors(&[Color::Red]);
        assert!(!bag.remove(Color::Blue));
        assert_eq!(bag.total(), 1);
        assert!(bag.remove(Color::Red));
        assert!(bag.is_empty());
    }

    #[test]
    fn test_subset_is_multiset_inclusion() {
        let need = ColorCounts::from_colors(&[Color::Black, Color::Black]);
        let one = ColorCounts::from_colors(&[Color::Black, Color::Red]);
        let two = ColorCounts::from_colors(&[Color::Black, Color::Red, Color::Black]);

        assert!(!need.is_subset_of(&one));
        assert!(need.is_subset_of(&two));
        assert!(ColorCounts::new().is_subset_of(&one));
    }

    #[test]
    fn test_missing_from() {
        let need = ColorCounts::from_colors(&[Color::Yellow, Color::Blue, Color::Red, Color::Red]);
        let have = ColorCounts::from_colors(&[Color::Red, Color::Black]);
        let missing = need.missing_from(&have);

        assert_eq!(missing, ColorCounts::from_colors(&[Color::Yellow, Color::Blue, Color::Red]));
    }

    #[test]
    fn test_display() {
        let bag = ColorCounts::from_colors(&[Color::Blue, Color::Red, Color::Blue]);
        assert_eq!(bag.to_string(), "{Redx1, Bluex2}");
    }

    #[test]
    fn test_color_serde_uses_names() {
        let json = serde_json::to_string(&Color::Yellow).unwrap();
        assert_eq!(json, "\"Yellow\"");
    }
}
