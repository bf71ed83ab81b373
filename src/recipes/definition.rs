//! Recipe definitions - static potion data.
//!
//! A `Recipe` is immutable once the catalog is loaded. Progress toward a
//! recipe lives with the player who selected it, in a
//! [`RecipeTile`](crate::players::RecipeTile).

use serde::{Deserialize, Serialize};

use crate::core::{Color, ColorCounts};

/// Position of a recipe in its catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeId(pub u32);

impl RecipeId {
    /// Create a new recipe ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Catalog index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Recipe({})", self.0)
    }
}

/// A named multiset of required marble colors worth some points.
///
/// ## Example
///
/// ```
/// use potion_dispenser::core::{Color, ColorCounts};
/// use potion_dispenser::recipes::{Recipe, RecipeId};
///
/// let fireball = Recipe::new(RecipeId::new(0), "Fireball", &[Color::Red, Color::Yellow], 10);
///
/// let held = ColorCounts::from_colors(&[Color::Yellow, Color::Red, Color::Red]);
/// assert!(fireball.is_satisfied_by(&held));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    /// Ingredients needed, fixed at catalog load.
    pub required: ColorCounts,
    pub points: u32,
}

impl Recipe {
    #[must_use]
    pub fn new(id: RecipeId, name: impl Into<String>, ingredients: &[Color], points: u32) -> Self {
        Self {
            id,
            name: name.into(),
            required: ColorCounts::from_colors(ingredients),
            points,
        }
    }

    /// Completion predicate: `required` is a sub-multiset of `assigned`.
    #[must_use]
    pub fn is_satisfied_by(&self, assigned: &ColorCounts) -> bool {
        self.required.is_subset_of(assigned)
    }
}

impl std::fmt::Display for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({} pts)", self.name, self.required, self.points)
    }
}

/// Serialized form of a recipe, as it appears in configuration files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSpec {
    pub name: String,
    pub ingredients: Vec<Color>,
    pub points: u32,
}

impl RecipeSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, ingredients: &[Color], points: u32) -> Self {
        Self {
            name: name.into(),
            ingredients: ingredients.to_vec(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color::{Black, Blue, Red, Yellow};

    #[test]
    fn test_recipe_id() {
        let id = RecipeId::new(4);
        assert_eq!(id.index(), 4);
        assert_eq!(format!("{}", id), "Recipe(4)");
    }

    #[test]
    fn test_repeated_ingredients_need_repeats() {
        let magnet = Recipe::new(RecipeId::new(3), "Magnetic Attraction", &[Black, Black], 6);

        assert!(!magnet.is_satisfied_by(&ColorCounts::from_colors(&[Black, Blue])));
        assert!(magnet.is_satisfied_by(&ColorCounts::from_colors(&[Black, Black])));
    }

    #[test]
    fn test_surplus_still_satisfies() {
        let fireball = Recipe::new(RecipeId::new(0), "Fireball", &[Red, Yellow], 10);
        let assigned = ColorCounts::from_colors(&[Red, Yellow, Yellow, Blue]);

        assert!(fireball.is_satisfied_by(&assigned));
    }

    #[test]
    fn test_display() {
        let ice = Recipe::new(RecipeId::new(1), "Ice Blast", &[Blue, Black], 15);
        assert_eq!(ice.to_string(), "Ice Blast {Bluex1, Blackx1} (15 pts)");
    }
}
