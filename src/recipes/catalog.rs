//! Recipe catalog.
//!
//! An ordered, read-only list of recipes. Players choose recipes by their
//! position in the catalog, so order is part of the catalog's identity.

use rustc_hash::FxHashMap;

use super::definition::{Recipe, RecipeId, RecipeSpec};
use crate::core::{Color, ConfigError, GameConfig, GameError};

/// Ordered catalog of recipes with lookup by name.
///
/// ## Example
///
/// ```
/// use potion_dispenser::recipes::RecipeCatalog;
///
/// let catalog = RecipeCatalog::standard();
/// assert_eq!(catalog.len(), 5);
///
/// let fireball = catalog.find("Fireball").unwrap();
/// assert_eq!(fireball.points, 10);
/// assert_eq!(catalog.choose(0).unwrap().name, "Fireball");
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    by_name: FxHashMap<String, RecipeId>,
}

impl RecipeCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The five potions of the base game.
    #[must_use]
    pub fn standard() -> Self {
        use Color::{Black, Blue, Red, Yellow};

        let mut catalog = Self::new();
        catalog.register("Fireball", &[Red, Yellow], 10);
        catalog.register("Ice Blast", &[Blue, Black], 15);
        catalog.register("Abyssal Draft", &[Red, Yellow, Blue, Black], 8);
        catalog.register("Magnetic Attraction", &[Black, Black], 6);
        catalog.register("Prismatic Joy", &[Yellow, Blue, Red, Red], 3);
        catalog
    }

    /// Build a catalog from configuration records, in order.
    pub fn from_specs(specs: &[RecipeSpec]) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for spec in specs {
            if catalog.by_name.contains_key(&spec.name) {
                return Err(ConfigError::Validation(format!(
                    "duplicate recipe name '{}'",
                    spec.name
                )));
            }
            catalog.register(spec.name.clone(), &spec.ingredients, spec.points);
        }
        Ok(catalog)
    }

    /// The catalog a configuration asks for: its inline recipes, or the
    /// standard catalog when none are given.
    pub fn for_config(config: &GameConfig) -> Result<Self, ConfigError> {
        if config.recipes.is_empty() {
            Ok(Self::standard())
        } else {
            Self::from_specs(&config.recipes)
        }
    }

    /// Append a recipe and return its ID.
    ///
    /// Panics if a recipe with the same name already exists.
    pub fn register(&mut self, name: impl Into<String>, ingredients: &[Color], points: u32) -> RecipeId {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            panic!("Recipe '{}' already registered", name);
        }

        let id = RecipeId::new(self.recipes.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.recipes.push(Recipe::new(id, name, ingredients, points));
        id
    }

    /// Look up a recipe by catalog position.
    #[must_use]
    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id.index())
    }

    /// Resolve a player's choice (0-based catalog position).
    pub fn choose(&self, choice: usize) -> Result<&Recipe, GameError> {
        self.recipes.get(choice).ok_or(GameError::InvalidRecipeChoice {
            choice,
            available: self.recipes.len(),
        })
    }

    /// Look up a recipe by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Recipe> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Iterate in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_order() {
        let catalog = RecipeCatalog::standard();
        let names: Vec<_> = catalog.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "Fireball",
                "Ice Blast",
                "Abyssal Draft",
                "Magnetic Attraction",
                "Prismatic Joy"
            ]
        );
        for (i, recipe) in catalog.iter().enumerate() {
            assert_eq!(recipe.id.index(), i);
        }
    }

    #[test]
    fn test_choose_out_of_range() {
        let catalog = RecipeCatalog::standard();
        assert_eq!(
            catalog.choose(5).unwrap_err(),
            GameError::InvalidRecipeChoice {
                choice: 5,
                available: 5
            }
        );
    }

    #[test]
    fn test_find_unknown() {
        assert!(RecipeCatalog::standard().find("Elixir").is_none());
    }

    #[test]
    fn test_from_specs_rejects_duplicates() {
        let spec = RecipeSpec::new("Fireball", &[Color::Red], 1);
        let result = RecipeCatalog::from_specs(&[spec.clone(), spec]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_for_config_prefers_inline_recipes() {
        let config = GameConfig::new().with_recipes(vec![RecipeSpec::new(
            "Quicksilver",
            &[Color::Blue, Color::Blue],
            4,
        )]);
        let catalog = RecipeCatalog::for_config(&config).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.choose(0).unwrap().name, "Quicksilver");

        let standard = RecipeCatalog::for_config(&GameConfig::new()).unwrap();
        assert_eq!(standard.len(), 5);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_register_duplicate_panics() {
        let mut catalog = RecipeCatalog::standard();
        catalog.register("Fireball", &[Color::Red], 1);
    }
}
