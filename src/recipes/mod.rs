//! Recipe system: definitions and the catalog players draft from.
//!
//! ## Key Types
//!
//! - `RecipeId`: Position of a recipe in its catalog
//! - `Recipe`: Name, required ingredient multiset, points
//! - `RecipeSpec`: Recipe as written in configuration
//! - `RecipeCatalog`: Ordered, read-only recipe list

pub mod catalog;
pub mod definition;

pub use catalog::RecipeCatalog;
pub use definition::{Recipe, RecipeId, RecipeSpec};
