//! Match configuration.
//!
//! `GameConfig` collects every tunable of a match: dispenser dimensions, the
//! cascade rule, the seed, turn limits and, optionally, an inline recipe
//! catalog. It can be built in code with the `with_*` builders or loaded
//! from TOML:
//!
//! ```toml
//! rows = 20
//! columns = 4
//! seed = 7
//! max_turns = 60
//! turn_timeout_ms = 2000
//!
//! [cascade]
//! min_run = 3
//!
//! [[recipes]]
//! name = "Fireball"
//! ingredients = ["Red", "Yellow"]
//! points = 10
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::color::{ColorCounts, COLOR_COUNT};
use super::error::ConfigError;
use super::player::PlayerId;
use crate::dispenser::CascadeRules;
use crate::recipes::RecipeSpec;

/// Default dispenser height (marbles per column).
pub const DEFAULT_ROWS: usize = 20;

/// Default number of dispenser columns.
pub const DEFAULT_COLUMNS: usize = 4;

/// Complete match configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Slots per column.
    pub rows: usize,

    /// Number of dispenser columns.
    pub columns: usize,

    /// Match seed. Drives the dispenser fill and scripted actors.
    pub seed: u64,

    /// Seat that holds the turn token first.
    pub starting_player: PlayerId,

    /// Chain-reaction rule.
    pub cascade: CascadeRules,

    /// Per-turn time budget. `None` disables the deadline.
    pub turn_timeout_ms: Option<u64>,

    /// Stop after this many turns even if marbles remain.
    pub max_turns: Option<u32>,

    /// How many times an actor is re-prompted after a rejected decision.
    pub max_attempts: u32,

    /// Inline catalog. Empty means the standard catalog.
    pub recipes: Vec<RecipeSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            seed: 0,
            starting_player: PlayerId::FIRST,
            cascade: CascadeRules::default(),
            turn_timeout_ms: None,
            max_turns: None,
            max_attempts: 8,
            recipes: Vec::new(),
        }
    }
}

impl GameConfig {
    /// Create the default configuration (20x4 dispenser, seed 0).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dispenser dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, rows: usize, columns: usize) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    /// Set the match seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the seat that acts first.
    #[must_use]
    pub fn with_starting_player(mut self, player: PlayerId) -> Self {
        self.starting_player = player;
        self
    }

    /// Set the minimum combined run that triggers a chain reaction.
    #[must_use]
    pub fn with_min_run(mut self, min_run: usize) -> Self {
        self.cascade.min_run = min_run;
        self
    }

    /// Give every turn a deadline.
    #[must_use]
    pub fn with_turn_timeout(mut self, limit: Duration) -> Self {
        self.turn_timeout_ms = Some(limit.as_millis() as u64);
        self
    }

    /// Cap the match length.
    #[must_use]
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = Some(turns);
        self
    }

    /// Set the re-prompt budget per decision.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Replace the catalog with an inline one.
    #[must_use]
    pub fn with_recipes(mut self, recipes: Vec<RecipeSpec>) -> Self {
        self.recipes = recipes;
        self
    }

    /// Total number of dispenser slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.rows * self.columns
    }

    /// Balanced supply caps: an equal share of the capacity per color.
    #[must_use]
    pub fn supply(&self) -> ColorCounts {
        ColorCounts::uniform((self.capacity() / COLOR_COUNT) as u16)
    }

    /// Per-turn deadline, if configured.
    #[must_use]
    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout_ms.map(Duration::from_millis)
    }

    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::Validation(
                "rows and columns must be > 0".into(),
            ));
        }
        if self.capacity() % COLOR_COUNT != 0 {
            return Err(ConfigError::Validation(format!(
                "capacity {} must divide evenly among {} colors",
                self.capacity(),
                COLOR_COUNT
            )));
        }
        if self.cascade.min_run < 2 {
            return Err(ConfigError::Validation(
                "cascade.min_run must be >= 2".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_attempts must be > 0".into(),
            ));
        }
        if self.turn_timeout_ms == Some(0) {
            return Err(ConfigError::Validation(
                "turn_timeout_ms must be > 0".into(),
            ));
        }
        for recipe in &self.recipes {
            if recipe.ingredients.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "recipe '{}' has no ingredients",
                    recipe.name
                )));
            }
        }
        Ok(())
    }
}
