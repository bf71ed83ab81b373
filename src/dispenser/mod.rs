//! The shared marble dispenser and its chain-reaction rule.
//!
//! - [`ColorGrid`]: fixed grid of slots, `take` and `compact` primitives.
//! - [`CascadeEngine`]: turns one chosen slot into the full set of captured
//!   marbles and leaves the column settled.

mod cascade;
mod grid;

pub use cascade::{CascadeEngine, CascadePlan, CascadeResult, CascadeRules};
pub use grid::{ColorGrid, Slot};
