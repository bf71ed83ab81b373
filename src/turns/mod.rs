//! Turn token shared by the two actors.
//!
//! - [`TurnCoordinator`]: owns the table between turns and lends it out
//! - [`TurnGuard`]: exclusive access for one turn, with rollback
//! - [`TurnNotice`]: published on every hand-off

pub mod coordinator;
pub mod notice;

pub use coordinator::{TurnCoordinator, TurnGuard, TurnState};
pub use notice::{TurnNotice, TurnOutcome};
