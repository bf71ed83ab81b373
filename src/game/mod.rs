//! Match orchestration.
//!
//! - [`Actor`]: the seat-side decision seam, with scripted implementations
//! - [`GameLoop`]: one seat's turn loop over the shared table
//! - [`run_match`]: both seats on their own threads, start to finish
//!
//! With a turn limit, each actor answers from a worker thread of its own so
//! the limit can be enforced while it is still thinking.

pub mod actor;
pub mod game_loop;
mod seat;

pub use actor::{Actor, GreedyActor, RandomActor};
pub use game_loop::{run_match, GameLoop, MatchReport};
