//! Core data models for the match tracker.

mod game;
mod ids;
mod player;
mod stats;
mod team;

pub use game::*;
pub use ids::*;
pub use player::*;
pub use stats::*;
pub use team::*;
