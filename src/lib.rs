//! # Volley Tracker
//!
//! Records beach volleyball doubles matches and derives win/loss records
//! per player and per two-player team.
//!
//! ## Architecture
//!
//! - **models**: Players, teams, matches and derived records
//! - **storage**: The record store seam plus JSONL and in-memory stores
//! - **calculate**: Aggregation of match history into records
//! - **ledger**: Validated operations (roster, team resolution, match entry)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ledger;
pub mod models;
pub mod storage;

pub use models::*;
