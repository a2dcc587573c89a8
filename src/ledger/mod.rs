//! Validated operations over a record store.
//!
//! Every entry point (CLI, API) goes through these functions. Each takes the
//! store handle explicitly; nothing here holds global state.

mod matches;
mod players;
mod teams;

pub use matches::*;
pub use players::*;
pub use teams::*;

use thiserror::Error;

use crate::calculate::IntegrityError;
use crate::storage::StorageError;

/// Errors surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{name} is still on {teams} team(s) and cannot be removed")]
    InUse { name: String, teams: usize },

    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(#[from] IntegrityError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
