//! Player model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, PlayerId};

/// A rostered player. Names are not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    /// Display name (trimmed)
    pub name: String,

    /// When this record was created
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Create a new Player with a fresh random ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::random(),
            name: name.into().trim().to_string(),
            created_at: Utc::now(),
        }
    }
}
