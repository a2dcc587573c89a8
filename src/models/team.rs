//! Team model: an unordered pair of two distinct players.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, Player, PlayerId, TeamId};

/// A two-player team.
///
/// `player1_id`/`player2_id` keep the order the team was first entered in,
/// which is also the order used for its display label. Identity is the
/// unordered pair; see [`Team::has_members`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create a team with the canonical ID for this pair.
    pub fn new(player1_id: PlayerId, player2_id: PlayerId) -> Self {
        Self {
            id: Self::canonical_id(&player1_id, &player2_id),
            player1_id,
            player2_id,
            created_at: Utc::now(),
        }
    }

    /// ID derived from the sorted pair, independent of argument order.
    pub fn canonical_id(a: &PlayerId, b: &PlayerId) -> TeamId {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        EntityId::generate(&["team", lo.as_str(), hi.as_str()])
    }

    /// Whether this team is exactly the pair `{a, b}`, in either order.
    pub fn has_members(&self, a: &PlayerId, b: &PlayerId) -> bool {
        (&self.player1_id == a && &self.player2_id == b)
            || (&self.player1_id == b && &self.player2_id == a)
    }

    pub fn includes(&self, player_id: &PlayerId) -> bool {
        &self.player1_id == player_id || &self.player2_id == player_id
    }
}

/// Display label for a team, in stored member order.
pub fn team_label(player1: &Player, player2: &Player) -> String {
    format!("{} & {}", player1.name, player2.name)
}
