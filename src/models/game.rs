//! Match model: a single recorded game between two teams.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EntityId, MatchId, TeamId};

/// Session a match was played in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "Morning"),
            TimeOfDay::Afternoon => write!(f, "Afternoon"),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "am" => Ok(TimeOfDay::Morning),
            "afternoon" | "pm" => Ok(TimeOfDay::Afternoon),
            other => Err(format!(
                "unknown time of day '{}' (expected Morning or Afternoon)",
                other
            )),
        }
    }
}

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team1,
    Team2,
}

/// A recorded match. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,

    pub team1_id: TeamId,

    pub team2_id: TeamId,

    pub score_team1: u32,

    pub score_team2: u32,

    /// Court / beach name
    pub location: String,

    pub date: NaiveDate,

    pub time: TimeOfDay,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When this record was created
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Create a new Match with a fresh random ID.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        team1_id: TeamId,
        team2_id: TeamId,
        score_team1: u32,
        score_team2: u32,
        location: String,
        date: NaiveDate,
        time: TimeOfDay,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: EntityId::random(),
            team1_id,
            team2_id,
            score_team1,
            score_team2,
            location,
            date,
            time,
            notes,
            created_at: Utc::now(),
        }
    }

    /// The winning side. Team1 wins only with a strictly higher score, so a
    /// tied match is credited to team2.
    pub fn winner(&self) -> Side {
        if self.score_team1 > self.score_team2 {
            Side::Team1
        } else {
            Side::Team2
        }
    }

    pub fn team_id(&self, side: Side) -> &TeamId {
        match side {
            Side::Team1 => &self.team1_id,
            Side::Team2 => &self.team2_id,
        }
    }
}
