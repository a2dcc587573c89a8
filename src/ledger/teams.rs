use serde::Serialize;
use tracing::{debug, info, warn};

use super::LedgerError;
use crate::calculate::RosterIndex;
use crate::models::{PlayerId, Team, TeamId};
use crate::storage::{EntityType, RecordStore, StorageError};

/// Return the team for the unordered pair `{p1, p2}`, creating it if needed.
///
/// The same pair always resolves to the same team regardless of argument
/// order. A new team keeps `p1` as its first member.
pub fn resolve_team(
    store: &dyn RecordStore,
    p1: &PlayerId,
    p2: &PlayerId,
) -> Result<TeamId, LedgerError> {
    if p1 == p2 {
        return Err(LedgerError::Validation(
            "a team needs two different players".to_string(),
        ));
    }

    for id in [p1, p2] {
        if store.player(id)?.is_none() {
            return Err(LedgerError::NotFound(format!("player {}", id)));
        }
    }

    if let Some(team) = store.teams()?.into_iter().find(|t| t.has_members(p1, p2)) {
        debug!("Resolved existing team {}", team.id);
        return Ok(team.id);
    }

    match store.insert(Team::new(p1.clone(), p2.clone()).into()) {
        Ok(id) => {
            info!("Created team {} for {} and {}", id, p1, p2);
            Ok(id)
        }
        // Someone else created this pair between our lookup and insert.
        Err(StorageError::DuplicateId {
            kind: EntityType::Team,
            id,
        }) => {
            warn!("Team {} was created concurrently, reusing it", id);
            Ok(id)
        }
        Err(e) => Err(e.into()),
    }
}

/// A team with its display label.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub id: TeamId,
    pub label: String,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
}

pub fn list_teams(store: &dyn RecordStore) -> Result<Vec<TeamSummary>, LedgerError> {
    let players = store.players()?;
    let teams = store.teams()?;
    let index = RosterIndex::new(&players, &teams);

    teams
        .iter()
        .map(|team| -> Result<TeamSummary, LedgerError> {
            let resolved = index.resolve(team)?;
            Ok(TeamSummary {
                id: team.id.clone(),
                label: resolved.label(),
                player1_id: team.player1_id.clone(),
                player2_id: team.player2_id.clone(),
            })
        })
        .collect()
}
