use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, ApiJson};
use crate::ledger::{self, TeamSummary};
use crate::models::{PlayerId, TeamId};

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub teams: Vec<TeamSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveTeamRequest {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
}

#[derive(Debug, Serialize)]
pub struct ResolveTeamResponse {
    pub team_id: TeamId,
}

pub async fn list_teams(State(state): State<AppState>) -> Result<Json<TeamsResponse>, ApiError> {
    let teams = ledger::list_teams(state.store.as_ref())?;
    Ok(Json(TeamsResponse { teams }))
}

pub async fn resolve_team(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResolveTeamRequest>,
) -> Result<Json<ResolveTeamResponse>, ApiError> {
    let _guard = state.write_lock.lock().await;
    let team_id = ledger::resolve_team(state.store.as_ref(), &req.player1_id, &req.player2_id)?;
    Ok(Json(ResolveTeamResponse { team_id }))
}
