use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, ApiJson};
use crate::ledger;
use crate::models::Player;

#[derive(Debug, Serialize)]
pub struct PlayersResponse {
    pub players: Vec<Player>,
}

#[derive(Debug, Deserialize)]
pub struct NewPlayerRequest {
    pub name: String,
}

pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<PlayersResponse>, ApiError> {
    let players = ledger::list_players(state.store.as_ref())?;
    Ok(Json(PlayersResponse { players }))
}

pub async fn add_player(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewPlayerRequest>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let _guard = state.write_lock.lock().await;
    let player = ledger::add_player(state.store.as_ref(), &req.name)?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn remove_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Player>, ApiError> {
    let _guard = state.write_lock.lock().await;
    let player = ledger::remove_player(state.store.as_ref(), &id.into())?;
    Ok(Json(player))
}
