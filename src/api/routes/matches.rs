use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, ApiJson, ApiQuery, Pagination, PaginationMeta};
use crate::ledger::{self, MatchEntry, MatchFilter, MatchRow};
use crate::models::{Match, TimeOfDay};

#[derive(Debug, Deserialize)]
pub struct ListMatchesParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub player: Option<String>,
    pub location: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub time: Option<TimeOfDay>,
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchRow>,
    pub pagination: PaginationMeta,
}

pub async fn list_matches(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListMatchesParams>,
) -> Result<Json<MatchListResponse>, ApiError> {
    let filter = MatchFilter {
        player: params.player,
        location: params.location,
        from: params.from,
        to: params.to,
        time: params.time,
    };
    let rows = ledger::list_matches(state.store.as_ref(), &filter)?;

    let pagination = Pagination::new(params.page, params.page_size);
    let meta = PaginationMeta::new(&pagination, rows.len() as u32);

    Ok(Json(MatchListResponse {
        matches: pagination.slice(&rows).to_vec(),
        pagination: meta,
    }))
}

pub async fn record_match(
    State(state): State<AppState>,
    ApiJson(entry): ApiJson<MatchEntry>,
) -> Result<(StatusCode, Json<Match>), ApiError> {
    let _guard = state.write_lock.lock().await;
    let m = ledger::record_match(state.store.as_ref(), &entry, &state.config.locations)?;
    Ok((StatusCode::CREATED, Json(m)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::api::build_router;
    use crate::api::routes::test_support::{get_json, post_json, test_state};
    use crate::api::state::AppState;
    use crate::ledger::add_player;
    use crate::models::Player;

    fn roster(state: &AppState) -> Vec<Player> {
        ["Alice", "Bob", "Carol", "Dan"]
            .into_iter()
            .map(|n| add_player(state.store.as_ref(), n).unwrap())
            .collect()
    }

    fn entry(p: &[Player], s1: i64, s2: i64, date: &str) -> Value {
        json!({
            "team1": [p[0].id, p[1].id],
            "team2": [p[2].id, p[3].id],
            "score_team1": s1,
            "score_team2": s2,
            "location": "Fifth Street Hermosa",
            "date": date,
            "time": "Morning",
            "notes": "first game of the day"
        })
    }

    #[tokio::test]
    async fn test_record_and_list_matches() {
        let state = test_state();
        let p = roster(&state);

        let (status, json) = post_json(
            build_router(state.clone()),
            "/api/matches",
            entry(&p, 21, 15, "2025-07-01"),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["score_team1"], 21);
        assert_eq!(json["notes"], "first game of the day");

        post_json(
            build_router(state.clone()),
            "/api/matches",
            entry(&p, 19, 21, "2025-07-08"),
        )
        .await;

        let (status, json) = get_json(build_router(state), "/api/matches").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json["matches"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["date"], "2025-07-08");
        assert_eq!(rows[0]["team1"], "Alice & Bob");
        assert_eq!(rows[0]["winner"], "Carol & Dan");
        assert_eq!(json["pagination"]["total_items"], 2);
    }

    #[tokio::test]
    async fn test_list_matches_query_filters_and_paging() {
        let state = test_state();
        let p = roster(&state);
        for (i, date) in ["2025-07-01", "2025-07-02", "2025-07-03"].iter().enumerate() {
            post_json(
                build_router(state.clone()),
                "/api/matches",
                entry(&p, 21, i as i64, date),
            )
            .await;
        }

        let (status, json) = get_json(
            build_router(state.clone()),
            "/api/matches?from=2025-07-02&to=2025-07-03&time=Morning&player=carol",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["matches"].as_array().unwrap().len(), 2);

        let (_, json) = get_json(build_router(state), "/api/matches?page=2&page_size=2").await;
        assert_eq!(json["matches"].as_array().unwrap().len(), 1);
        assert_eq!(json["matches"][0]["date"], "2025-07-01");
        assert_eq!(json["pagination"]["total_pages"], 2);
    }

    #[tokio::test]
    async fn test_negative_score_is_bad_request() {
        let state = test_state();
        let p = roster(&state);

        let (status, json) = post_json(
            build_router(state.clone()),
            "/api/matches",
            entry(&p, -3, 21, "2025-07-01"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("score"));

        let (_, json) = get_json(build_router(state), "/api/teams").await;
        assert!(json["teams"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let state = test_state();
        let p = roster(&state);

        let mut body = entry(&p, 21, 15, "2025-07-01");
        body["time"] = json!("Evening");
        let (status, json) = post_json(build_router(state.clone()), "/api/matches", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let mut body = entry(&p, 21, 15, "2025-07-01");
        body["score_team1"] = json!("x");
        let (status, json) = post_json(build_router(state), "/api/matches", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_query_uses_error_envelope() {
        let state = test_state();

        let (status, json) = get_json(build_router(state), "/api/matches?from=notadate").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_unknown_location_is_bad_request() {
        let state = test_state();
        let p = roster(&state);
        let mut body = entry(&p, 21, 15, "2025-07-01");
        body["location"] = json!("The Moon");

        let (status, _) = post_json(build_router(state), "/api/matches", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
