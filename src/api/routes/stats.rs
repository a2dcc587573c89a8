use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::ledger;
use crate::models::{RankedRecord, StatsReport};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub report: StatsReport,
    pub ranked_players: Vec<RankedRecord>,
    pub ranked_teams: Vec<RankedRecord>,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let report = ledger::dashboard(state.store.as_ref())?;
    let ranked_players = report.ranked_players();
    let ranked_teams = report.ranked_teams();

    Ok(Json(StatsResponse {
        report,
        ranked_players,
        ranked_teams,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use serde_json::json;

    use crate::api::build_router;
    use crate::api::routes::test_support::{delete, get_json, test_state};
    use crate::ledger::{add_player, record_match, MatchEntry};
    use crate::models::{Match, TimeOfDay};

    #[tokio::test]
    async fn test_stats_empty_history() {
        let state = test_state();
        add_player(state.store.as_ref(), "Alice").unwrap();

        let (status, json) = get_json(build_router(state), "/api/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["matches"], 0);
        assert_eq!(
            json["players"]["Alice"],
            json!({ "wins": 0, "losses": 0, "games": 0 })
        );
        assert_eq!(json["teams"], json!({}));
    }

    #[tokio::test]
    async fn test_stats_after_matches() {
        let state = test_state();
        let p: Vec<_> = ["Alice", "Bob", "Carol", "Dan"]
            .into_iter()
            .map(|n| add_player(state.store.as_ref(), n).unwrap())
            .collect();
        let entry = MatchEntry {
            team1: [p[0].id.clone(), p[1].id.clone()],
            team2: [p[2].id.clone(), p[3].id.clone()],
            score_team1: 21,
            score_team2: 15,
            location: "Fifth Street Hermosa".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            time: TimeOfDay::Afternoon,
            notes: None,
        };
        record_match(state.store.as_ref(), &entry, &state.config.locations).unwrap();

        let (status, json) = get_json(build_router(state.clone()), "/api/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["matches"], 1);
        assert_eq!(
            json["teams"]["Alice & Bob"],
            json!({ "wins": 1, "losses": 0, "games": 1 })
        );
        assert_eq!(json["ranked_teams"][0]["name"], "Alice & Bob");
        assert_eq!(json["ranked_players"].as_array().unwrap().len(), 4);

        // Players on a team cannot be removed
        let uri = format!("/api/players/{}", p[0].id);
        let (status, json) = delete(build_router(state), &uri).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_stats_dangling_reference_is_conflict() {
        let state = test_state();
        let orphan = Match::new(
            "t1".into(),
            "t2".into(),
            21,
            10,
            "Fifth Street Hermosa".to_string(),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            TimeOfDay::Morning,
            None,
        );
        state.store.insert(orphan.into()).unwrap();

        let (status, json) = get_json(build_router(state), "/api/stats").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("unknown team"));
    }
}
