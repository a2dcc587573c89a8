pub mod matches;
pub mod players;
pub mod stats;
pub mod teams;

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::api::state::AppState;
    use crate::config::AppConfig;
    use crate::storage::MemoryStore;

    pub fn test_state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), AppConfig::default())
    }

    async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, req).await
    }

    pub async fn delete(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        send(app, req).await
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::test_support::{get_json, test_state};
    use crate::api::build_router;

    #[tokio::test]
    async fn test_health() {
        let (status, json) = get_json(build_router(test_state()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }
}
