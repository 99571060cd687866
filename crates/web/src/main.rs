use axum::{
    routing::{get, post},
    Router,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use chess_explorer_core::{AnalysisSession, Database, Messages, Subscription};

mod routes;

const DEFAULT_DB: &str = "chess_explorer.db";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// A hosted session and the handle through which settings reach it
pub struct SessionEntry {
    pub session: AnalysisSession,
    pub settings: Subscription,
}

pub struct AppState {
    pub db: Mutex<Database>,
    pub sessions: Mutex<HashMap<u64, SessionEntry>>,
    pub next_session: AtomicU64,
    pub messages: Messages,
}

impl AppState {
    pub fn new(db: Database, messages: Messages) -> Self {
        Self {
            db: Mutex::new(db),
            sessions: Mutex::new(HashMap::new()),
            next_session: AtomicU64::new(1),
            messages,
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/settings", get(routes::get_settings).put(routes::put_settings))
        .route("/players", post(routes::create_player))
        .route("/games", post(routes::create_game))
        .route("/games/:gid/analyses", get(routes::analysis::list_for_game))
        .route("/analyses/:id/pgn", get(routes::analysis::export_pgn))
        .route("/sessions", post(routes::session::create))
        .route(
            "/sessions/:id",
            get(routes::session::show).delete(routes::session::close),
        )
        .route("/sessions/:id/drag", post(routes::session::drag))
        .route("/sessions/:id/drop", post(routes::session::drop_piece))
        .route("/sessions/:id/tap", post(routes::session::tap))
        .route("/sessions/:id/hover", post(routes::session::hover))
        .route("/sessions/:id/promotion", post(routes::session::promotion))
        .route("/sessions/:id/flip", post(routes::session::flip))
        .route("/sessions/:id/navigate", post(routes::session::navigate))
        .route("/sessions/:id/remove", post(routes::session::remove))
        .route("/sessions/:id/quality", post(routes::session::quality))
        .route("/sessions/:id/position", post(routes::session::load_position))
        .route("/sessions/:id/pgn", post(routes::session::import_pgn))
        .route("/sessions/:id/save", post(routes::session::save))
        .route("/sessions/:id/share", post(routes::session::share))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = std::env::var("CHESS_EXPLORER_DB").unwrap_or_else(|_| DEFAULT_DB.to_string());
    let addr = std::env::var("CHESS_EXPLORER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let db = Database::open(&db_path)?;
    info!("Using database {}", db_path);

    let state = Arc::new(AppState::new(db, Messages::default()));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use chess_explorer_core::notation::STANDARD_START;
    use chess_explorer_core::{AnalysisRecord, AnalysisStore, StoredNode};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state() -> Arc<AppState> {
        let db = Database::open_in_memory().unwrap();
        Arc::new(AppState::new(db, Messages::default()))
    }

    async fn call(state: &Arc<AppState>, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let state = state();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let state = state();
        call(&state, "POST", "/players", json!({"pid": "p1", "name": "Alice"})).await;
        call(&state, "POST", "/games", json!({"gid": "g1", "name": "Casual"})).await;
        let (status, _) = call(&state, "PUT", "/settings", json!({"player_id": "p1"})).await;
        assert_eq!(status, StatusCode::OK);

        let (status, created) = call(&state, "POST", "/sessions", json!({"game_id": "g1"})).await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_u64().unwrap();
        assert_eq!(created["can_save"], json!(true));

        let (_, moved) = call(
            &state,
            "POST",
            &format!("/sessions/{}/drop", id),
            json!({"from": "e2", "to": "e4"}),
        )
        .await;
        assert!(moved["events"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["type"] == "move_made" && e["san"] == "e4"));
        assert_eq!(moved["session"]["tree"].as_array().unwrap().len(), 2);

        let (status, saved) = call(&state, "POST", &format!("/sessions/{}/save", id), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let analysis_id = saved["session"]["analysis_id"].as_i64().unwrap();

        let request = Request::builder()
            .uri(format!("/analyses/{}/pgn", analysis_id))
            .body(Body::empty())
            .unwrap();
        let response = app(state.clone()).oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("1. e4 *"));

        let (status, _) = call(&state, "DELETE", &format!("/sessions/{}", id), json!({})).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&state, "GET", &format!("/sessions/{}", id), json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let state = state();
        let (status, _) = call(&state, "POST", "/sessions", json!({"fen": "not a position"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, created) = call(&state, "POST", "/sessions", json!({})).await;
        let id = created["id"].as_u64().unwrap();
        let (status, _) = call(
            &state,
            "POST",
            &format!("/sessions/{}/drop", id),
            json!({"from": "z9", "to": "e4"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&state, "POST", &format!("/sessions/{}/save", id), json!({})).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, shared) = call(
            &state,
            "POST",
            &format!("/sessions/{}/share", id),
            json!({"target": "analysis"}),
        )
        .await;
        assert_eq!(shared["warning"], json!(Messages::default().save_before_copy));
    }

    #[tokio::test]
    async fn test_unreplayable_analysis_is_refused() {
        let state = state();
        let analysis_id = {
            let db = state.db.lock().unwrap();
            db.insert_player("p1", "Alice").unwrap();
            db.insert_game("g1", "Casual", STANDARD_START).unwrap();
            let record = AnalysisRecord {
                id: None,
                timestamp: 0,
                player_id: "p1".to_string(),
                game_id: "g1".to_string(),
                root_position: STANDARD_START.to_string(),
                starting_move: 1,
                tree: StoredNode {
                    mv: "[0]".to_string(),
                    order: 0,
                    quality: None,
                    children: vec![StoredNode {
                        mv: "Nf6".to_string(),
                        order: 1,
                        quality: None,
                        children: Vec::new(),
                    }],
                },
            };
            db.create_analysis(&record).unwrap()
        };

        let (status, body) = call(
            &state,
            "POST",
            "/sessions",
            json!({"analysis_id": analysis_id}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!(Messages::default().cannot_load_analysis));
        assert!(state.sessions.lock().unwrap().is_empty());
    }
}
