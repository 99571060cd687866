use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shakmaty::{Color, Role, Square};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info};

use chess_explorer_core::notation::STANDARD_START;
use chess_explorer_core::{
    AnalysisSession, BoardEvent, Configuration, Error, MoveTree, NodeId, Quality, SessionUpdate,
};

use crate::AppState;

pub mod analysis;
pub mod session;

/// Error answered to the client as `{"error": ...}`
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    SessionNotFound(u64),
    BadRequest(String),
    /// A stored analysis that no longer replays; carries the text to show
    Unloadable(String),
    Poisoned,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::SessionNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Session {} not found", id))
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unloadable(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Poisoned => {
                error!("State lock poisoned");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
            ApiError::Core(e) => {
                let status = match &e {
                    Error::InvalidPosition(_)
                    | Error::IllegalMove { .. }
                    | Error::MalformedTree(_)
                    | Error::Pgn(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    Error::NodeNotFound(_) | Error::AnalysisNotFound(_) => StatusCode::NOT_FOUND,
                    Error::SaveUnavailable(_) => StatusCode::CONFLICT,
                    Error::Database(_) | Error::Json(_) | Error::Io(_) => {
                        error!("{}", e);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> ApiResult<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| ApiError::Poisoned)
}

pub(crate) fn parse_square(name: &str) -> ApiResult<Square> {
    name.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid square '{}'", name)))
}

pub(crate) fn parse_role(name: &str) -> ApiResult<Role> {
    match name.chars().next().and_then(Role::from_char) {
        Some(role) if name.len() == 1 && role != Role::Pawn && role != Role::King => Ok(role),
        _ => Err(ApiError::BadRequest(format!("Invalid promotion piece '{}'", name))),
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Board event as sent to the client
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventView {
    Highlight { squares: Vec<String> },
    ClearHighlights,
    SnapBack,
    ShowPosition { fen: String, animate: bool },
    LastMove { from: String, to: String },
    PlaySound { sound: &'static str },
    PromotionRequested { side: &'static str },
    MoveMade { san: String },
    GameOver { message: String },
    Warning { message: String },
}

impl From<&BoardEvent> for EventView {
    fn from(event: &BoardEvent) -> Self {
        match event {
            BoardEvent::Highlight(squares) => EventView::Highlight {
                squares: squares.iter().map(|s| s.to_string()).collect(),
            },
            BoardEvent::ClearHighlights => EventView::ClearHighlights,
            BoardEvent::SnapBack => EventView::SnapBack,
            BoardEvent::ShowPosition { fen, animate } => EventView::ShowPosition {
                fen: fen.clone(),
                animate: *animate,
            },
            BoardEvent::LastMove { from, to } => EventView::LastMove {
                from: from.to_string(),
                to: to.to_string(),
            },
            BoardEvent::PlaySound(sound) => EventView::PlaySound {
                sound: sound.as_str(),
            },
            BoardEvent::PromotionRequested { side } => EventView::PromotionRequested {
                side: color_name(*side),
            },
            BoardEvent::MoveMade(san) => EventView::MoveMade { san: san.clone() },
            BoardEvent::GameOver(message) => EventView::GameOver {
                message: message.clone(),
            },
            BoardEvent::Warning(message) => EventView::Warning {
                message: message.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NodeView {
    pub id: usize,
    #[serde(rename = "move")]
    pub mv: String,
    pub order: u32,
    pub quality: Option<Quality>,
    pub position: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// The tree in pre-order, root first
fn tree_view(tree: &MoveTree) -> Vec<NodeView> {
    let mut nodes = Vec::new();
    let mut pending: Vec<NodeId> = vec![tree.root()];
    while let Some(id) = pending.pop() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        nodes.push(NodeView {
            id: id.index(),
            mv: node.mv.clone(),
            order: node.order,
            quality: node.quality,
            position: node.position.clone(),
            parent: node.parent().map(NodeId::index),
            children: node.children().iter().map(|c| c.index()).collect(),
        });
        pending.extend(node.children().iter().rev());
    }
    nodes
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: u64,
    pub fen: String,
    pub state: &'static str,
    pub turn: &'static str,
    pub orientation: &'static str,
    pub status: String,
    pub current: usize,
    pub starting_move: u32,
    pub can_save: bool,
    pub analysis_id: Option<i64>,
    pub tree: Vec<NodeView>,
}

impl SessionView {
    pub fn new(id: u64, session: &AnalysisSession) -> Self {
        let board = session.board();
        Self {
            id,
            fen: board.fen(),
            state: board.state().as_str(),
            turn: color_name(board.turn()),
            orientation: color_name(board.orientation()),
            status: session.status_text().to_string(),
            current: session.tree().current().index(),
            starting_move: session.starting_move(),
            can_save: session.can_save(),
            analysis_id: session.analysis().and_then(|a| a.id),
            tree: tree_view(session.tree()),
        }
    }
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Configuration>> {
    let db = lock(&state.db)?;
    Ok(Json(db.load_configuration()?))
}

/// Stores the configuration and pushes it into every hosted session
pub async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(config): Json<Configuration>,
) -> ApiResult<Json<Configuration>> {
    lock(&state.db)?.save_configuration(&config)?;

    let mut sessions = lock(&state.sessions)?;
    for entry in sessions.values_mut() {
        if entry.settings.is_active() {
            entry
                .session
                .handle_update(SessionUpdate::ConfigurationChanged(config.clone()))?;
        }
    }
    info!("Settings updated for {} sessions", sessions.len());
    Ok(Json(config))
}

#[derive(Deserialize)]
pub struct PlayerForm {
    pub pid: String,
    pub name: String,
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(form): Json<PlayerForm>,
) -> ApiResult<StatusCode> {
    lock(&state.db)?.insert_player(form.pid.trim(), form.name.trim())?;
    Ok(StatusCode::CREATED)
}

#[derive(Deserialize)]
pub struct GameForm {
    pub gid: String,
    pub name: String,
    pub position: Option<String>,
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(form): Json<GameForm>,
) -> ApiResult<StatusCode> {
    let position = form.position.as_deref().unwrap_or(STANDARD_START);
    chess_explorer_core::notation::parse_position(position)?;
    lock(&state.db)?.insert_game(form.gid.trim(), form.name.trim(), position)?;
    Ok(StatusCode::CREATED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_explorer_core::Sound;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_square("e4").unwrap(), Square::E4);
        assert!(parse_square("i9").is_err());
        assert_eq!(parse_role("n").unwrap(), Role::Knight);
        assert!(parse_role("k").is_err());
        assert!(parse_role("queen").is_err());
    }

    #[test]
    fn test_event_view() {
        let event = BoardEvent::LastMove {
            from: Square::E2,
            to: Square::E4,
        };
        assert_eq!(
            serde_json::to_value(EventView::from(&event)).unwrap(),
            json!({"type": "last_move", "from": "e2", "to": "e4"})
        );
        assert_eq!(
            EventView::from(&BoardEvent::PlaySound(Sound::Move)),
            EventView::PlaySound { sound: "move" }
        );
    }

    #[test]
    fn test_tree_view_is_preorder() {
        let mut tree = MoveTree::from_position(STANDARD_START).unwrap();
        tree.record_move("e4", "after e4".to_string());
        tree.record_move("e5", "after e5".to_string());
        tree.navigate(tree.root()).unwrap();
        tree.record_move("d4", "after d4".to_string());

        let moves: Vec<String> = tree_view(&tree).into_iter().map(|n| n.mv).collect();
        assert_eq!(moves, ["[0]", "e4", "e5", "d4"]);
    }
}
