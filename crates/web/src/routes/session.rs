use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

use chess_explorer_core::notation::STANDARD_START;
use chess_explorer_core::{
    AnalysisSession, AnalysisStore, BoardEvent, Error, NodeId, ShareOutcome, ShareTarget,
};

use super::{lock, parse_role, parse_square, ApiError, ApiResult, EventView, SessionView};
use crate::{AppState, SessionEntry};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateSession {
    pub fen: Option<String>,
    pub analysis_id: Option<i64>,
    pub game_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SquareRequest {
    pub square: String,
}

#[derive(Deserialize)]
pub struct DropRequest {
    pub from: String,
    pub to: String,
}

#[derive(Deserialize)]
pub struct HoverRequest {
    pub square: String,
    #[serde(default)]
    pub leave: bool,
}

/// `piece` is one of `q`, `r`, `b`, `n`; `null` cancels the drop
#[derive(Deserialize)]
pub struct PromotionRequest {
    pub piece: Option<String>,
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub node: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Deserialize)]
pub struct QualityRequest {
    pub direction: Direction,
}

#[derive(Deserialize)]
pub struct PositionRequest {
    pub fen: String,
}

#[derive(Deserialize)]
pub struct PgnRequest {
    pub pgn: String,
}

#[derive(Deserialize)]
pub struct ShareRequest {
    pub target: ShareTarget,
}

/// What every interaction answers: the events to render and the new view
#[derive(Serialize)]
pub struct GestureResponse {
    pub events: Vec<EventView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub session: SessionView,
}

impl GestureResponse {
    fn new(id: u64, session: &AnalysisSession, events: &[BoardEvent]) -> Self {
        Self {
            events: events.iter().map(EventView::from).collect(),
            message: None,
            session: SessionView::new(id, session),
        }
    }

    fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

#[derive(Serialize)]
pub struct ShareResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Runs `f` on a hosted session and answers with its events
fn interact<F>(state: &AppState, id: u64, f: F) -> ApiResult<Json<GestureResponse>>
where
    F: FnOnce(&mut AnalysisSession) -> ApiResult<Vec<BoardEvent>>,
{
    let mut sessions = lock(&state.sessions)?;
    let entry = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
    let events = f(&mut entry.session)?;
    Ok(Json(GestureResponse::new(id, &entry.session, &events)))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSession>,
) -> ApiResult<Json<SessionView>> {
    let mut session = {
        let db = lock(&state.db)?;
        let config = db.load_configuration()?;
        let mut session = match request.analysis_id {
            Some(analysis_id) => {
                let record = db
                    .find_analysis(analysis_id)?
                    .ok_or(Error::AnalysisNotFound(analysis_id))?;
                AnalysisSession::open_analysis(record, config, state.messages.clone()).map_err(
                    |e| match e {
                        Error::IllegalMove { .. } | Error::MalformedTree(_) => {
                            ApiError::Unloadable(state.messages.cannot_load_analysis.clone())
                        }
                        e => ApiError::from(e),
                    },
                )?
            }
            None => {
                let fen = request.fen.as_deref().unwrap_or(STANDARD_START);
                AnalysisSession::open_position(fen, config, state.messages.clone())?
            }
        };
        session.resolve_player(&*db)?;
        if let Some(gid) = request.game_id.as_deref() {
            session.resolve_game(&*db, gid)?;
        }
        session
    };

    let settings = session.subscribe("settings");
    let id = state.next_session.fetch_add(1, Ordering::Relaxed);
    let view = SessionView::new(id, &session);
    lock(&state.sessions)?.insert(id, SessionEntry { session, settings });
    info!("Opened session {}", id);
    Ok(Json(view))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<SessionView>> {
    let sessions = lock(&state.sessions)?;
    let entry = sessions.get(&id).ok_or(ApiError::SessionNotFound(id))?;
    Ok(Json(SessionView::new(id, &entry.session)))
}

pub async fn close(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    let mut entry = lock(&state.sessions)?
        .remove(&id)
        .ok_or(ApiError::SessionNotFound(id))?;
    entry.session.teardown();
    info!("Closed session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn drag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<SquareRequest>,
) -> ApiResult<Json<GestureResponse>> {
    let square = parse_square(&request.square)?;
    interact(&state, id, |session| Ok(session.begin_drag(square)))
}

pub async fn drop_piece(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<DropRequest>,
) -> ApiResult<Json<GestureResponse>> {
    let from = parse_square(&request.from)?;
    let to = parse_square(&request.to)?;
    interact(&state, id, |session| Ok(session.drop(from, to)))
}

pub async fn tap(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<SquareRequest>,
) -> ApiResult<Json<GestureResponse>> {
    let square = parse_square(&request.square)?;
    interact(&state, id, |session| Ok(session.tap(square)))
}

pub async fn hover(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<HoverRequest>,
) -> ApiResult<Json<GestureResponse>> {
    let square = parse_square(&request.square)?;
    interact(&state, id, |session| {
        Ok(if request.leave {
            session.mouse_out(square)
        } else {
            session.mouse_over(square)
        })
    })
}

pub async fn promotion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<PromotionRequest>,
) -> ApiResult<Json<GestureResponse>> {
    let choice = request.piece.as_deref().map(parse_role).transpose()?;
    interact(&state, id, |session| Ok(session.resolve_promotion(choice)))
}

pub async fn flip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<GestureResponse>> {
    interact(&state, id, |session| {
        session.flip();
        Ok(Vec::new())
    })
}

pub async fn navigate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<NavigateRequest>,
) -> ApiResult<Json<GestureResponse>> {
    interact(&state, id, |session| {
        session
            .show_node(NodeId::from(request.node))
            .map_err(ApiError::from)
    })
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<GestureResponse>> {
    interact(&state, id, |session| session.remove_current().map_err(ApiError::from))
}

pub async fn quality(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<QualityRequest>,
) -> ApiResult<Json<GestureResponse>> {
    interact(&state, id, |session| {
        match request.direction {
            Direction::Up => session.quality_up(),
            Direction::Down => session.quality_down(),
        }
        Ok(Vec::new())
    })
}

pub async fn load_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<PositionRequest>,
) -> ApiResult<Json<GestureResponse>> {
    interact(&state, id, |session| {
        session.load_position(&request.fen).map_err(ApiError::from)
    })
}

pub async fn import_pgn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<PgnRequest>,
) -> ApiResult<Json<GestureResponse>> {
    interact(&state, id, |session| {
        session.import_pgn(&request.pgn).map_err(ApiError::from)
    })
}

pub async fn save(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<GestureResponse>> {
    let mut sessions = lock(&state.sessions)?;
    let entry = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
    let message = {
        let db = lock(&state.db)?;
        entry.session.save(&*db)?
    };
    Ok(Json(
        GestureResponse::new(id, &entry.session, &[]).with_message(message),
    ))
}

pub async fn share(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<Json<ShareResponse>> {
    let sessions = lock(&state.sessions)?;
    let entry = sessions.get(&id).ok_or(ApiError::SessionNotFound(id))?;
    let response = match entry.session.share(request.target) {
        ShareOutcome::Copied { content, message } => ShareResponse {
            content: Some(content),
            message: Some(message),
            warning: None,
        },
        ShareOutcome::Warning(warning) => ShareResponse {
            content: None,
            message: None,
            warning: Some(warning),
        },
    };
    Ok(Json(response))
}
