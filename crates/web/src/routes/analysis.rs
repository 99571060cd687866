use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use chess_explorer_core::tree::to_pgn;
use chess_explorer_core::{
    AnalysisRecord, AnalysisStore, Configuration, Error, MoveTree, ShakmatyRules,
};

use super::{lock, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AnalysisRow {
    pub id: Option<i64>,
    pub player_id: String,
    pub root_position: String,
    pub starting_move: u32,
    pub moves: usize,
    pub saved_at: String,
    pub link: Option<String>,
}

fn format_timestamp(timestamp: u64) -> String {
    chrono::DateTime::from_timestamp(timestamp as i64, 0)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn row(record: &AnalysisRecord, config: &Configuration) -> AnalysisRow {
    AnalysisRow {
        id: record.id,
        player_id: record.player_id.clone(),
        root_position: record.root_position.clone(),
        starting_move: record.starting_move,
        moves: record.tree.count() - 1,
        saved_at: format_timestamp(record.timestamp),
        link: record.id.map(|id| config.analysis_link(id)),
    }
}

pub async fn list_for_game(
    State(state): State<Arc<AppState>>,
    Path(gid): Path<String>,
) -> ApiResult<Json<Vec<AnalysisRow>>> {
    let db = lock(&state.db)?;
    let config = db.load_configuration()?;
    let rows = db
        .analyses_for_game(&gid)?
        .iter()
        .map(|record| row(record, &config))
        .collect();
    Ok(Json(rows))
}

/// Saved analysis with all its lines as a PGN download
pub async fn export_pgn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let record = lock(&state.db)?
        .find_analysis(id)?
        .ok_or(Error::AnalysisNotFound(id))?;

    let mut replay = ShakmatyRules::default();
    let tree = MoveTree::from_stored(&record.root_position, &record.tree, &mut replay)?;
    Ok((
        [(header::CONTENT_TYPE, "application/x-chess-pgn")],
        to_pgn(&tree),
    ))
}
