//! Database models

use serde::{Deserialize, Serialize};

use crate::tree::StoredNode;

/// A saved analysis. `id` stays `None` until the first save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Option<i64>,
    pub timestamp: u64,
    pub player_id: String,
    pub game_id: String,
    pub root_position: String,
    pub starting_move: u32,
    pub tree: StoredNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub pid: String,
    pub name: String,
    pub created_at: u64,
}

/// The game an analysis belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGame {
    pub gid: String,
    pub name: String,
    pub position: String,
    pub created_at: u64,
}
