//! Error types for chess-explorer-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// A move that cannot be played from the position it is attached to.
    /// Raised while rebuilding a stored tree or importing PGN.
    #[error("Illegal move '{notation}' in position {position}")]
    IllegalMove { position: String, notation: String },

    /// A stored tree whose shape cannot come from exploring moves
    #[error("Malformed move tree: {0}")]
    MalformedTree(String),

    #[error("PGN parsing error: {0}")]
    Pgn(String),

    #[error("Node {0} is not part of this tree")]
    NodeNotFound(usize),

    #[error("Analysis {0} not found")]
    AnalysisNotFound(i64),

    #[error("Cannot save analysis: {0}")]
    SaveUnavailable(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
