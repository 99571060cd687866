//! Position notation helpers
//!
//! Thin layer between FEN strings, which is what the tree stores and the
//! store persists, and `shakmaty` positions.

use shakmaty::{fen::Fen, CastlingMode, Chess, Color, EnPassantMode, Position};

use crate::error::{Error, Result};

/// Standard starting position
pub const STANDARD_START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parses a FEN string into a playable position
pub fn parse_position(fen: &str) -> Result<Chess> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| Error::InvalidPosition(format!("{}: {}", fen, e)))?;

    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| Error::InvalidPosition(format!("{}: {}", fen, e)))
}

/// Renders a position back into FEN
pub fn render(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Reads the trailing fullmove field of a FEN string
pub fn starting_move_number(fen: &str) -> Result<u32> {
    fen.split_whitespace()
        .last()
        .and_then(|field| field.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| Error::InvalidPosition(format!("{}: missing move number", fen)))
}

/// Fullmove counter of a FEN string, defaulting to 1 when absent
pub fn fullmove_number(fen: &str) -> u32 {
    fen.split_whitespace()
        .nth(5)
        .and_then(|field| field.parse().ok())
        .unwrap_or(1)
}

/// Side to move encoded in a FEN string, defaulting to white
pub fn side_to_move(fen: &str) -> Color {
    match fen.split_whitespace().nth(1) {
        Some("b") => Color::Black,
        _ => Color::White,
    }
}

/// Placement, turn, castling rights and en passant square.
/// Two positions with the same key count as a repetition.
pub fn repetition_key(position: &Chess) -> String {
    render(position)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}
