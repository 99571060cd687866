//! `shakmaty`-backed rules engine

use shakmaty::{
    san::{San, SanPlus},
    Chess, Color, File, Move, Piece, Position, Role, Square,
};

use super::{PlayedMove, RulesEngine};
use crate::error::{Error, Result};
use crate::notation;

/// Rules engine over a single `shakmaty::Chess` position.
///
/// Keeps every earlier position so that moves can be taken back and
/// threefold repetition can be detected.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyRules {
    position: Chess,
    previous: Vec<Chess>,
    history: Vec<String>,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine already set up on `fen`
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut rules = Self::new();
        rules.load(fen)?;
        Ok(rules)
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    fn apply(&mut self, mv: Move) -> Option<PlayedMove> {
        let before = self.position.clone();
        let san = San::from_move(&before, mv.clone());
        let after = before.clone().play(mv.clone()).ok()?;

        let suffix = if after.is_checkmate() {
            "#"
        } else if after.is_check() {
            "+"
        } else {
            ""
        };
        let san = format!("{}{}", san, suffix);
        let (from, to) = move_squares(&mv)?;

        self.previous.push(before);
        self.position = after;
        self.history.push(san.clone());

        Some(PlayedMove {
            from,
            to,
            role: mv.role(),
            promotion: mv.promotion(),
            san,
        })
    }
}

/// Source and destination as a user would drag them.
/// Castling is addressed by the king's destination, not the rook.
fn move_squares(mv: &Move) -> Option<(Square, Square)> {
    match mv {
        Move::Normal { from, to, .. } => Some((*from, *to)),
        Move::EnPassant { from, to } => Some((*from, *to)),
        Move::Castle { king, rook } => {
            let king_to = if rook.file() > king.file() {
                Square::from_coords(File::G, king.rank())
            } else {
                Square::from_coords(File::C, king.rank())
            };
            Some((*king, king_to))
        }
        Move::Put { .. } => None,
    }
}

impl RulesEngine for ShakmatyRules {
    fn load(&mut self, fen: &str) -> Result<()> {
        self.position = notation::parse_position(fen)?;
        self.previous.clear();
        self.history.clear();
        Ok(())
    }

    fn play(&mut self, from: Square, to: Square, promotion: Role) -> Option<PlayedMove> {
        let mv = self
            .position
            .legal_moves()
            .into_iter()
            .find(|m| {
                move_squares(m) == Some((from, to))
                    && m.promotion().map_or(true, |role| role == promotion)
            })?;
        self.apply(mv)
    }

    fn play_san(&mut self, notation: &str) -> Result<PlayedMove> {
        let position = self.fen();
        let illegal = || Error::IllegalMove {
            position: position.clone(),
            notation: notation.to_string(),
        };

        let san_plus: SanPlus = notation.trim().parse().map_err(|_| illegal())?;
        let mv = san_plus.san.to_move(&self.position).map_err(|_| illegal())?;
        self.apply(mv).ok_or_else(illegal)
    }

    fn undo(&mut self) {
        if let Some(position) = self.previous.pop() {
            self.position = position;
            self.history.pop();
        }
    }

    fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut destinations: Vec<Square> = self
            .position
            .legal_moves()
            .iter()
            .filter_map(move_squares)
            .filter(|(source, _)| *source == from)
            .map(|(_, to)| to)
            .collect();
        // Promotion moves share their destination
        destinations.sort();
        destinations.dedup();
        destinations
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    fn turn(&self) -> Color {
        self.position.turn()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    fn is_threefold_repetition(&self) -> bool {
        let key = notation::repetition_key(&self.position);
        let earlier = self
            .previous
            .iter()
            .filter(|p| notation::repetition_key(p) == key)
            .count();
        earlier + 1 >= 3
    }

    fn is_draw_by_fifty_moves(&self) -> bool {
        self.position.halfmoves() >= 100
    }

    fn fen(&self) -> String {
        notation::render(&self.position)
    }

    fn history(&self) -> &[String] {
        &self.history
    }
}
