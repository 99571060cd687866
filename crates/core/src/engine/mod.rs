//! Chess rules integration
//!
//! The board and the tree never decide legality themselves. They talk to a
//! [`RulesEngine`], and [`ShakmatyRules`] is the implementation backed by
//! `shakmaty`.

mod rules;

pub use rules::ShakmatyRules;

use shakmaty::{Color, Piece, Role, Square};

use crate::error::Result;

/// A move accepted by the rules engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub from: Square,
    pub to: Square,
    pub role: Role,
    pub promotion: Option<Role>,
    /// SAN with check/mate suffix, e.g. `Qxf7#`
    pub san: String,
}

/// Capabilities the board and the tree need from a rules engine.
///
/// Any implementation that tracks a single current position, an undo
/// history and the usual termination conditions can be substituted.
pub trait RulesEngine {
    /// Replaces the current position. History is discarded.
    fn load(&mut self, fen: &str) -> Result<()>;

    /// Plays a move given by squares. `promotion` is ignored unless the
    /// move is a promotion. Returns `None` when the move is not legal.
    fn play(&mut self, from: Square, to: Square, promotion: Role) -> Option<PlayedMove>;

    /// Plays a move given in SAN, with or without suffix.
    fn play_san(&mut self, notation: &str) -> Result<PlayedMove>;

    /// Takes back the last played move, if any.
    fn undo(&mut self);

    fn legal_destinations(&self, from: Square) -> Vec<Square>;

    fn piece_at(&self, square: Square) -> Option<Piece>;

    fn turn(&self) -> Color;

    fn is_over(&self) -> bool {
        self.is_checkmate()
            || self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
            || self.is_draw_by_fifty_moves()
    }

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    fn is_insufficient_material(&self) -> bool;

    fn is_threefold_repetition(&self) -> bool;

    fn is_draw_by_fifty_moves(&self) -> bool;

    /// Current position in FEN
    fn fen(&self) -> String;

    /// SAN of every move played since the last `load`
    fn history(&self) -> &[String];
}
