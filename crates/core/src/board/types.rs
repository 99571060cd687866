//! States and events of the interactive board

use shakmaty::{Color, Square};

use crate::config::{Configuration, PointerMode};
use crate::messages::Messages;

/// Why a position is over, in the order the board checks them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
    Other,
}

impl GameOverReason {
    pub fn message(&self, messages: &Messages) -> String {
        match self {
            GameOverReason::Checkmate => messages.checkmate.clone(),
            GameOverReason::Stalemate => messages.stalemate.clone(),
            GameOverReason::InsufficientMaterial => messages.insufficient_material.clone(),
            GameOverReason::ThreefoldRepetition => messages.threefold_repetition.clone(),
            GameOverReason::FiftyMoveRule => messages.fifty_move_rule.clone(),
            GameOverReason::Other => messages.game_over.clone(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameOverReason::Checkmate => "checkmate",
            GameOverReason::Stalemate => "stalemate",
            GameOverReason::InsufficientMaterial => "insufficient_material",
            GameOverReason::ThreefoldRepetition => "threefold_repetition",
            GameOverReason::FiftyMoveRule => "fifty_move_rule",
            GameOverReason::Other => "other",
        }
    }
}

/// Where the board is in handling the player's gestures.
///
/// Committing a move is not a state of its own: it happens inside a single
/// transition that ends in `Idle` or `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardState {
    /// Nothing selected, waiting for a drag or tap
    #[default]
    Idle,
    /// A piece has been picked up and its destinations are shown
    SquareActive { source: Square },
    /// A pawn reached the last rank, waiting for the piece choice
    AwaitingPromotion { from: Square, to: Square, side: Color },
    /// No moves accepted until another position is shown
    GameOver { reason: GameOverReason },
}

impl BoardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardState::Idle => "idle",
            BoardState::SquareActive { .. } => "square_active",
            BoardState::AwaitingPromotion { .. } => "awaiting_promotion",
            BoardState::GameOver { .. } => "game_over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Move,
    Success,
    Fail,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sound::Move => "move",
            Sound::Success => "success",
            Sound::Fail => "fail",
        }
    }
}

/// Output of a board transition, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Mark these squares (source first, then its destinations)
    Highlight(Vec<Square>),
    ClearHighlights,
    /// Return the dragged piece to its square
    SnapBack,
    ShowPosition { fen: String, animate: bool },
    /// Mark the squares of the move just played
    LastMove { from: Square, to: Square },
    PlaySound(Sound),
    /// Ask the player which piece to promote to
    PromotionRequested { side: Color },
    /// A move was played; carries its SAN
    MoveMade(String),
    GameOver(String),
    Warning(String),
}

/// Presentation switches taken from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSettings {
    pub play_sounds: bool,
    pub highlight_squares: bool,
    pub pointer: PointerMode,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self::from(&Configuration::default())
    }
}

impl From<&Configuration> for BoardSettings {
    fn from(config: &Configuration) -> Self {
        Self {
            play_sounds: config.play_sounds,
            highlight_squares: config.highlight_squares,
            pointer: config.pointer,
        }
    }
}
