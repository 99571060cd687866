//! Human-readable texts emitted by the board and the session

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub checkmate: String,
    pub stalemate: String,
    pub insufficient_material: String,
    pub threefold_repetition: String,
    pub fifty_move_rule: String,
    pub game_over: String,
    pub white_turn: String,
    pub black_turn: String,
    pub draw: String,
    pub promotion_pending: String,
    pub no_promotion_pending: String,
    pub analysis_saved: String,
    pub save_before_copy: String,
    pub analysis_copied: String,
    pub position_copied: String,
    pub pgn_copied: String,
    pub cannot_load_analysis: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            checkmate: "Checkmate".to_string(),
            stalemate: "Stalemate".to_string(),
            insufficient_material: "Draw by insufficient material".to_string(),
            threefold_repetition: "Draw by threefold repetition".to_string(),
            fifty_move_rule: "Draw by the fifty-move rule".to_string(),
            game_over: "Game over".to_string(),
            white_turn: "White to move".to_string(),
            black_turn: "Black to move".to_string(),
            draw: "Draw".to_string(),
            promotion_pending: "Choose a promotion piece first".to_string(),
            no_promotion_pending: "There is no promotion to complete".to_string(),
            analysis_saved: "Analysis saved".to_string(),
            save_before_copy: "Save the analysis before sharing it".to_string(),
            analysis_copied: "Analysis link copied".to_string(),
            position_copied: "Position copied".to_string(),
            pgn_copied: "PGN copied".to_string(),
            cannot_load_analysis: "Cannot load analysis".to_string(),
        }
    }
}

impl Messages {
    /// Loads a translation file. Keys it does not mention keep the English text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
