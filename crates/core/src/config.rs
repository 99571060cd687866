//! User configuration

use serde::{Deserialize, Serialize};

/// How the player points at squares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerMode {
    /// Mouse or pen: drag and drop, hover highlights
    #[default]
    Precise,
    /// Touch screen: tap a piece, then tap its destination
    Touch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Identity of the acting player, needed to save analyses
    pub player_id: Option<String>,
    pub play_sounds: bool,
    pub highlight_squares: bool,
    pub piece_theme: String,
    pub pointer: PointerMode,
    /// Prefix of shareable analysis links
    pub share_base_url: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            player_id: None,
            play_sounds: true,
            highlight_squares: true,
            piece_theme: "cburnett".to_string(),
            pointer: PointerMode::Precise,
            share_base_url: "http://localhost:3000/analysis".to_string(),
        }
    }
}

impl Configuration {
    /// Link under which a saved analysis can be opened
    pub fn analysis_link(&self, analysis_id: i64) -> String {
        format!("{}/{}", self.share_base_url.trim_end_matches('/'), analysis_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Configuration =
            serde_json::from_str(r#"{"play_sounds": false, "pointer": "touch"}"#).unwrap();
        assert!(!config.play_sounds);
        assert!(config.highlight_squares);
        assert_eq!(config.pointer, PointerMode::Touch);
        assert_eq!(config.piece_theme, "cburnett");
    }

    #[test]
    fn test_analysis_link() {
        let config = Configuration {
            share_base_url: "https://example.org/analysis/".to_string(),
            ..Configuration::default()
        };
        assert_eq!(config.analysis_link(7), "https://example.org/analysis/7");
    }
}
