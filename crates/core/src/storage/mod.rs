//! SQLite storage for analyses, players and games

mod db;
mod models;

pub use db::Database;
pub use models::*;

use crate::error::Result;

/// What an analysis session needs from persistence
pub trait AnalysisStore {
    /// Stores a new analysis and returns its assigned id
    fn create_analysis(&self, analysis: &AnalysisRecord) -> Result<i64>;

    fn update_analysis(&self, id: i64, analysis: &AnalysisRecord) -> Result<()>;

    fn find_analysis(&self, id: i64) -> Result<Option<AnalysisRecord>>;

    fn find_player(&self, pid: &str) -> Result<Option<Player>>;

    fn find_game(&self, gid: &str) -> Result<Option<StoredGame>>;
}
