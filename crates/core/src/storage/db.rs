//! Database operations

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use super::models::*;
use super::AnalysisStore;
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::tree::StoredNode;

pub struct Database {
    conn: Connection,
}

/// Analysis row with the tree still in JSON form
struct AnalysisRow {
    id: i64,
    timestamp: u64,
    player_id: String,
    game_id: String,
    root_position: String,
    starting_move: u32,
    movetree: String,
}

impl AnalysisRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            player_id: row.get(2)?,
            game_id: row.get(3)?,
            root_position: row.get(4)?,
            starting_move: row.get(5)?,
            movetree: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<AnalysisRecord> {
        Ok(AnalysisRecord {
            id: Some(self.id),
            timestamp: self.timestamp,
            player_id: self.player_id,
            game_id: self.game_id,
            root_position: self.root_position,
            starting_move: self.starting_move,
            tree: StoredNode::from_json(&self.movetree)?,
        })
    }
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS analyses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp INTEGER NOT NULL,
                player_id TEXT NOT NULL,
                game_id TEXT NOT NULL,
                root_position TEXT NOT NULL,
                starting_move INTEGER NOT NULL,
                movetree TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS players (
                pid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS games (
                gid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                position TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analyses_game_id ON analyses(game_id);
            CREATE INDEX IF NOT EXISTS idx_analyses_player_id ON analyses(player_id);
            "#,
        )?;
        Ok(())
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    pub fn insert_player(&self, pid: &str, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO players (pid, name, created_at) VALUES (?1, ?2, ?3)",
            params![pid, name, Self::now()],
        )?;
        Ok(())
    }

    pub fn insert_game(&self, gid: &str, name: &str, position: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO games (gid, name, position, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![gid, name, position, Self::now()],
        )?;
        Ok(())
    }

    pub fn analyses_for_game(&self, gid: &str) -> Result<Vec<AnalysisRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, player_id, game_id, root_position, starting_move, movetree
             FROM analyses WHERE game_id = ?1 ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(params![gid], AnalysisRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(AnalysisRow::into_record).collect()
    }

    pub fn count_analyses(&self) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM analyses",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Stored configuration, or the defaults when none was saved yet
    pub fn load_configuration(&self) -> Result<Configuration> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM settings WHERE id = 1", [], |row| row.get(0))
            .optional()?;

        match data {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Configuration::default()),
        }
    }

    pub fn save_configuration(&self, config: &Configuration) -> Result<()> {
        let json = serde_json::to_string(config)?;
        self.conn.execute(
            r#"
            INSERT INTO settings (id, data) VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET data = ?1
            "#,
            params![json],
        )?;
        Ok(())
    }
}

impl AnalysisStore for Database {
    fn create_analysis(&self, analysis: &AnalysisRecord) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO analyses
            (timestamp, player_id, game_id, root_position, starting_move, movetree)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                analysis.timestamp,
                analysis.player_id,
                analysis.game_id,
                analysis.root_position,
                analysis.starting_move,
                analysis.tree.to_json()?,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Created analysis {} for game {}", id, analysis.game_id);
        Ok(id)
    }

    fn update_analysis(&self, id: i64, analysis: &AnalysisRecord) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE analyses SET timestamp = ?1, movetree = ?2 WHERE id = ?3",
            params![analysis.timestamp, analysis.tree.to_json()?, id],
        )?;
        if changed == 0 {
            return Err(Error::AnalysisNotFound(id));
        }
        info!("Updated analysis {}", id);
        Ok(())
    }

    fn find_analysis(&self, id: i64) -> Result<Option<AnalysisRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, timestamp, player_id, game_id, root_position, starting_move, movetree
                 FROM analyses WHERE id = ?1",
                params![id],
                AnalysisRow::from_row,
            )
            .optional()?;

        row.map(AnalysisRow::into_record).transpose()
    }

    fn find_player(&self, pid: &str) -> Result<Option<Player>> {
        let player = self
            .conn
            .query_row(
                "SELECT pid, name, created_at FROM players WHERE pid = ?1",
                params![pid],
                |row| {
                    Ok(Player {
                        pid: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(player)
    }

    fn find_game(&self, gid: &str) -> Result<Option<StoredGame>> {
        let game = self
            .conn
            .query_row(
                "SELECT gid, name, position, created_at FROM games WHERE gid = ?1",
                params![gid],
                |row| {
                    Ok(StoredGame {
                        gid: row.get(0)?,
                        name: row.get(1)?,
                        position: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(game)
    }
}
