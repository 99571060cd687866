//! Analysis session
//!
//! Glue between one [`Board`] and one [`MoveTree`]: moves made on the board
//! grow the tree, navigating the tree moves the board, and the tree is saved
//! to and loaded from an [`AnalysisStore`].

mod subscription;

pub use subscription::Subscription;

use serde::Deserialize;
use shakmaty::{Color, Role, Square};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::board::{Board, BoardEvent, BoardSettings};
use crate::config::Configuration;
use crate::engine::{RulesEngine, ShakmatyRules};
use crate::error::{Error, Result};
use crate::messages::Messages;
use crate::notation;
use crate::storage::{AnalysisRecord, AnalysisStore};
use crate::tree::{self, MoveTree, NodeId};

/// Pushed into a live session by long-lived lookups
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    AnalysisLoaded(AnalysisRecord),
    PlayerResolved(String),
    GameResolved(String),
    ConfigurationChanged(Configuration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareTarget {
    /// Link to the saved analysis
    Analysis,
    /// FEN of the position on the board
    Position,
    /// The whole tree as PGN
    Pgn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Copied { content: String, message: String },
    Warning(String),
}

pub struct AnalysisSession<E: RulesEngine + Default = ShakmatyRules> {
    board: Board<E>,
    tree: MoveTree,
    analysis: Option<AnalysisRecord>,
    root_position: String,
    starting_move: u32,
    player_id: Option<String>,
    game_id: Option<String>,
    config: Configuration,
    messages: Messages,
    status_text: String,
    subscriptions: Vec<Subscription>,
    live: bool,
}

impl<E: RulesEngine + Default> AnalysisSession<E> {
    /// Starts a fresh analysis of a shared position. The store is not involved.
    pub fn open_position(fen: &str, config: Configuration, messages: Messages) -> Result<Self> {
        let tree = MoveTree::from_position(fen)?;
        let mut session = Self::empty(tree, config, messages);
        session.load_position(fen)?;
        Ok(session)
    }

    /// Reopens a saved analysis
    pub fn open_analysis(
        record: AnalysisRecord,
        config: Configuration,
        messages: Messages,
    ) -> Result<Self> {
        let tree = MoveTree::from_position(&record.root_position)?;
        let mut session = Self::empty(tree, config, messages);
        session.load_analysis(record)?;
        Ok(session)
    }

    fn empty(tree: MoveTree, config: Configuration, messages: Messages) -> Self {
        let board = Board::new(BoardSettings::from(&config), messages.clone());
        Self {
            board,
            root_position: tree.root_node().position.clone(),
            starting_move: tree.root_node().order + 1,
            tree,
            analysis: None,
            player_id: None,
            game_id: None,
            config,
            messages,
            status_text: String::new(),
            subscriptions: Vec::new(),
            live: true,
        }
    }

    /// Replaces the current exploration with a fresh tree on `fen`
    pub fn load_position(&mut self, fen: &str) -> Result<Vec<BoardEvent>> {
        let tree = MoveTree::from_position(fen)?;
        let events = self.board.build(fen)?;

        self.starting_move = notation::starting_move_number(fen)?;
        self.root_position = tree.root_node().position.clone();
        self.tree = tree;
        self.analysis = None;
        self.refresh_status_text();
        info!("Opened position {}", fen);
        Ok(events)
    }

    /// Replaces the current exploration with a stored one.
    ///
    /// A tree whose moves no longer replay is rejected as a whole and the
    /// session keeps what it had.
    pub fn load_analysis(&mut self, record: AnalysisRecord) -> Result<Vec<BoardEvent>> {
        let mut replay = E::default();
        let tree = match MoveTree::from_stored(&record.root_position, &record.tree, &mut replay) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Cannot load analysis {:?}: {}", record.id, e);
                return Err(e);
            }
        };
        let events = self.board.build(&record.root_position)?;

        info!("Loaded analysis {:?} with {} nodes", record.id, tree.len());
        self.tree = tree;
        self.root_position = record.root_position.clone();
        self.starting_move = record.starting_move;
        if self.game_id.is_none() {
            self.game_id = Some(record.game_id.clone());
        }
        self.analysis = Some(record);
        self.refresh_status_text();
        Ok(events)
    }

    /// Replaces the current exploration with the moves and variations of a
    /// PGN game. The result is a new, unsaved analysis.
    pub fn import_pgn(&mut self, pgn: &str) -> Result<Vec<BoardEvent>> {
        let tree = tree::from_pgn(pgn)?;
        let root_position = tree.root_node().position.clone();
        let events = self.board.build(&root_position)?;

        info!("Imported {} moves from PGN", tree.len() - 1);
        self.starting_move = tree.root_node().order + 1;
        self.root_position = root_position;
        self.tree = tree;
        self.analysis = None;
        self.refresh_status_text();
        Ok(events)
    }

    pub fn begin_drag(&mut self, square: Square) -> Vec<BoardEvent> {
        let events = self.board.begin_drag(square);
        self.absorb(events)
    }

    pub fn drop(&mut self, from: Square, to: Square) -> Vec<BoardEvent> {
        let events = self.board.drop(from, to);
        self.absorb(events)
    }

    pub fn resolve_promotion(&mut self, choice: Option<Role>) -> Vec<BoardEvent> {
        let events = self.board.resolve_promotion(choice);
        self.absorb(events)
    }

    pub fn tap(&mut self, square: Square) -> Vec<BoardEvent> {
        let events = self.board.tap(square);
        self.absorb(events)
    }

    pub fn mouse_over(&mut self, square: Square) -> Vec<BoardEvent> {
        let events = self.board.mouse_over(square);
        self.absorb(events)
    }

    pub fn mouse_out(&mut self, square: Square) -> Vec<BoardEvent> {
        self.board.mouse_out(square)
    }

    pub fn flip(&mut self) -> Color {
        self.board.flip()
    }

    /// Moves the board to a node of the tree
    pub fn show_node(&mut self, id: NodeId) -> Result<Vec<BoardEvent>> {
        if self.tree.current() == id {
            return Ok(Vec::new());
        }
        self.tree.navigate(id)?;
        let position = self.tree.current_node().position.clone();
        let events = self.board.show_position(&position)?;
        self.refresh_status_text();
        Ok(events)
    }

    /// Deletes the current node with its subtree, or every line at the root
    pub fn remove_current(&mut self) -> Result<Vec<BoardEvent>> {
        if self.tree.current() == self.tree.root() {
            self.tree.remove_current();
            return Ok(Vec::new());
        }
        self.tree.remove_current();
        let position = self.tree.current_node().position.clone();
        let events = self.board.show_position(&position)?;
        self.refresh_status_text();
        Ok(events)
    }

    pub fn quality_up(&mut self) {
        self.tree.quality_up();
    }

    pub fn quality_down(&mut self) {
        self.tree.quality_down();
    }

    /// Saving needs a player and the game the analysis belongs to
    pub fn can_save(&self) -> bool {
        self.player_id.is_some() && (self.game_id.is_some() || self.analysis.is_some())
    }

    /// Creates the analysis on the first save and updates it afterwards.
    /// Returns the confirmation to show.
    pub fn save<S: AnalysisStore>(&mut self, store: &S) -> Result<String> {
        if !self.can_save() {
            return Err(Error::SaveUnavailable("no player or game resolved"));
        }
        let stored_tree = self.tree.to_stored();

        if let Some(record) = self.analysis.as_mut() {
            if let Some(id) = record.id {
                record.tree = stored_tree;
                store.update_analysis(id, record)?;
                return Ok(self.messages.analysis_saved.clone());
            }
        }

        let (Some(player_id), Some(game_id)) = (self.player_id.clone(), self.game_id.clone())
        else {
            return Err(Error::SaveUnavailable("no game resolved"));
        };

        let mut record = AnalysisRecord {
            id: None,
            timestamp: unix_now(),
            player_id,
            game_id,
            root_position: self.root_position.clone(),
            starting_move: self.starting_move,
            tree: stored_tree,
        };
        let id = store.create_analysis(&record)?;
        record.id = Some(id);
        self.analysis = Some(record);
        Ok(self.messages.analysis_saved.clone())
    }

    pub fn share(&self, target: ShareTarget) -> ShareOutcome {
        match target {
            ShareTarget::Analysis => match self.analysis.as_ref().and_then(|a| a.id) {
                Some(id) => ShareOutcome::Copied {
                    content: self.config.analysis_link(id),
                    message: self.messages.analysis_copied.clone(),
                },
                None => ShareOutcome::Warning(self.messages.save_before_copy.clone()),
            },
            ShareTarget::Position => ShareOutcome::Copied {
                content: self.board.fen(),
                message: self.messages.position_copied.clone(),
            },
            ShareTarget::Pgn => ShareOutcome::Copied {
                content: tree::to_pgn(&self.tree),
                message: self.messages.pgn_copied.clone(),
            },
        }
    }

    /// Looks up the configured player in `store`
    pub fn resolve_player<S: AnalysisStore>(&mut self, store: &S) -> Result<bool> {
        let Some(pid) = self.config.player_id.clone() else {
            return Ok(false);
        };
        match store.find_player(&pid)? {
            Some(player) => {
                self.handle_update(SessionUpdate::PlayerResolved(player.pid))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Looks up the game the analysis belongs to in `store`
    pub fn resolve_game<S: AnalysisStore>(&mut self, store: &S, gid: &str) -> Result<bool> {
        match store.find_game(gid)? {
            Some(game) => {
                self.handle_update(SessionUpdate::GameResolved(game.gid))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Registers an update source that is cancelled on teardown
    pub fn subscribe(&mut self, name: &str) -> Subscription {
        let subscription = Subscription::new(name);
        self.subscriptions.push(subscription.clone());
        subscription
    }

    /// Applies a pushed update. Does nothing once the session is torn down.
    pub fn handle_update(&mut self, update: SessionUpdate) -> Result<Vec<BoardEvent>> {
        if !self.live {
            debug!("Dropping update for a closed session");
            return Ok(Vec::new());
        }

        match update {
            SessionUpdate::AnalysisLoaded(record) => {
                return match self.load_analysis(record) {
                    Err(Error::IllegalMove { .. } | Error::MalformedTree(_)) => Ok(vec![
                        BoardEvent::Warning(self.messages.cannot_load_analysis.clone()),
                    ]),
                    result => result,
                };
            }
            SessionUpdate::PlayerResolved(pid) => self.player_id = Some(pid),
            SessionUpdate::GameResolved(gid) => self.game_id = Some(gid),
            SessionUpdate::ConfigurationChanged(config) => {
                self.board.apply_settings(&config);
                self.config = config;
            }
        }
        Ok(Vec::new())
    }

    /// Cancels every subscription. Later updates are ignored.
    pub fn teardown(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
        self.live = false;
        info!("Session closed");
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn tree(&self) -> &MoveTree {
        &self.tree
    }

    pub fn board(&self) -> &Board<E> {
        &self.board
    }

    pub fn analysis(&self) -> Option<&AnalysisRecord> {
        self.analysis.as_ref()
    }

    pub fn starting_move(&self) -> u32 {
        self.starting_move
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Feeds the board's domain events into the tree and the status line
    fn absorb(&mut self, events: Vec<BoardEvent>) -> Vec<BoardEvent> {
        let mut moved = false;
        for event in &events {
            match event {
                BoardEvent::MoveMade(san) => {
                    let id = self.tree.record_move(san, self.board.fen());
                    debug!("Tree now at node {} ({})", id.index(), san);
                    moved = true;
                }
                BoardEvent::GameOver(message) => {
                    self.status_text = message.clone();
                    return events;
                }
                _ => {}
            }
        }
        if moved {
            self.refresh_status_text();
        }
        events
    }

    fn refresh_status_text(&mut self) {
        self.status_text = if self.board.is_game_over() {
            if self.board.is_checkmate() {
                self.messages.game_over.clone()
            } else {
                self.messages.draw.clone()
            }
        } else if self.board.turn() == Color::White {
            self.messages.white_turn.clone()
        } else {
            self.messages.black_turn.clone()
        };
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardState;
    use crate::notation::STANDARD_START;
    use crate::storage::Database;
    use crate::tree::{Quality, StoredNode};

    fn session() -> AnalysisSession {
        AnalysisSession::open_position(STANDARD_START, Configuration::default(), Messages::default())
            .unwrap()
    }

    fn store_with_identity() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_player("p1", "Alice").unwrap();
        db.insert_game("g1", "Casual", STANDARD_START).unwrap();
        db
    }

    fn identified(db: &Database) -> AnalysisSession {
        let config = Configuration {
            player_id: Some("p1".to_string()),
            ..Configuration::default()
        };
        let mut session: AnalysisSession =
            AnalysisSession::open_position(STANDARD_START, config, Messages::default()).unwrap();
        assert!(session.resolve_player(db).unwrap());
        assert!(session.resolve_game(db, "g1").unwrap());
        session
    }

    #[test]
    fn test_board_moves_grow_the_tree() {
        let mut session = session();
        session.drop(Square::E2, Square::E4);
        session.drop(Square::E7, Square::E5);

        let tree = session.tree();
        let current = tree.current_node();
        assert_eq!(current.mv, "e5");
        assert_eq!(current.order, 1);
        assert_eq!(current.position, session.board().fen());
        assert_eq!(tree.len(), 3);
        assert_eq!(session.status_text(), "White to move");
    }

    #[test]
    fn test_replaying_known_move_navigates() {
        let mut session = session();
        session.drop(Square::E2, Square::E4);
        let e4 = session.tree().current();
        session.show_node(session.tree().root()).unwrap();
        session.drop(Square::E2, Square::E4);

        assert_eq!(session.tree().current(), e4);
        assert_eq!(session.tree().children(session.tree().root()).len(), 1);
    }

    #[test]
    fn test_replaying_stored_move_navigates() {
        let scholar = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
        let record = AnalysisRecord {
            id: Some(3),
            timestamp: 0,
            player_id: "p1".to_string(),
            game_id: "g1".to_string(),
            root_position: scholar.to_string(),
            starting_move: 4,
            tree: StoredNode {
                mv: "[0]".to_string(),
                order: 3,
                quality: None,
                children: vec![StoredNode {
                    mv: "Qxf7".to_string(),
                    order: 4,
                    quality: None,
                    children: Vec::new(),
                }],
            },
        };
        let mut session: AnalysisSession =
            AnalysisSession::open_analysis(record, Configuration::default(), Messages::default())
                .unwrap();
        let root = session.tree().root();
        let stored = session.tree().children(root)[0];
        assert_eq!(session.tree().node(stored).unwrap().mv, "Qxf7#");

        let events = session.drop(Square::H5, Square::F7);
        assert!(events.contains(&BoardEvent::MoveMade("Qxf7#".to_string())));
        assert_eq!(session.tree().children(root).len(), 1);
        assert_eq!(session.tree().current(), stored);
    }

    #[test]
    fn test_selection_drop_leaves_tree_alone() {
        let mut session = session();
        let events = session.drop(Square::E2, Square::E2);
        assert!(!events.iter().any(|e| matches!(e, BoardEvent::MoveMade(_))));
        assert_eq!(session.tree().len(), 1);
    }

    #[test]
    fn test_cancelled_promotion_leaves_tree_alone() {
        let fen = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";
        let mut session: AnalysisSession =
            AnalysisSession::open_position(fen, Configuration::default(), Messages::default())
                .unwrap();
        session.drop(Square::E7, Square::E8);
        assert!(matches!(
            session.board().state(),
            BoardState::AwaitingPromotion { .. }
        ));
        let events = session.resolve_promotion(None);
        assert!(!events.iter().any(|e| matches!(e, BoardEvent::MoveMade(_))));
        assert_eq!(session.tree().len(), 1);
        assert_eq!(session.board().fen(), fen);
    }

    #[test]
    fn test_checkmate_sets_status() {
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
        let mut session: AnalysisSession =
            AnalysisSession::open_position(fen, Configuration::default(), Messages::default())
                .unwrap();
        session.drop(Square::H5, Square::F7);
        assert_eq!(session.status_text(), "Checkmate");
        assert_eq!(session.tree().current_node().mv, "Qxf7#");

        // Navigating back reopens the board
        session.show_node(session.tree().root()).unwrap();
        assert_eq!(session.board().state(), BoardState::Idle);
        assert_eq!(session.status_text(), "White to move");
    }

    #[test]
    fn test_show_node_moves_board() {
        let mut session = session();
        session.drop(Square::E2, Square::E4);
        let e4 = session.tree().current();
        session.drop(Square::E7, Square::E5);

        let events = session.show_node(e4).unwrap();
        assert!(events.iter().any(|e| matches!(e, BoardEvent::ShowPosition { .. })));
        assert_eq!(session.board().fen(), session.tree().node(e4).unwrap().position);
        assert_eq!(session.board().turn(), Color::Black);

        assert!(session.show_node(e4).unwrap().is_empty());
        assert!(session.show_node(NodeId::from(42)).is_err());
    }

    #[test]
    fn test_remove_current_shows_new_current() {
        let mut session = session();
        session.drop(Square::E2, Square::E4);
        session.show_node(session.tree().root()).unwrap();
        session.drop(Square::D2, Square::D4);

        session.remove_current().unwrap();
        let current = session.tree().current_node();
        assert_eq!(current.mv, "e4");
        assert_eq!(session.board().fen(), current.position);

        session.show_node(session.tree().root()).unwrap();
        assert!(session.remove_current().unwrap().is_empty());
        assert!(session.tree().is_empty());
    }

    #[test]
    fn test_save_requires_identity() {
        let db = Database::open_in_memory().unwrap();
        let mut session = session();
        assert!(!session.can_save());
        assert!(matches!(
            session.save(&db),
            Err(Error::SaveUnavailable(_))
        ));
        assert!(session.analysis().is_none());
    }

    #[test]
    fn test_save_creates_then_updates() {
        let db = store_with_identity();
        let mut session = identified(&db);
        assert!(session.can_save());

        session.drop(Square::E2, Square::E4);
        assert_eq!(session.save(&db).unwrap(), "Analysis saved");
        let id = session.analysis().unwrap().id.unwrap();

        session.quality_up();
        session.drop(Square::E7, Square::E5);
        session.save(&db).unwrap();
        assert_eq!(db.count_analyses().unwrap(), 1);

        let stored = db.find_analysis(id).unwrap().unwrap();
        assert_eq!(stored.tree, session.tree().to_stored());
        assert_eq!(stored.tree.children[0].quality, Some(Quality::Favorable));
        assert_eq!(stored.starting_move, 1);
        assert_eq!(stored.player_id, "p1");
    }

    #[test]
    fn test_reopen_saved_analysis() {
        let db = store_with_identity();
        let mut session = identified(&db);
        session.drop(Square::E2, Square::E4);
        session.drop(Square::E7, Square::E5);
        session.save(&db).unwrap();
        let id = session.analysis().unwrap().id.unwrap();

        let record = db.find_analysis(id).unwrap().unwrap();
        let reopened: AnalysisSession =
            AnalysisSession::open_analysis(record, Configuration::default(), Messages::default())
                .unwrap();
        assert_eq!(reopened.tree().to_stored(), session.tree().to_stored());
        assert_eq!(reopened.tree().current(), reopened.tree().root());
        assert_eq!(reopened.board().fen(), STANDARD_START);
        assert!(matches!(
            reopened.share(ShareTarget::Analysis),
            ShareOutcome::Copied { content, .. } if content.ends_with(&format!("/{}", id))
        ));
    }

    #[test]
    fn test_malformed_analysis_is_rejected() {
        let record = AnalysisRecord {
            id: Some(1),
            timestamp: 0,
            player_id: "p1".to_string(),
            game_id: "g1".to_string(),
            root_position: STANDARD_START.to_string(),
            starting_move: 1,
            tree: StoredNode {
                mv: "[0]".to_string(),
                order: 0,
                quality: None,
                children: vec![StoredNode {
                    mv: "Nf6".to_string(),
                    order: 1,
                    quality: None,
                    children: Vec::new(),
                }],
            },
        };

        let result: Result<AnalysisSession> =
            AnalysisSession::open_analysis(record.clone(), Configuration::default(), Messages::default());
        assert!(matches!(result, Err(Error::IllegalMove { .. })));

        // A live session keeps its state when a bad record arrives
        let mut session = session();
        session.drop(Square::E2, Square::E4);
        let events = session
            .handle_update(SessionUpdate::AnalysisLoaded(record))
            .unwrap();
        assert_eq!(
            events,
            vec![BoardEvent::Warning(Messages::default().cannot_load_analysis)]
        );
        assert_eq!(session.tree().len(), 2);
        assert!(session.analysis().is_none());
    }

    #[test]
    fn test_share_targets() {
        let mut session = session();
        assert_eq!(
            session.share(ShareTarget::Analysis),
            ShareOutcome::Warning(Messages::default().save_before_copy)
        );
        session.drop(Square::E2, Square::E4);
        match session.share(ShareTarget::Position) {
            ShareOutcome::Copied { content, .. } => assert_eq!(content, session.board().fen()),
            other => panic!("unexpected {:?}", other),
        }
        match session.share(ShareTarget::Pgn) {
            ShareOutcome::Copied { content, .. } => assert!(content.contains("1. e4 *")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_teardown_ignores_late_updates() {
        let mut session = session();
        let players = session.subscribe("players");
        let config = session.subscribe("configuration");

        session.teardown();
        assert!(!players.is_active());
        assert!(!config.is_active());
        assert!(!session.is_live());

        session
            .handle_update(SessionUpdate::PlayerResolved("p1".to_string()))
            .unwrap();
        assert!(!session.can_save());
    }

    #[test]
    fn test_configuration_change_reaches_board() {
        let mut session = session();
        session
            .handle_update(SessionUpdate::ConfigurationChanged(Configuration {
                play_sounds: false,
                ..Configuration::default()
            }))
            .unwrap();
        let events = session.drop(Square::E2, Square::E4);
        assert!(!events.iter().any(|e| matches!(e, BoardEvent::PlaySound(_))));
        assert!(!session.configuration().play_sounds);
    }

    #[test]
    fn test_import_pgn_replaces_tree() {
        let mut session = session();
        session.drop(Square::D2, Square::D4);

        let events = session
            .import_pgn("1. e4 e5 (1... c5 2. Nf3) 2. Nf3 *")
            .unwrap();
        assert!(events.iter().any(|e| matches!(e, BoardEvent::ShowPosition { .. })));
        assert_eq!(session.tree().len(), 6);
        assert_eq!(session.tree().current(), session.tree().root());
        assert_eq!(session.board().fen(), STANDARD_START);
        assert!(session.analysis().is_none());

        assert!(session.import_pgn("1. e4 e4 *").is_err());
        assert_eq!(session.tree().len(), 6);
    }

    #[test]
    fn test_load_position_discards_analysis() {
        let db = store_with_identity();
        let mut session = identified(&db);
        session.drop(Square::E2, Square::E4);
        session.save(&db).unwrap();

        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        session.load_position(fen).unwrap();
        assert!(session.analysis().is_none());
        assert_eq!(session.starting_move(), 3);
        assert_eq!(session.tree().root_node().order, 2);
        assert!(session.tree().is_empty());
    }
}
