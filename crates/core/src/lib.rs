//! Chess Explorer Core Library
//!
//! Branching move trees, an interactive board driven by a rules engine, and
//! the session that ties both to a persistent analysis store.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod messages;
pub mod notation;
pub mod session;
pub mod storage;
pub mod tree;

pub use board::{Board, BoardEvent, BoardSettings, BoardState, GameOverReason, Sound};
pub use config::{Configuration, PointerMode};
pub use engine::{PlayedMove, RulesEngine, ShakmatyRules};
pub use error::{Error, Result};
pub use messages::Messages;
pub use session::{AnalysisSession, SessionUpdate, ShareOutcome, ShareTarget, Subscription};
pub use storage::{AnalysisRecord, AnalysisStore, Database};
pub use tree::{MoveNode, MoveTree, NodeId, Quality, StoredNode};
