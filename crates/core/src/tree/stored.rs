//! Persisted form of a move tree

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{MoveTree, NodeId, Quality, ROOT_MOVE};
use crate::engine::RulesEngine;
use crate::error::{Error, Result};

/// A tree node without its parent link and position.
///
/// Both are derivable: the parent from nesting, the position by replaying
/// moves from the root position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNode {
    #[serde(rename = "move")]
    pub mv: String,
    pub order: u32,
    #[serde(default)]
    pub quality: Option<Quality>,
    #[serde(default)]
    pub children: Vec<StoredNode>,
}

impl StoredNode {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of nodes, this one included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(StoredNode::count).sum::<usize>()
    }
}

impl MoveTree {
    /// Depth-first copy keeping move, order, quality and children
    pub fn to_stored(&self) -> StoredNode {
        self.stored_from(self.root())
    }

    fn stored_from(&self, id: NodeId) -> StoredNode {
        let node = self.slot(id);
        StoredNode {
            mv: node.mv.clone(),
            order: node.order,
            quality: node.quality,
            children: node
                .children
                .iter()
                .map(|child| self.stored_from(*child))
                .collect(),
        }
    }

    /// Rebuilds a tree from its persisted form.
    ///
    /// Each child's position is recomputed by playing its move through
    /// `engine` from the parent's position. A move that is no longer legal
    /// fails the whole load.
    pub fn from_stored<E: RulesEngine>(
        root_position: &str,
        stored: &StoredNode,
        engine: &mut E,
    ) -> Result<Self> {
        if stored.mv != ROOT_MOVE {
            return Err(Error::MalformedTree(format!(
                "root move is '{}', expected '{}'",
                stored.mv, ROOT_MOVE
            )));
        }

        let mut tree = MoveTree::from_position(root_position)?;
        let root = tree.root();
        tree.slot_mut(root).order = stored.order;

        for child in &stored.children {
            tree.rebuild(root, child, engine)?;
        }

        Ok(tree)
    }

    fn rebuild<E: RulesEngine>(
        &mut self,
        parent: NodeId,
        stored: &StoredNode,
        engine: &mut E,
    ) -> Result<()> {
        let (base, parent_order) = {
            let node = self.slot(parent);
            (node.position.clone(), node.order)
        };
        engine.load(&base)?;
        let played = match engine.play_san(&stored.mv) {
            Ok(played) => played,
            Err(e) => {
                warn!("Stored move {} cannot be replayed: {}", stored.mv, e);
                return Err(e);
            }
        };

        // Siblings are compared by the SAN the board emits
        if self.find_child(parent, &played.san).is_some() {
            return Err(Error::MalformedTree(format!(
                "move {} appears twice from {}",
                played.san, base
            )));
        }
        if stored.order < parent_order {
            return Err(Error::MalformedTree(format!(
                "move {} has order {} below its parent's {}",
                played.san, stored.order, parent_order
            )));
        }

        let id = self.append_with_order(parent, played.san, engine.fen(), stored.order);
        self.set_quality(id, stored.quality);

        for child in &stored.children {
            self.rebuild(id, child, engine)?;
        }
        Ok(())
    }
}
