//! Analysis move tree
//!
//! Every explored line hangs off a root node holding the starting position.
//! Nodes live in an arena and refer to each other by [`NodeId`]; the parent
//! link is an index, so the tree has no ownership cycle and the persisted
//! form simply leaves it out (see [`StoredNode`]).

mod pgn;
mod stored;

pub use pgn::{from_pgn, to_pgn};
pub use stored::StoredNode;

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::error::{Error, Result};
use crate::notation;

/// Move text of the root node: "no move, starting position"
pub const ROOT_MOVE: &str = "[0]";

/// Handle to a node of one [`MoveTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

/// Human judgement attached to a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "+")]
    Favorable,
    #[serde(rename = "-")]
    Unfavorable,
}

impl Quality {
    /// PGN move suffix
    pub fn symbol(self) -> &'static str {
        match self {
            Quality::Favorable => "!",
            Quality::Unfavorable => "?",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoveNode {
    /// SAN of the move leading here, [`ROOT_MOVE`] for the root
    pub mv: String,
    /// FEN after the move
    pub position: String,
    /// Full-move number of this move
    pub order: u32,
    /// `None` means unset
    pub quality: Option<Quality>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MoveNode {
    fn new(mv: String, position: String, order: u32, parent: Option<NodeId>) -> Self {
        Self {
            mv,
            position,
            order,
            quality: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Side that played the move leading to this node
    pub fn mover(&self) -> Color {
        !notation::side_to_move(&self.position)
    }
}

/// Branching record of explored lines with a single current pointer
#[derive(Debug, Clone)]
pub struct MoveTree {
    nodes: Vec<Option<MoveNode>>,
    current: NodeId,
}

impl MoveTree {
    const ROOT: NodeId = NodeId(0);

    /// Fresh tree rooted at `fen`. The root's order is one less than the
    /// position's move number.
    pub fn from_position(fen: &str) -> Result<Self> {
        notation::parse_position(fen)?;
        let move_number = notation::starting_move_number(fen)?;
        let root = MoveNode::new(
            ROOT_MOVE.to_string(),
            fen.trim().to_string(),
            move_number - 1,
            None,
        );

        Ok(Self {
            nodes: vec![Some(root)],
            current: Self::ROOT,
        })
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn current_node(&self) -> &MoveNode {
        self.slot(self.current)
    }

    pub fn node(&self, id: NodeId) -> Option<&MoveNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.root_node().children.is_empty()
    }

    pub fn root_node(&self) -> &MoveNode {
        self.slot(Self::ROOT)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Nodes from the root down to `id`, both included
    pub fn line_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut cursor = self.node(id).map(|_| id);
        while let Some(node_id) = cursor {
            line.push(node_id);
            cursor = self.node(node_id).and_then(|n| n.parent);
        }
        line.reverse();
        line
    }

    /// Records a move played from the current node.
    ///
    /// An existing child with the same move becomes current; otherwise a new
    /// child holding `position` is appended. Returns the new current node.
    pub fn record_move(&mut self, mv: &str, position: String) -> NodeId {
        if let Some(existing) = self.find_child(self.current, mv) {
            self.current = existing;
            return existing;
        }
        let id = self.append_child(self.current, mv.to_string(), position);
        self.current = id;
        id
    }

    /// Removes the current node and its subtree.
    ///
    /// At the root every line is wiped. Elsewhere the pointer moves to the
    /// parent's last remaining child, or to the parent itself.
    pub fn remove_current(&mut self) {
        let current = self.current;
        let Some(parent) = self.slot(current).parent else {
            let children = std::mem::take(&mut self.slot_mut(Self::ROOT).children);
            for child in children {
                self.vacate(child);
            }
            return;
        };

        self.slot_mut(parent).children.retain(|c| *c != current);
        self.vacate(current);
        self.current = self
            .slot(parent)
            .children
            .last()
            .copied()
            .unwrap_or(parent);
    }

    /// unset -> favorable, unfavorable -> unset
    pub fn quality_up(&mut self) {
        if self.current == Self::ROOT {
            return;
        }
        let node = self.slot_mut(self.current);
        node.quality = match node.quality {
            None => Some(Quality::Favorable),
            Some(Quality::Unfavorable) => None,
            Some(Quality::Favorable) => Some(Quality::Favorable),
        };
    }

    /// unset -> unfavorable, favorable -> unset
    pub fn quality_down(&mut self) {
        if self.current == Self::ROOT {
            return;
        }
        let node = self.slot_mut(self.current);
        node.quality = match node.quality {
            None => Some(Quality::Unfavorable),
            Some(Quality::Favorable) => None,
            Some(Quality::Unfavorable) => Some(Quality::Unfavorable),
        };
    }

    pub fn navigate(&mut self, id: NodeId) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::NodeNotFound(id.0));
        }
        self.current = id;
        Ok(())
    }

    pub(crate) fn find_child(&self, parent: NodeId, mv: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.node(*c).map_or(false, |n| n.mv == mv))
    }

    /// Appends a child without touching the current pointer.
    /// The order is the move number the parent position is at.
    pub(crate) fn append_child(&mut self, parent: NodeId, mv: String, position: String) -> NodeId {
        let order = self.child_order(parent);
        self.append_with_order(parent, mv, position, order)
    }

    pub(crate) fn append_with_order(
        &mut self,
        parent: NodeId,
        mv: String,
        position: String,
        order: u32,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Some(MoveNode::new(mv, position, order, Some(parent))));
        self.slot_mut(parent).children.push(id);
        id
    }

    pub(crate) fn set_quality(&mut self, id: NodeId, quality: Option<Quality>) {
        if id != Self::ROOT {
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::as_mut) {
                node.quality = quality;
            }
        }
    }

    /// Move number of a child of `parent`: the fullmove field of the parent
    /// position, never below the parent's own order.
    ///
    /// The count follows the position, not a fixed side. From a root with
    /// black to move at move `n` the root holds `n - 1` and black's reply
    /// is numbered `n`, not `n - 1`; the white move after it gets `n + 1`.
    fn child_order(&self, parent: NodeId) -> u32 {
        let node = self.slot(parent);
        let next = notation::fullmove_number(&node.position);
        next.max(node.order)
    }

    fn vacate(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                pending.extend(node.children);
            }
        }
    }

    // Callers only hold ids of live nodes; the current pointer and every
    // child/parent link are kept live by remove_current.
    fn slot(&self, id: NodeId) -> &MoveNode {
        match self.nodes.get(id.0).and_then(Option::as_ref) {
            Some(node) => node,
            None => unreachable!("dangling node id {}", id.0),
        }
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut MoveNode {
        match self.nodes.get_mut(id.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => unreachable!("dangling node id {}", id.0),
        }
    }
}
