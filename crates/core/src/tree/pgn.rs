//! PGN exchange for move trees
//!
//! The first child of a node is written as the main line, later children
//! as variations. Qualities travel as `!` and `?`.

use pgn_reader::{Nag, RawTag, SanPlus, Skip, Visitor};
use shakmaty::Color;
use std::io::Cursor;
use std::ops::ControlFlow;

use super::{MoveTree, NodeId, Quality};
use crate::engine::{RulesEngine, ShakmatyRules};
use crate::error::{Error, Result};
use crate::notation::{self, STANDARD_START};

/// Writes the whole tree as a single PGN game
pub fn to_pgn(tree: &MoveTree) -> String {
    let mut pgn = String::from("[Event \"Analysis\"]\n[Result \"*\"]\n");
    let root_position = &tree.root_node().position;
    if root_position != STANDARD_START {
        pgn.push_str("[SetUp \"1\"]\n");
        pgn.push_str(&format!("[FEN \"{}\"]\n", root_position));
    }
    pgn.push('\n');

    let mut tokens = Vec::new();
    write_children(tree, tree.root(), true, &mut tokens);
    tokens.push("*".to_string());

    let movetext = tokens.join(" ").replace("( ", "(").replace(" )", ")");
    pgn.push_str(&movetext);
    pgn.push('\n');
    pgn
}

fn write_children(tree: &MoveTree, parent: NodeId, force_number: bool, tokens: &mut Vec<String>) {
    let Some((main, alternatives)) = tree.children(parent).split_first() else {
        return;
    };

    tokens.push(move_token(tree, *main, force_number));
    for alternative in alternatives {
        tokens.push("(".to_string());
        tokens.push(move_token(tree, *alternative, true));
        write_children(tree, *alternative, false, tokens);
        tokens.push(")".to_string());
    }
    write_children(tree, *main, !alternatives.is_empty(), tokens);
}

fn move_token(tree: &MoveTree, id: NodeId, force_number: bool) -> String {
    let Some(node) = tree.node(id) else {
        return String::new();
    };
    let before = node
        .parent()
        .and_then(|p| tree.node(p))
        .map(|p| p.position.as_str())
        .unwrap_or(STANDARD_START);
    let number = notation::fullmove_number(before);
    let suffix = node.quality.map(Quality::symbol).unwrap_or("");

    match notation::side_to_move(before) {
        Color::White => format!("{}. {}{}", number, node.mv, suffix),
        Color::Black if force_number => format!("{}... {}{}", number, node.mv, suffix),
        Color::Black => format!("{}{}", node.mv, suffix),
    }
}

/// Reads the first game of `pgn` into a tree, variations included
pub fn from_pgn(pgn: &str) -> Result<MoveTree> {
    let mut reader = pgn_reader::Reader::new(Cursor::new(pgn.as_bytes()));
    match reader.read_game(&mut TreeBuilder) {
        Ok(Some(tree)) => tree,
        Ok(None) => Err(Error::Pgn("No game found in PGN".to_string())),
        Err(e) => Err(Error::Pgn(e.to_string())),
    }
}

#[derive(Default)]
struct TreeTags {
    fen: Option<String>,
}

struct TreeMovetext {
    tree: MoveTree,
    cursor: NodeId,
    variations: Vec<NodeId>,
    rules: ShakmatyRules,
}

struct TreeBuilder;

impl Visitor for TreeBuilder {
    type Tags = TreeTags;
    type Movetext = TreeMovetext;
    type Output = Result<MoveTree>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(TreeTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        if name == b"FEN" {
            tags.fen = Some(value.decode_utf8_lossy().to_string());
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let fen = tags.fen.as_deref().unwrap_or(STANDARD_START);
        match MoveTree::from_position(fen) {
            Ok(tree) => ControlFlow::Continue(TreeMovetext {
                cursor: tree.root(),
                tree,
                variations: Vec::new(),
                rules: ShakmatyRules::new(),
            }),
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        let position = movetext.tree.slot(movetext.cursor).position.clone();
        let played = movetext
            .rules
            .load(&position)
            .and_then(|_| movetext.rules.play_san(&san.san.to_string()));

        match played {
            Ok(played) => {
                let cursor = movetext.cursor;
                movetext.cursor = match movetext.tree.find_child(cursor, &played.san) {
                    Some(existing) => existing,
                    None => movetext
                        .tree
                        .append_child(cursor, played.san, movetext.rules.fen()),
                };
                ControlFlow::Continue(())
            }
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn nag(&mut self, movetext: &mut Self::Movetext, nag: Nag) -> ControlFlow<Self::Output> {
        let quality = match nag.0 {
            1 | 3 => Some(Quality::Favorable),
            2 | 4 => Some(Quality::Unfavorable),
            _ => return ControlFlow::Continue(()),
        };
        movetext.tree.set_quality(movetext.cursor, quality);
        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        // A variation replaces the move just played
        let cursor = movetext.cursor;
        movetext.variations.push(cursor);
        movetext.cursor = movetext.tree.slot(cursor).parent().unwrap_or(cursor);
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, movetext: &mut Self::Movetext) -> ControlFlow<Self::Output> {
        if let Some(cursor) = movetext.variations.pop() {
            movetext.cursor = cursor;
        }
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        Ok(movetext.tree)
    }
}
