//! Interactive board
//!
//! Turns gestures (drag, drop, tap, hover) into moves checked by the rules
//! engine. Each gesture is one transition of [`BoardState`] and returns the
//! events the host has to render or forward.

mod types;

pub use types::*;

use shakmaty::{Color, Rank, Role, Square};
use tracing::debug;

use crate::config::{Configuration, PointerMode};
use crate::engine::{RulesEngine, ShakmatyRules};
use crate::error::Result;
use crate::messages::Messages;

pub struct Board<E: RulesEngine = ShakmatyRules> {
    rules: E,
    state: BoardState,
    /// Side whose pieces may be moved
    player: Color,
    orientation: Color,
    /// First tap on a touch screen
    selected: Option<Square>,
    settings: BoardSettings,
    messages: Messages,
}

impl<E: RulesEngine + Default> Board<E> {
    pub fn new(settings: BoardSettings, messages: Messages) -> Self {
        Self::with_rules(E::default(), settings, messages)
    }
}

impl<E: RulesEngine> Board<E> {
    pub fn with_rules(rules: E, settings: BoardSettings, messages: Messages) -> Self {
        Self {
            player: rules.turn(),
            rules,
            state: BoardState::Idle,
            orientation: Color::White,
            selected: None,
            settings,
            messages,
        }
    }

    /// Sets up `fen` from scratch
    pub fn build(&mut self, fen: &str) -> Result<Vec<BoardEvent>> {
        self.rules.load(fen)?;
        self.reset_after_load();
        debug!("Board built on {}", fen);

        Ok(vec![
            BoardEvent::ClearHighlights,
            BoardEvent::ShowPosition {
                fen: self.rules.fen(),
                animate: false,
            },
        ])
    }

    /// Jumps to a position that is already known to be legal
    pub fn show_position(&mut self, fen: &str) -> Result<Vec<BoardEvent>> {
        self.rules.load(fen)?;
        self.reset_after_load();

        let mut events = vec![BoardEvent::ClearHighlights];
        if self.settings.play_sounds {
            events.push(BoardEvent::PlaySound(Sound::Move));
        }
        events.push(BoardEvent::ShowPosition {
            fen: self.rules.fen(),
            animate: true,
        });
        Ok(events)
    }

    pub fn begin_drag(&mut self, source: Square) -> Vec<BoardEvent> {
        if let Some(blocked) = self.blocked() {
            return blocked;
        }
        self.selected = None;

        let Some(piece) = self.rules.piece_at(source) else {
            return Vec::new();
        };
        if piece.color != self.player || self.rules.turn() != self.player {
            return Vec::new();
        }

        debug!("Picked up {:?} on {}", piece.role, source);
        self.state = BoardState::SquareActive { source };
        self.destination_highlights(source)
    }

    /// Drops the piece from `from` on `to`. Any touch selection is dropped
    /// with it.
    pub fn drop(&mut self, from: Square, to: Square) -> Vec<BoardEvent> {
        if let Some(blocked) = self.blocked() {
            return blocked;
        }
        self.selected = None;

        let mut events = vec![BoardEvent::ClearHighlights];
        if from == to {
            self.state = BoardState::SquareActive { source: from };
            events.extend(self.destination_highlights(from));
            return events;
        }

        // Try it for legality, then take it back
        let Some(trial) = self.rules.play(from, to, Role::Queen) else {
            debug!("Rejected drop {}{}", from, to);
            self.state = BoardState::Idle;
            events.push(BoardEvent::SnapBack);
            return events;
        };
        self.rules.undo();

        if trial.role == Role::Pawn && matches!(to.rank(), Rank::First | Rank::Eighth) {
            self.state = BoardState::AwaitingPromotion {
                from,
                to,
                side: self.player,
            };
            events.push(BoardEvent::PromotionRequested { side: self.player });
            return events;
        }

        events.extend(self.commit(from, to, Role::Queen));
        events
    }

    /// Completes a pending promotion. `None` cancels the whole drop.
    pub fn resolve_promotion(&mut self, choice: Option<Role>) -> Vec<BoardEvent> {
        let BoardState::AwaitingPromotion { from, to, .. } = self.state else {
            return vec![BoardEvent::Warning(self.messages.no_promotion_pending.clone())];
        };
        self.state = BoardState::Idle;

        let mut events = Vec::new();
        match choice {
            Some(role) => events.extend(self.commit(from, to, role)),
            None => debug!("Promotion on {} cancelled", to),
        }
        events.push(BoardEvent::ShowPosition {
            fen: self.rules.fen(),
            animate: false,
        });
        events
    }

    pub fn mouse_over(&mut self, square: Square) -> Vec<BoardEvent> {
        if self.settings.pointer == PointerMode::Touch {
            return self.tap(square);
        }
        if !matches!(self.state, BoardState::Idle | BoardState::SquareActive { .. })
            || self.rules.turn() != self.player
            || self.rules.piece_at(square).is_none()
        {
            return Vec::new();
        }
        self.destination_highlights(square)
    }

    pub fn mouse_out(&mut self, _square: Square) -> Vec<BoardEvent> {
        if self.settings.highlight_squares && self.settings.pointer == PointerMode::Precise {
            vec![BoardEvent::ClearHighlights]
        } else {
            Vec::new()
        }
    }

    /// Touch input: the first tap picks a piece up, a tap on another square
    /// drops it there, a second tap on the same square puts it back.
    pub fn tap(&mut self, square: Square) -> Vec<BoardEvent> {
        if let Some(blocked) = self.blocked() {
            return blocked;
        }

        match self.selected.take() {
            None => {
                let events = self.begin_drag(square);
                if matches!(self.state, BoardState::SquareActive { .. }) {
                    self.selected = Some(square);
                }
                events
            }
            Some(selected) if selected == square => {
                self.state = BoardState::Idle;
                vec![BoardEvent::ClearHighlights]
            }
            Some(selected) => {
                let mut events = self.drop(selected, square);
                if events.contains(&BoardEvent::SnapBack) {
                    // Tapping another own piece switches the selection
                    events.extend(self.begin_drag(square));
                    if matches!(self.state, BoardState::SquareActive { .. }) {
                        self.selected = Some(square);
                    }
                } else if !matches!(self.state, BoardState::AwaitingPromotion { .. }) {
                    events.push(BoardEvent::ShowPosition {
                        fen: self.rules.fen(),
                        animate: false,
                    });
                }
                events
            }
        }
    }

    /// Turns the board around. Returns the side now at the bottom.
    pub fn flip(&mut self) -> Color {
        self.orientation = !self.orientation;
        self.orientation
    }

    pub fn apply_settings(&mut self, config: &Configuration) {
        self.settings = BoardSettings::from(config);
        self.selected = None;
    }

    pub fn fen(&self) -> String {
        self.rules.fen()
    }

    pub fn turn(&self) -> Color {
        self.rules.turn()
    }

    pub fn is_game_over(&self) -> bool {
        self.rules.is_over()
    }

    pub fn is_checkmate(&self) -> bool {
        self.rules.is_checkmate()
    }

    pub fn winner(&self) -> Option<Color> {
        if self.rules.is_checkmate() {
            Some(!self.rules.turn())
        } else {
            None
        }
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn player(&self) -> Color {
        self.player
    }

    pub fn orientation(&self) -> Color {
        self.orientation
    }

    pub fn settings(&self) -> BoardSettings {
        self.settings
    }

    pub fn rules(&self) -> &E {
        &self.rules
    }

    fn commit(&mut self, from: Square, to: Square, promotion: Role) -> Vec<BoardEvent> {
        let Some(played) = self.rules.play(from, to, promotion) else {
            self.state = BoardState::Idle;
            return vec![BoardEvent::SnapBack];
        };

        let mut events = Vec::new();
        if self.settings.play_sounds {
            events.push(BoardEvent::PlaySound(Sound::Move));
        }
        events.push(BoardEvent::LastMove {
            from: played.from,
            to: played.to,
        });
        let san = self
            .rules
            .history()
            .last()
            .cloned()
            .unwrap_or(played.san);
        debug!("Committed {}", san);
        events.push(BoardEvent::MoveMade(san));

        match self.game_over_reason() {
            Some(reason) => {
                if self.settings.play_sounds {
                    let sound = if reason == GameOverReason::Checkmate {
                        Sound::Success
                    } else {
                        Sound::Fail
                    };
                    events.push(BoardEvent::PlaySound(sound));
                }
                events.push(BoardEvent::GameOver(reason.message(&self.messages)));
                self.state = BoardState::GameOver { reason };
            }
            None => {
                self.player = !self.player;
                self.state = BoardState::Idle;
            }
        }
        events
    }

    fn game_over_reason(&self) -> Option<GameOverReason> {
        if !self.rules.is_over() {
            return None;
        }
        let reason = if self.rules.is_checkmate() {
            GameOverReason::Checkmate
        } else if self.rules.is_stalemate() {
            GameOverReason::Stalemate
        } else if self.rules.is_insufficient_material() {
            GameOverReason::InsufficientMaterial
        } else if self.rules.is_threefold_repetition() {
            GameOverReason::ThreefoldRepetition
        } else if self.rules.is_draw_by_fifty_moves() {
            GameOverReason::FiftyMoveRule
        } else {
            GameOverReason::Other
        };
        Some(reason)
    }

    fn reset_after_load(&mut self) {
        self.player = self.rules.turn();
        self.selected = None;
        self.state = match self.game_over_reason() {
            Some(reason) => BoardState::GameOver { reason },
            None => BoardState::Idle,
        };
    }

    /// Events for a gesture the current state does not accept, if any
    fn blocked(&self) -> Option<Vec<BoardEvent>> {
        match self.state {
            BoardState::AwaitingPromotion { .. } => Some(vec![BoardEvent::Warning(
                self.messages.promotion_pending.clone(),
            )]),
            BoardState::GameOver { .. } => Some(Vec::new()),
            BoardState::Idle | BoardState::SquareActive { .. } => None,
        }
    }

    fn destination_highlights(&self, source: Square) -> Vec<BoardEvent> {
        if !self.settings.highlight_squares {
            return Vec::new();
        }
        let destinations = self.rules.legal_destinations(source);
        if destinations.is_empty() {
            return Vec::new();
        }
        let mut squares = vec![source];
        squares.extend(destinations);
        vec![BoardEvent::Highlight(squares)]
    }
}
