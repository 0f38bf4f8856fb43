//! Engine facade: the small query surface a front end needs.

use crate::board::{Move, Position};
use crate::error::{MoveError, SetupError};
use crate::game::{Game, GameResult};
use crate::search::{Search, SearchOutcome, SearchParams};
use log::info;

pub struct Engine {
    game: Game,
    search: Search,
}

impl Engine {
    pub fn new(params: SearchParams) -> Self {
        Self {
            game: Game::new(),
            search: Search::new(params),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn params(&self) -> &SearchParams {
        self.search.params()
    }

    /// Apply a move in notation; a rejected move changes nothing.
    pub fn submit_move(&mut self, notation: &str) -> Result<Move, MoveError> {
        self.game.submit_move(notation)
    }

    /// Does the two-square prefix (e.g. "e7e8") need a promotion piece?
    pub fn is_legal_promotion(&mut self, prefix: &str) -> bool {
        self.game.position_mut().is_legal_promotion(prefix)
    }

    /// Search the current position. The move is returned, not played.
    ///
    /// The transposition table and history counters carry over between
    /// calls, so asking twice may return different moves. Identical engine
    /// state (a fresh engine, or one reset by `new_game`) gives identical
    /// results.
    pub fn choose_move(&mut self, max_depth: u8, max_nodes: u64) -> SearchOutcome {
        let outcome = self.search.root_search(&mut self.game, max_depth, max_nodes);
        info!(
            "chose {} (score {}, depth {}, {} nodes)",
            outcome.best_move.map_or_else(|| "(none)".to_string(), |m| m.notation()),
            outcome.score,
            outcome.completed_depth(),
            outcome.nodes
        );
        outcome
    }

    /// Back to the initial setup, with the search tables cleared.
    pub fn new_game(&mut self) {
        self.game = Game::new();
        self.search.clear();
    }

    /// Replace the game with `fen` (or the start position) followed by
    /// `moves`. Nothing changes unless every move applies.
    pub fn set_position<S: AsRef<str>>(
        &mut self,
        fen: Option<&str>,
        moves: &[S],
    ) -> Result<(), SetupError> {
        let position = match fen {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::new(),
        };
        let mut game = Game::with_position(position);
        for (index, m) in moves.iter().enumerate() {
            game.submit_move(m.as_ref())
                .map_err(|source| SetupError::Move { index, source })?;
        }
        self.game = game;
        Ok(())
    }

    pub fn result(&mut self) -> GameResult {
        self.game.result()
    }

    pub fn fen(&self) -> String {
        self.game.to_fen()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SearchParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_position_is_atomic() {
        let mut engine = Engine::new(SearchParams::new().tt_bits(10));
        engine.set_position(None, &["e2e4", "e7e5"]).unwrap();
        let before = engine.fen();

        let err = engine.set_position(None, &["e2e4", "e2e4"]).unwrap_err();
        assert!(matches!(err, SetupError::Move { index: 1, .. }));
        assert_eq!(engine.fen(), before);

        assert!(matches!(
            engine.set_position(Some("8/8/8 w - - 0"), &[] as &[&str]),
            Err(SetupError::Fen(_))
        ));
        assert_eq!(engine.fen(), before);
    }

    #[test]
    fn choose_move_does_not_play() {
        let mut engine = Engine::new(SearchParams::new().tt_bits(10));
        let before = engine.fen();
        let outcome = engine.choose_move(2, 0);
        assert!(outcome.best_move.is_some());
        assert_eq!(engine.fen(), before);
        let mv = outcome.best_move.unwrap();
        engine.submit_move(&mv.notation()).unwrap();
        assert_eq!(engine.game().moves(), &[mv]);
    }
}
