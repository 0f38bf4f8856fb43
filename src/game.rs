//! Game layer: one position plus the moves and hashes that led to it.
//!
//! Terminal results are classified here, so the search only needs the
//! position and the hash history.

use crate::board::{Color, Move, Position};
use crate::error::{FenError, MoveError};
use log::{debug, info};
use std::fmt;

/// Outcome of the game as seen from the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
}

impl GameResult {
    pub fn is_over(self) -> bool {
        self != GameResult::InProgress
    }

    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameResult::Stalemate
                | GameResult::FiftyMoveRule
                | GameResult::ThreefoldRepetition
                | GameResult::InsufficientMaterial
        )
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::InProgress => write!(f, "in progress"),
            GameResult::Checkmate { winner } => write!(f, "checkmate, {} wins", winner.name()),
            GameResult::Stalemate => write!(f, "draw by stalemate"),
            GameResult::FiftyMoveRule => write!(f, "draw by fifty-move rule"),
            GameResult::ThreefoldRepetition => write!(f, "draw by threefold repetition"),
            GameResult::InsufficientMaterial => write!(f, "draw by insufficient material"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    moves: Vec<Move>,
    // One entry per ply, the starting position included
    hashes: Vec<u64>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::with_position(Position::new())
    }

    pub fn with_position(position: Position) -> Self {
        let hashes = vec![position.hash()];
        Self {
            position,
            moves: Vec::new(),
            hashes,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::with_position(Position::from_fen(fen)?))
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Parse, validate and apply a move given in notation.
    ///
    /// A rejected move leaves the game exactly as it was.
    pub fn submit_move(&mut self, notation: &str) -> Result<Move, MoveError> {
        let m = self.position.find_move(notation)?;
        if self.position.try_move(m).is_none() {
            debug!("rejected {}: leaves the king in check", notation);
            return Err(MoveError::Illegal(notation.to_string()));
        }
        self.record(m);
        Ok(m)
    }

    /// Apply an already constructed move, checking that it is legal here.
    pub fn play(&mut self, m: Move) -> Result<(), MoveError> {
        let generated = self.position.enumerate_moves(|g| g == m).is_some();
        if !generated || self.position.try_move(m).is_none() {
            return Err(MoveError::Illegal(m.notation()));
        }
        self.record(m);
        Ok(())
    }

    fn record(&mut self, m: Move) {
        self.moves.push(m);
        self.hashes.push(self.position.hash());
        debug!("played {} -> {}", m, self.position.to_fen());
        let result = self.result();
        if result.is_over() {
            info!("game over after {} plies: {}", self.moves.len(), result);
        }
    }

    /// How often the current position occurred, the current one included.
    pub fn repetition_count(&self) -> usize {
        let current = self.position.hash();
        self.hashes.iter().filter(|&&h| h == current).count()
    }

    /// Classify the current position. Mate and stalemate take priority over
    /// every draw rule.
    pub fn result(&mut self) -> GameResult {
        if !self.position.has_legal_move() {
            return if self.position.is_check() {
                GameResult::Checkmate {
                    winner: self.position.side().opposite(),
                }
            } else {
                GameResult::Stalemate
            };
        }
        if self.position.fifty() <= 0 {
            return GameResult::FiftyMoveRule;
        }
        if self.repetition_count() >= 3 {
            return GameResult::ThreefoldRepetition;
        }
        if self.position.is_insufficient_material() {
            return GameResult::InsufficientMaterial;
        }
        GameResult::InProgress
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.position)?;
        writeln!(f, "fen: {}", self.position.to_fen())?;
        let moves: Vec<String> = self.moves.iter().map(|m| m.notation()).collect();
        writeln!(f, "moves: {}", moves.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_move_keeps_state() {
        let mut game = Game::new();
        let before = game.to_fen();
        assert!(matches!(game.submit_move("e2e5"), Err(MoveError::Illegal(_))));
        assert!(matches!(game.submit_move("zz"), Err(MoveError::Malformed(_))));
        assert_eq!(game.to_fen(), before);
        assert_eq!(game.hashes().len(), 1);
        assert!(game.moves().is_empty());
    }

    #[test]
    fn history_grows_per_ply() {
        let mut game = Game::new();
        game.submit_move("e2e4").unwrap();
        game.submit_move("e7e5").unwrap();
        assert_eq!(game.moves().len(), 2);
        assert_eq!(game.hashes().len(), 3);
        assert_eq!(game.hashes()[2], game.position().hash());
        assert_eq!(game.result(), GameResult::InProgress);
    }

    #[test]
    fn play_rejects_foreign_move() {
        let mut game = Game::new();
        let bogus = Move::new(0x04, 0x44, 0);
        assert!(game.play(bogus).is_err());
        assert_eq!(game.moves().len(), 0);
    }
}
