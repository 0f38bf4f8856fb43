//! Error types for position parsing, move submission and state validation.

use thiserror::Error;

/// A position string that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("position string is missing the {0} field")]
    MissingField(&'static str),

    #[error("expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),

    #[error("rank {rank} describes {files} files instead of 8")]
    FileCount { rank: usize, files: usize },

    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),

    #[error("expected exactly one {color} king, found {count}")]
    KingCount { color: &'static str, count: usize },

    #[error("invalid side to move '{0}'")]
    InvalidSide(String),

    #[error("invalid castling field '{0}'")]
    InvalidCastling(String),

    #[error("invalid en-passant square '{0}'")]
    InvalidEnPassant(String),

    #[error("invalid half-move clock '{0}'")]
    InvalidHalfmove(String),

    #[error("invalid full-move number '{0}'")]
    InvalidFullmove(String),

    #[error("unexpected trailing field '{0}'")]
    TrailingField(String),
}

/// A submitted move that was rejected. The position is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("malformed move notation '{0}'")]
    Malformed(String),

    #[error("illegal move '{0}'")]
    Illegal(String),
}

/// Incrementally maintained state disagrees with a from-scratch recomputation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("material mismatch: stored {stored}, recomputed {computed}")]
    Material { stored: i32, computed: i32 },

    #[error("hash mismatch: stored {stored:#018x}, recomputed {computed:#018x}")]
    Hash { stored: u64, computed: u64 },

    #[error("cached {color} king square {cached:#04x} does not hold the king")]
    KingSquare { color: &'static str, cached: usize },
}

/// Failure to set up a position from a string plus a move list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("move {index} of the list: {source}")]
    Move { index: usize, source: MoveError },
}
