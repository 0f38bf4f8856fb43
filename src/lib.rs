pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod game;
pub mod search;
pub mod uci;
pub mod utils;
pub mod zobrist;

pub use board::{Color, Move, PieceKind, Position};
pub use engine::Engine;
pub use game::{Game, GameResult};

pub fn init() {
    zobrist::init_zobrist();
}
