// Zobrist hashing with precomputed tables
use crate::board::Position;
use crate::utils::{board_squares, BOARD_SIZE};
use std::sync::OnceLock;

/// Fixed-seed key set. Piece keys are indexed by `code + 6` so both colours
/// fit one table; slot 6 (empty) stays unused.
pub struct ZobristKeys {
    pieces: [[u64; BOARD_SIZE]; 13],
    side: u64,
    castling: [u64; 16],
    ep_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

const SEED: u64 = 0x5eed_f11c_6e12_c4e5;

fn split_mix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

fn generate() -> ZobristKeys {
    let mut state = SEED;
    let mut pieces = [[0u64; BOARD_SIZE]; 13];
    for (code_index, row) in pieces.iter_mut().enumerate() {
        if code_index == 6 {
            continue;
        }
        for sq in board_squares() {
            row[sq] = split_mix64(&mut state);
        }
    }
    let side = split_mix64(&mut state);
    let mut castling = [0u64; 16];
    // Rights 0 hash to zero so an empty castling field adds nothing.
    for key in castling.iter_mut().skip(1) {
        *key = split_mix64(&mut state);
    }
    let mut ep_file = [0u64; 8];
    for key in ep_file.iter_mut() {
        *key = split_mix64(&mut state);
    }
    ZobristKeys {
        pieces,
        side,
        castling,
        ep_file,
    }
}

pub fn init_zobrist() {
    KEYS.get_or_init(generate);
}

#[inline]
pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(generate)
}

impl ZobristKeys {
    #[inline]
    pub fn piece(&self, code: i8, sq: usize) -> u64 {
        self.pieces[(code + 6) as usize][sq]
    }

    #[inline]
    pub fn side(&self) -> u64 {
        self.side
    }

    #[inline]
    pub fn castling(&self, rights: u8) -> u64 {
        self.castling[(rights & 15) as usize]
    }

    #[inline]
    pub fn ep_file(&self, file: u8) -> u64 {
        self.ep_file[(file & 7) as usize]
    }
}

/// Recompute the hash of a position by scanning the whole board.
pub fn recalc_zobrist_full(pos: &Position) -> u64 {
    let keys = keys();
    let mut h = 0u64;
    for sq in board_squares() {
        let code = pos.piece_at(sq);
        if code != 0 {
            h ^= keys.piece(code, sq);
        }
    }
    if pos.side().is_black() {
        h ^= keys.side();
    }
    h ^= keys.castling(pos.castling());
    if let Some(file) = pos.en_passant_file() {
        h ^= keys.ep_file(file);
    }
    h
}
