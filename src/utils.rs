// 0x88 square helpers and offset tables for move generation and search
//
// A square is `rank * 16 + file`; bit 3 and bit 7 are never set on the board,
// so `sq & 0x88 != 0` flags anything that walked off an edge.

pub const BOARD_SIZE: usize = 128;

// Direction deltas
pub const NORTH: i32 = 16;
pub const SOUTH: i32 = -16;
pub const EAST: i32 = 1;
pub const WEST: i32 = -1;
pub const NORTH_EAST: i32 = 17;
pub const NORTH_WEST: i32 = 15;
pub const SOUTH_EAST: i32 = -15;
pub const SOUTH_WEST: i32 = -17;

pub const KNIGHT_OFFSETS: [i32; 8] = [-33, -31, -18, -14, 14, 18, 31, 33];
pub const BISHOP_OFFSETS: [i32; 4] = [SOUTH_WEST, SOUTH_EAST, NORTH_WEST, NORTH_EAST];
pub const ROOK_OFFSETS: [i32; 4] = [SOUTH, WEST, EAST, NORTH];
pub const QUEEN_OFFSETS: [i32; 8] = [
    SOUTH_WEST, SOUTH, SOUTH_EAST, WEST, EAST, NORTH_WEST, NORTH, NORTH_EAST,
];

// White pawns capture towards higher ranks; black offsets are the negation.
pub const WHITE_PAWN_CAPTURES: [i32; 2] = [NORTH_WEST, NORTH_EAST];

#[inline]
pub fn inside(sq: i32) -> bool {
    (sq & 0x88) == 0
}

#[inline]
pub fn square(file: usize, rank: usize) -> usize {
    (rank << 4) | file
}

#[inline]
pub fn file_of(sq: usize) -> usize {
    sq & 7
}

#[inline]
pub fn rank_of(sq: usize) -> usize {
    sq >> 4
}

/// Packs a 0x88 square into 0..64 (a1 = 0, h8 = 63).
#[inline]
pub fn to_index64(sq: usize) -> usize {
    (rank_of(sq) << 3) | file_of(sq)
}

/// Iterates the 64 on-board squares, a1 first.
pub fn board_squares() -> impl Iterator<Item = usize> {
    (0..8).flat_map(|rank| (0..8).map(move |file| square(file, rank)))
}

/// Chebyshev distance between two on-board squares.
pub fn distance(a: usize, b: usize) -> usize {
    let df = file_of(a).abs_diff(file_of(b));
    let dr = rank_of(a).abs_diff(rank_of(b));
    df.max(dr)
}

/// Convert a square to algebraic notation (e.g. 0x00 -> "a1", 0x77 -> "h8")
pub fn square_name(sq: usize) -> String {
    let file_char = (b'a' + file_of(sq) as u8) as char;
    let rank_char = (b'1' + rank_of(sq) as u8) as char;
    format!("{}{}", file_char, rank_char)
}

/// Parse two bytes of algebraic notation into a 0x88 square.
pub fn parse_square(s: &[u8]) -> Option<usize> {
    if s.len() != 2 {
        return None;
    }
    let (file, rank) = (s[0], s[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(square((file - b'a') as usize, (rank - b'1') as usize))
}
