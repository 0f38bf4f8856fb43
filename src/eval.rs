//! Static evaluation: material, mobility and pawn structure.
//!
//! Mobility follows the flicker role of each piece, so the same knight is
//! worth a rook's reach on the a-file and a bishop's on the c-file. The
//! result is always relative to the side to move.

use crate::board::{Color, PieceKind, Position};
use crate::utils::{
    board_squares, distance, file_of, inside, rank_of, square, to_index64, BISHOP_OFFSETS,
    KNIGHT_OFFSETS, QUEEN_OFFSETS, ROOK_OFFSETS,
};

// ============================================================================
// MOBILITY
// ============================================================================

/// Weight of one reachable square, a1 first. Base 2, +3 on the central 16
/// squares, +3 more on d4/e4/d5/e5.
const MOBILITY_SQUARE: [i32; 64] = [
    2, 2, 2, 2, 2, 2, 2, 2, //
    2, 2, 2, 2, 2, 2, 2, 2, //
    2, 2, 5, 5, 5, 5, 2, 2, //
    2, 2, 5, 8, 8, 5, 2, 2, //
    2, 2, 5, 8, 8, 5, 2, 2, //
    2, 2, 5, 5, 5, 5, 2, 2, //
    2, 2, 2, 2, 2, 2, 2, 2, //
    2, 2, 2, 2, 2, 2, 2, 2, //
];

/// Extra weight for a reachable square touching the enemy king.
const KING_ZONE_BONUS: i32 = 5;

fn square_weight(sq: usize, enemy_king: usize) -> i32 {
    let mut w = MOBILITY_SQUARE[to_index64(sq)];
    if distance(sq, enemy_king) == 1 {
        w += KING_ZONE_BONUS;
    }
    w
}

/// Sum of square weights over every empty or enemy-occupied square the
/// pieces of `color` reach with their current role. Pawns and kings are
/// not counted.
pub fn mobility(pos: &Position, color: Color) -> i32 {
    let enemy_king = pos.king_square(color.opposite());
    let s = color.sign();
    let mut score = 0;
    for sq in board_squares() {
        let Some((role, owner)) = pos.role_on(sq) else {
            continue;
        };
        if owner != color {
            continue;
        }
        let (offsets, sliding): (&[i32], bool) = match role {
            PieceKind::Knight => (&KNIGHT_OFFSETS, false),
            PieceKind::Bishop => (&BISHOP_OFFSETS, true),
            PieceKind::Rook => (&ROOK_OFFSETS, true),
            PieceKind::Queen => (&QUEEN_OFFSETS, true),
            PieceKind::Pawn | PieceKind::King => continue,
        };
        for &delta in offsets {
            let mut y = sq as i32 + delta;
            while inside(y) {
                let target = pos.piece_at(y as usize);
                if target * s > 0 {
                    break;
                }
                score += square_weight(y as usize, enemy_king);
                if target != 0 || !sliding {
                    break;
                }
                y += delta;
            }
        }
    }
    score
}

// ============================================================================
// PAWN STRUCTURE
// ============================================================================

/// Bonus for a passed pawn by ranks advanced from its own back rank.
const PASSED_PAWN: [i32; 8] = [0, 5, 10, 20, 35, 60, 100, 0];

/// Bonus for a d- or e-file pawn by ranks advanced.
const CENTRAL_PAWN: [i32; 8] = [0, 0, 5, 15, 20, 10, 0, 0];

fn advance(sq: usize, color: Color) -> usize {
    match color {
        Color::White => rank_of(sq),
        Color::Black => 7 - rank_of(sq),
    }
}

/// No enemy pawn ahead on the same or an adjacent file.
fn is_passed(pos: &Position, sq: usize, color: Color) -> bool {
    let enemy_pawn = PieceKind::Pawn.code(color.opposite());
    let file = file_of(sq) as i32;
    let rank = rank_of(sq) as i32;
    let step = color.sign() as i32;
    let mut r = rank + step;
    while (0..8).contains(&r) {
        for f in (file - 1)..=(file + 1) {
            if (0..8).contains(&f) && pos.piece_at(square(f as usize, r as usize)) == enemy_pawn {
                return false;
            }
        }
        r += step;
    }
    true
}

pub fn pawn_structure(pos: &Position, color: Color) -> i32 {
    let pawn = PieceKind::Pawn.code(color);
    let mut score = 0;
    for sq in board_squares() {
        if pos.piece_at(sq) != pawn {
            continue;
        }
        let adv = advance(sq, color);
        if is_passed(pos, sq, color) {
            score += PASSED_PAWN[adv];
        }
        if matches!(file_of(sq), 3 | 4) {
            score += CENTRAL_PAWN[adv];
        }
    }
    score
}

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Full static evaluation in centipawns from the side to move's view.
pub fn evaluate(pos: &Position) -> i32 {
    let white = mobility(pos, Color::White) + pawn_structure(pos, Color::White);
    let black = mobility(pos, Color::Black) + pawn_structure(pos, Color::Black);
    let score = pos.material() + white - black;
    match pos.side() {
        Color::White => score,
        Color::Black => -score,
    }
}
