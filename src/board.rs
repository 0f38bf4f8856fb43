// Square mapping: 0x88 layout, a1 = 0x00, h1 = 0x07, a8 = 0x70, h8 = 0x77.
// Every slot holds a signed piece code: 0 empty, > 0 white, < 0 black.

use crate::error::{FenError, InvariantError, MoveError};
use crate::utils::{
    board_squares, file_of, inside, parse_square, rank_of, square, square_name, BISHOP_OFFSETS,
    BOARD_SIZE, KNIGHT_OFFSETS, NORTH, QUEEN_OFFSETS, ROOK_OFFSETS, WHITE_PAWN_CAPTURES,
};
use crate::zobrist;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub fn is_black(self) -> bool {
        self == Color::Black
    }

    /// Colour of a non-empty piece code.
    #[inline]
    pub fn of(code: i8) -> Option<Color> {
        match code {
            0 => None,
            c if c > 0 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum PieceKind {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

/// Centipawn values indexed by piece magnitude; kings are not counted.
pub const PIECE_VALUES: [i32; 7] = [0, 100, 300, 300, 500, 1000, 0];

impl PieceKind {
    #[inline]
    pub fn from_code(code: i8) -> Option<PieceKind> {
        match code.unsigned_abs() {
            1 => Some(PieceKind::Pawn),
            2 => Some(PieceKind::Knight),
            3 => Some(PieceKind::Bishop),
            4 => Some(PieceKind::Rook),
            5 => Some(PieceKind::Queen),
            6 => Some(PieceKind::King),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self, color: Color) -> i8 {
        self as i8 * color.sign()
    }

    #[inline]
    pub fn value(self) -> i32 {
        PIECE_VALUES[self as usize]
    }

    /// Knights, bishops and rooks take their movement from the file they stand on.
    #[inline]
    pub fn is_flickering(self) -> bool {
        matches!(self, PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook)
    }

    pub fn from_promotion_letter(ch: u8) -> Option<PieceKind> {
        match ch {
            b'n' => Some(PieceKind::Knight),
            b'b' => Some(PieceKind::Bishop),
            b'r' => Some(PieceKind::Rook),
            b'q' => Some(PieceKind::Queen),
            _ => None,
        }
    }

    fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    fn fen_char(self, color: Color) -> char {
        match color {
            Color::White => self.letter().to_ascii_uppercase(),
            Color::Black => self.letter(),
        }
    }
}

/// Effective movement role of a piece standing on `sq`.
///
/// Flickering pieces move as a rook on the a/h files, as a knight on the b/g
/// files and as a bishop on the c/f files. On the d/e files they keep their
/// stored identity. Pawns, queens and kings never change.
#[inline]
pub fn flicker_role(kind: PieceKind, sq: usize) -> PieceKind {
    if !kind.is_flickering() {
        return kind;
    }
    match file_of(sq) {
        0 | 7 => PieceKind::Rook,
        1 | 6 => PieceKind::Knight,
        2 | 5 => PieceKind::Bishop,
        _ => kind,
    }
}

#[inline]
fn signed_value(code: i8) -> i32 {
    match PieceKind::from_code(code) {
        Some(kind) => kind.value() * code.signum() as i32,
        None => 0,
    }
}

// Move flag byte; the low 3 bits carry the promoted piece kind.
pub const FLAG_NONE: u8 = 0;
pub const FLAG_CAPTURE: u8 = 8;
pub const FLAG_PROMOTION: u8 = 16;
pub const FLAG_CASTLING: u8 = 32;
pub const FLAG_EN_PASSANT: u8 = 64;
pub const FLAG_PAWN_JUMP: u8 = 128;

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: u8,
    to: u8,
    flags: u8,
}

impl Move {
    #[inline]
    pub const fn new(from: usize, to: usize, flags: u8) -> Self {
        Self {
            from: from as u8,
            to: to as u8,
            flags,
        }
    }

    #[inline]
    pub fn from_sq(self) -> usize {
        self.from as usize
    }

    #[inline]
    pub fn to_sq(self) -> usize {
        self.to as usize
    }

    #[inline]
    pub fn flags(self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn has_flag(self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    #[inline]
    pub fn is_capture(self) -> bool {
        self.has_flag(FLAG_CAPTURE)
    }

    #[inline]
    pub fn is_castling(self) -> bool {
        self.has_flag(FLAG_CASTLING)
    }

    #[inline]
    pub fn is_en_passant(self) -> bool {
        self.has_flag(FLAG_EN_PASSANT)
    }

    #[inline]
    pub fn is_pawn_jump(self) -> bool {
        self.has_flag(FLAG_PAWN_JUMP)
    }

    #[inline]
    pub fn promotion(self) -> Option<PieceKind> {
        if self.has_flag(FLAG_PROMOTION) {
            PieceKind::from_code((self.flags & 7) as i8)
        } else {
            None
        }
    }

    /// Captures and promotions, the moves quiescence search looks at.
    #[inline]
    pub fn is_tactical(self) -> bool {
        self.has_flag(FLAG_CAPTURE | FLAG_PROMOTION)
    }

    /// Four or five character notation, e.g. "e2e4" or "e7e8q".
    pub fn notation(self) -> String {
        let mut s = format!("{}{}", square_name(self.from_sq()), square_name(self.to_sq()));
        if let Some(kind) = self.promotion() {
            s.push(kind.letter());
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

/// Split notation into (from, to, promotion) without consulting a position.
pub fn parse_notation(notation: &str) -> Result<(usize, usize, Option<PieceKind>), MoveError> {
    let malformed = || MoveError::Malformed(notation.to_string());
    let bytes = notation.trim().as_bytes();
    if bytes.len() != 4 && bytes.len() != 5 {
        return Err(malformed());
    }
    let from = parse_square(&bytes[0..2]).ok_or_else(malformed)?;
    let to = parse_square(&bytes[2..4]).ok_or_else(malformed)?;
    let promotion = match bytes.get(4) {
        Some(&ch) => Some(PieceKind::from_promotion_letter(ch).ok_or_else(malformed)?),
        None => None,
    };
    Ok((from, to, promotion))
}

/// Snapshot taken by `do_move`, consumed by the matching `undo_move`.
#[derive(Debug, Clone, Copy)]
pub struct Undo {
    pub mv: Move,
    pub piece_from: i8,
    pub piece_to: i8,
    pub prev_castling: u8,
    pub prev_ep_file: Option<u8>,
    pub prev_material: i32,
    pub prev_hash: u64,
    pub prev_fifty: i32,
}

// Castling rights, one bit per side and wing.
pub const CASTLE_WHITE_QUEEN: u8 = 1;
pub const CASTLE_WHITE_KING: u8 = 2;
pub const CASTLE_BLACK_QUEEN: u8 = 4;
pub const CASTLE_BLACK_KING: u8 = 8;
pub const CASTLE_ALL: u8 = 15;

/// Rights that survive a piece leaving `sq`.
#[inline]
fn castling_mask(sq: usize) -> u8 {
    match sq {
        0x00 => CASTLE_ALL & !CASTLE_WHITE_QUEEN,
        0x04 => CASTLE_ALL & !(CASTLE_WHITE_QUEEN | CASTLE_WHITE_KING),
        0x07 => CASTLE_ALL & !CASTLE_WHITE_KING,
        0x70 => CASTLE_ALL & !CASTLE_BLACK_QUEEN,
        0x74 => CASTLE_ALL & !(CASTLE_BLACK_QUEEN | CASTLE_BLACK_KING),
        0x77 => CASTLE_ALL & !CASTLE_BLACK_KING,
        _ => CASTLE_ALL,
    }
}

/// Rook origin and destination for a castling king landing on `king_to`.
#[inline]
fn castling_rook_squares(king_to: usize) -> (usize, usize) {
    let base = king_to & 0x70;
    if file_of(king_to) == 2 {
        (base, base + 3)
    } else {
        (base + 7, base + 5)
    }
}

/// The fifty-move counter starts here and a draw is due when it reaches zero.
pub const FIFTY_MOVE_PLIES: i32 = 100;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0";

#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: [i8; BOARD_SIZE],
    side: Color,
    castling: u8,
    ep_file: Option<u8>,
    // White minus black, kings excluded
    material: i32,
    hash: u64,
    fifty: i32,
    king_sq: [usize; 2],
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard initial setup.
    pub fn new() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = [0i8; BOARD_SIZE];
        for (file, kind) in BACK_RANK.iter().enumerate() {
            board[square(file, 0)] = kind.code(Color::White);
            board[square(file, 1)] = PieceKind::Pawn.code(Color::White);
            board[square(file, 6)] = PieceKind::Pawn.code(Color::Black);
            board[square(file, 7)] = kind.code(Color::Black);
        }
        Self::from_parts(board, Color::White, CASTLE_ALL, None, FIFTY_MOVE_PLIES, [0x04, 0x74])
    }

    fn from_parts(
        board: [i8; BOARD_SIZE],
        side: Color,
        castling: u8,
        ep_file: Option<u8>,
        fifty: i32,
        king_sq: [usize; 2],
    ) -> Self {
        let mut pos = Self {
            board,
            side,
            castling,
            ep_file,
            material: 0,
            hash: 0,
            fifty,
            king_sq,
        };
        pos.material = pos.recalc_material();
        pos.hash = zobrist::recalc_zobrist_full(&pos);
        pos
    }

    // Accessors -------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: usize) -> i8 {
        self.board[sq]
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn castling(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn en_passant_file(&self) -> Option<u8> {
        self.ep_file
    }

    /// Material balance from white's point of view.
    #[inline]
    pub fn material(&self) -> i32 {
        self.material
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Plies left before the fifty-move rule applies.
    #[inline]
    pub fn fifty(&self) -> i32 {
        self.fifty
    }

    /// Half-moves since the last capture or pawn move.
    #[inline]
    pub fn halfmove_clock(&self) -> i32 {
        FIFTY_MOVE_PLIES - self.fifty
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> usize {
        self.king_sq[color as usize]
    }

    /// Stored kind and colour on `sq`, if any.
    #[inline]
    pub fn piece_on(&self, sq: usize) -> Option<(PieceKind, Color)> {
        let code = self.board[sq];
        Some((PieceKind::from_code(code)?, Color::of(code)?))
    }

    /// Kind the piece on `sq` currently moves as.
    #[inline]
    pub fn role_on(&self, sq: usize) -> Option<(PieceKind, Color)> {
        self.piece_on(sq)
            .map(|(kind, color)| (flicker_role(kind, sq), color))
    }

    fn recalc_material(&self) -> i32 {
        board_squares().map(|sq| signed_value(self.board[sq])).sum()
    }

    // Legality helpers -------------------------------------------

    /// First piece met walking from `sq` along `delta`, with its effective role.
    /// A king only counts when it stands right next to `sq`.
    fn first_on_ray(&self, sq: usize, delta: i32) -> Option<(PieceKind, Color)> {
        let mut y = sq as i32 + delta;
        let mut adjacent = true;
        while inside(y) {
            if let Some((role, color)) = self.role_on(y as usize) {
                if role == PieceKind::King && !adjacent {
                    return None;
                }
                return Some((role, color));
            }
            adjacent = false;
            y += delta;
        }
        None
    }

    pub fn is_attacked(&self, sq: usize, by: Color) -> bool {
        for &delta in &ROOK_OFFSETS {
            if let Some((role, color)) = self.first_on_ray(sq, delta) {
                if color == by
                    && matches!(role, PieceKind::Rook | PieceKind::Queen | PieceKind::King)
                {
                    return true;
                }
            }
        }
        for &delta in &BISHOP_OFFSETS {
            if let Some((role, color)) = self.first_on_ray(sq, delta) {
                if color == by
                    && matches!(role, PieceKind::Bishop | PieceKind::Queen | PieceKind::King)
                {
                    return true;
                }
            }
        }
        for &delta in &KNIGHT_OFFSETS {
            let y = sq as i32 + delta;
            if inside(y) && self.role_on(y as usize) == Some((PieceKind::Knight, by)) {
                return true;
            }
        }
        let pawn = PieceKind::Pawn.code(by);
        let s = by.sign() as i32;
        for &delta in &WHITE_PAWN_CAPTURES {
            let y = sq as i32 - delta * s;
            if inside(y) && self.board[y as usize] == pawn {
                return true;
            }
        }
        false
    }

    /// Is the side to move in check?
    pub fn is_check(&self) -> bool {
        self.is_attacked(self.king_square(self.side), self.side.opposite())
    }

    /// Called right after `do_move`: did the mover leave its own king safe?
    pub fn is_legal(&self) -> bool {
        let mover = self.side.opposite();
        !self.is_attacked(self.king_square(mover), self.side)
    }

    // Generate moves APIs -----------------------------------------

    /// Feed every pseudo-legal move of the side to move to `op`. Generation
    /// stops as soon as `op` returns true and that move is returned.
    pub fn enumerate_moves<F>(&self, mut op: F) -> Option<Move>
    where
        F: FnMut(Move) -> bool,
    {
        for sq in board_squares() {
            let Some((kind, color)) = self.piece_on(sq) else {
                continue;
            };
            if color != self.side {
                continue;
            }
            let found = match flicker_role(kind, sq) {
                PieceKind::Pawn => self.enumerate_pawn_moves(sq, &mut op),
                PieceKind::Knight => self.enumerate_piece_moves(sq, &KNIGHT_OFFSETS, false, &mut op),
                PieceKind::Bishop => self.enumerate_piece_moves(sq, &BISHOP_OFFSETS, true, &mut op),
                PieceKind::Rook => self.enumerate_piece_moves(sq, &ROOK_OFFSETS, true, &mut op),
                PieceKind::Queen => self.enumerate_piece_moves(sq, &QUEEN_OFFSETS, true, &mut op),
                PieceKind::King => self.enumerate_piece_moves(sq, &QUEEN_OFFSETS, false, &mut op),
            };
            if found.is_some() {
                return found;
            }
        }
        self.enumerate_castling_moves(&mut op)
    }

    fn enumerate_piece_moves<F>(
        &self,
        from: usize,
        offsets: &[i32],
        sliding: bool,
        op: &mut F,
    ) -> Option<Move>
    where
        F: FnMut(Move) -> bool,
    {
        let s = self.side.sign();
        for &delta in offsets {
            let mut y = from as i32 + delta;
            while inside(y) {
                let target = self.board[y as usize];
                if target == 0 {
                    let m = Move::new(from, y as usize, FLAG_NONE);
                    if op(m) {
                        return Some(m);
                    }
                    if !sliding {
                        break;
                    }
                    y += delta;
                } else {
                    if target * s < 0 {
                        let m = Move::new(from, y as usize, FLAG_CAPTURE);
                        if op(m) {
                            return Some(m);
                        }
                    }
                    break;
                }
            }
        }
        None
    }

    fn enumerate_pawn_moves<F>(&self, from: usize, op: &mut F) -> Option<Move>
    where
        F: FnMut(Move) -> bool,
    {
        let s = self.side.sign();
        let dir = s as i32;
        let rank = rank_of(from);
        let (rank_before_promotion, first_rank, ep_rank) = match self.side {
            Color::White => (6, 1, 4),
            Color::Black => (1, 6, 3),
        };

        let push = from as i32 + NORTH * dir;
        if inside(push) && self.board[push as usize] == 0 {
            if rank == rank_before_promotion {
                for kind in PROMOTION_KINDS {
                    let m = Move::new(from, push as usize, FLAG_PROMOTION | kind as u8);
                    if op(m) {
                        return Some(m);
                    }
                }
            } else {
                let m = Move::new(from, push as usize, FLAG_NONE);
                if op(m) {
                    return Some(m);
                }
                let jump = push + NORTH * dir;
                if rank == first_rank && self.board[jump as usize] == 0 {
                    let m = Move::new(from, jump as usize, FLAG_PAWN_JUMP);
                    if op(m) {
                        return Some(m);
                    }
                }
            }
        }

        if let Some(ep) = self.ep_file {
            if rank == ep_rank && file_of(from).abs_diff(ep as usize) == 1 {
                let to = square(ep as usize, (rank as i32 + dir) as usize);
                let m = Move::new(from, to, FLAG_CAPTURE | FLAG_EN_PASSANT);
                if op(m) {
                    return Some(m);
                }
            }
        }

        for &delta in &WHITE_PAWN_CAPTURES {
            let y = from as i32 + delta * dir;
            if !inside(y) || self.board[y as usize] * s >= 0 {
                continue;
            }
            if rank == rank_before_promotion {
                for kind in PROMOTION_KINDS {
                    let m = Move::new(from, y as usize, FLAG_CAPTURE | FLAG_PROMOTION | kind as u8);
                    if op(m) {
                        return Some(m);
                    }
                }
            } else {
                let m = Move::new(from, y as usize, FLAG_CAPTURE);
                if op(m) {
                    return Some(m);
                }
            }
        }
        None
    }

    fn enumerate_castling_moves<F>(&self, op: &mut F) -> Option<Move>
    where
        F: FnMut(Move) -> bool,
    {
        let (base, queen_bit, king_bit) = match self.side {
            Color::White => (0x00, CASTLE_WHITE_QUEEN, CASTLE_WHITE_KING),
            Color::Black => (0x70, CASTLE_BLACK_QUEEN, CASTLE_BLACK_KING),
        };
        if self.castling & (queen_bit | king_bit) == 0 {
            return None;
        }
        let king_from = base + 4;
        let enemy = self.side.opposite();
        if self.board[king_from] != PieceKind::King.code(self.side)
            || self.is_attacked(king_from, enemy)
        {
            return None;
        }
        let rook = PieceKind::Rook.code(self.side);
        if self.castling & queen_bit != 0
            && self.board[base] == rook
            && self.board[base + 1] == 0
            && self.board[base + 2] == 0
            && self.board[base + 3] == 0
            && !self.is_attacked(base + 3, enemy)
        {
            let m = Move::new(king_from, base + 2, FLAG_CASTLING);
            if op(m) {
                return Some(m);
            }
        }
        if self.castling & king_bit != 0
            && self.board[base + 7] == rook
            && self.board[base + 5] == 0
            && self.board[base + 6] == 0
            && !self.is_attacked(base + 5, enemy)
        {
            let m = Move::new(king_from, base + 6, FLAG_CASTLING);
            if op(m) {
                return Some(m);
            }
        }
        None
    }

    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut out = Vec::with_capacity(64);
        self.enumerate_moves(|m| {
            out.push(m);
            false
        });
        out
    }

    /// Does `m` keep the mover's king safe? The position is left unchanged.
    pub fn is_legal_move(&mut self, m: Move) -> bool {
        let undo = self.do_move(m);
        let legal = self.is_legal();
        self.undo_move(undo);
        legal
    }

    pub fn legal_moves(&mut self) -> Vec<Move> {
        let mut pseudo = self.pseudo_legal_moves();
        pseudo.retain(|&m| self.is_legal_move(m));
        pseudo
    }

    /// Stops at the first legal move found.
    pub fn has_legal_move(&mut self) -> bool {
        self.pseudo_legal_moves()
            .into_iter()
            .any(|m| self.is_legal_move(m))
    }

    pub fn is_checkmate(&mut self) -> bool {
        self.is_check() && !self.has_legal_move()
    }

    pub fn is_stalemate(&mut self) -> bool {
        !self.is_check() && !self.has_legal_move()
    }

    /// Only the two kings remain.
    pub fn is_insufficient_material(&self) -> bool {
        self.material == 0
            && board_squares().all(|sq| {
                let code = self.board[sq];
                code == 0 || code.unsigned_abs() == PieceKind::King as u8
            })
    }

    // Make / unmake ---------------------------------------------------

    pub fn do_move(&mut self, m: Move) -> Undo {
        let keys = zobrist::keys();
        let from = m.from_sq();
        let to = m.to_sq();
        let piece = self.board[from];
        let captured = self.board[to];
        let undo = Undo {
            mv: m,
            piece_from: piece,
            piece_to: captured,
            prev_castling: self.castling,
            prev_ep_file: self.ep_file,
            prev_material: self.material,
            prev_hash: self.hash,
            prev_fifty: self.fifty,
        };
        let placed = match m.promotion() {
            Some(kind) => kind.code(self.side),
            None => piece,
        };

        self.hash ^= keys.piece(piece, from);
        if captured != 0 {
            self.hash ^= keys.piece(captured, to);
            self.material -= signed_value(captured);
        }
        self.hash ^= keys.piece(placed, to);
        // Promotion gain minus the pawn; zero for ordinary moves
        self.material += signed_value(placed) - signed_value(piece);
        self.board[from] = 0;
        self.board[to] = placed;
        if piece.unsigned_abs() == PieceKind::King as u8 {
            self.king_sq[self.side as usize] = to;
        }

        let castling = self.castling & castling_mask(from);
        self.hash ^= keys.castling(self.castling) ^ keys.castling(castling);
        self.castling = castling;

        if let Some(file) = self.ep_file {
            self.hash ^= keys.ep_file(file);
        }
        self.ep_file = if m.is_pawn_jump() {
            Some(file_of(from) as u8)
        } else {
            None
        };
        if let Some(file) = self.ep_file {
            self.hash ^= keys.ep_file(file);
        }

        if m.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(to);
            let rook = self.board[rook_from];
            self.board[rook_from] = 0;
            self.board[rook_to] = rook;
            self.hash ^= keys.piece(rook, rook_from) ^ keys.piece(rook, rook_to);
        }
        if m.is_en_passant() {
            let victim_sq = square(file_of(to), rank_of(from));
            let victim = self.board[victim_sq];
            self.board[victim_sq] = 0;
            self.hash ^= keys.piece(victim, victim_sq);
            self.material += PieceKind::Pawn.value() * self.side.sign() as i32;
        }

        self.fifty = if m.is_capture() || piece.unsigned_abs() == PieceKind::Pawn as u8 {
            FIFTY_MOVE_PLIES
        } else {
            self.fifty - 1
        };
        self.side = self.side.opposite();
        self.hash ^= keys.side();
        undo
    }

    pub fn undo_move(&mut self, undo: Undo) {
        self.side = self.side.opposite();
        let m = undo.mv;
        let from = m.from_sq();
        let to = m.to_sq();

        if m.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(to);
            self.board[rook_from] = self.board[rook_to];
            self.board[rook_to] = 0;
        }
        if m.is_en_passant() {
            let victim_sq = square(file_of(to), rank_of(from));
            self.board[victim_sq] = PieceKind::Pawn.code(self.side.opposite());
        }
        self.board[to] = undo.piece_to;
        self.board[from] = undo.piece_from;
        if undo.piece_from.unsigned_abs() == PieceKind::King as u8 {
            self.king_sq[self.side as usize] = from;
        }

        self.castling = undo.prev_castling;
        self.ep_file = undo.prev_ep_file;
        self.material = undo.prev_material;
        self.hash = undo.prev_hash;
        self.fifty = undo.prev_fifty;
    }

    // Notation ----------------------------------------------------------

    /// Pseudo-legal move matching `notation`, without checking king safety.
    pub fn find_move(&self, notation: &str) -> Result<Move, MoveError> {
        let (from, to, promotion) = parse_notation(notation)?;
        self.enumerate_moves(|m| m.from_sq() == from && m.to_sq() == to && m.promotion() == promotion)
            .ok_or_else(|| MoveError::Illegal(notation.to_string()))
    }

    /// Apply `m` if it is legal; otherwise leave the position as it was.
    pub fn try_move(&mut self, m: Move) -> Option<Undo> {
        let undo = self.do_move(m);
        if self.is_legal() {
            Some(undo)
        } else {
            self.undo_move(undo);
            None
        }
    }

    pub fn do_notation_move(&mut self, notation: &str) -> Option<Undo> {
        let m = self.find_move(notation).ok()?;
        self.try_move(m)
    }

    /// Is there a legal promotion between the two squares named by `prefix`
    /// (e.g. "e7e8")? Used to ask for the promotion piece before it is known.
    pub fn is_legal_promotion(&mut self, prefix: &str) -> bool {
        let Some(squares) = prefix.trim().get(0..4) else {
            return false;
        };
        let Ok((from, to, _)) = parse_notation(squares) else {
            return false;
        };
        let mut candidates = Vec::with_capacity(4);
        self.enumerate_moves(|m| {
            if m.from_sq() == from && m.to_sq() == to && m.promotion().is_some() {
                candidates.push(m);
            }
            false
        });
        candidates.into_iter().any(|m| self.is_legal_move(m))
    }

    // Diagnostics ----------------------------------------------------

    /// Compare incremental material, hash and king squares against a rescan.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let computed = self.recalc_material();
        if computed != self.material {
            return Err(InvariantError::Material {
                stored: self.material,
                computed,
            });
        }
        let computed = zobrist::recalc_zobrist_full(self);
        if computed != self.hash {
            return Err(InvariantError::Hash {
                stored: self.hash,
                computed,
            });
        }
        for color in [Color::White, Color::Black] {
            let cached = self.king_square(color);
            if self.board[cached] != PieceKind::King.code(color) {
                return Err(InvariantError::KingSquare {
                    color: color.name(),
                    cached,
                });
            }
        }
        Ok(())
    }

    /// Count leaf nodes of the legal move tree.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let mut nodes = 0;
        for m in self.pseudo_legal_moves() {
            let undo = self.do_move(m);
            if self.is_legal() {
                nodes += if depth == 1 { 1 } else { self.perft(depth - 1) };
            }
            self.undo_move(undo);
        }
        nodes
    }

    /// Per-root-move perft counts, in generation order.
    pub fn divide(&mut self, depth: u32) -> Vec<(Move, u64)> {
        let moves = self.legal_moves();
        moves
            .into_iter()
            .map(|m| {
                let undo = self.do_move(m);
                let nodes = self.perft(depth.saturating_sub(1));
                self.undo_move(undo);
                (m, nodes)
            })
            .collect()
    }
}

// Position string parsing / export
impl Position {
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut parts = fen.split_whitespace();
        let placement = parts.next().ok_or(FenError::MissingField("piece placement"))?;
        let side_part = parts.next().ok_or(FenError::MissingField("side to move"))?;
        let castle_part = parts.next().ok_or(FenError::MissingField("castling"))?;
        let ep_part = parts.next().ok_or(FenError::MissingField("en-passant"))?;
        let halfmove_part = parts.next().ok_or(FenError::MissingField("half-move clock"))?;
        // A trailing full-move number is tolerated so standard FEN parses too
        if let Some(fullmove) = parts.next() {
            match fullmove.parse::<u32>() {
                Ok(n) if n > 0 => {}
                _ => return Err(FenError::InvalidFullmove(fullmove.to_string())),
            }
        }
        if let Some(extra) = parts.next() {
            return Err(FenError::TrailingField(extra.to_string()));
        }

        let mut board = [0i8; BOARD_SIZE];
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }
        let mut kings: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (i, rank_part) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for ch in rank_part.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::InvalidPiece(ch));
                    }
                    file += skip as usize;
                } else {
                    let color = if ch.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let kind = match ch.to_ascii_lowercase() {
                        'p' => PieceKind::Pawn,
                        'n' => PieceKind::Knight,
                        'b' => PieceKind::Bishop,
                        'r' => PieceKind::Rook,
                        'q' => PieceKind::Queen,
                        'k' => PieceKind::King,
                        _ => return Err(FenError::InvalidPiece(ch)),
                    };
                    if file >= 8 {
                        return Err(FenError::FileCount {
                            rank: rank + 1,
                            files: file + 1,
                        });
                    }
                    if kind == PieceKind::Pawn && (rank == 0 || rank == 7) {
                        return Err(FenError::InvalidPiece(ch));
                    }
                    let sq = square(file, rank);
                    if kind == PieceKind::King {
                        kings[color as usize].push(sq);
                    }
                    board[sq] = kind.code(color);
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::FileCount {
                        rank: rank + 1,
                        files: file,
                    });
                }
            }
            if file != 8 {
                return Err(FenError::FileCount {
                    rank: rank + 1,
                    files: file,
                });
            }
        }
        for color in [Color::White, Color::Black] {
            if kings[color as usize].len() != 1 {
                return Err(FenError::KingCount {
                    color: color.name(),
                    count: kings[color as usize].len(),
                });
            }
        }
        let king_sq = [kings[0][0], kings[1][0]];

        let side = match side_part {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::InvalidSide(side_part.to_string())),
        };

        let mut castling = 0u8;
        if castle_part != "-" {
            for ch in castle_part.chars() {
                let bit = match ch {
                    'K' => CASTLE_WHITE_KING,
                    'Q' => CASTLE_WHITE_QUEEN,
                    'k' => CASTLE_BLACK_KING,
                    'q' => CASTLE_BLACK_QUEEN,
                    _ => return Err(FenError::InvalidCastling(castle_part.to_string())),
                };
                if castling & bit != 0 {
                    return Err(FenError::InvalidCastling(castle_part.to_string()));
                }
                castling |= bit;
            }
        }

        let ep_file = match ep_part {
            "-" => None,
            s => {
                let invalid = || FenError::InvalidEnPassant(s.to_string());
                let sq = parse_square(s.as_bytes()).ok_or_else(invalid)?;
                // Target square behind a pawn of the side that just moved
                let (target_rank, pawn_rank) = match side {
                    Color::White => (5, 4),
                    Color::Black => (2, 3),
                };
                let pawn_sq = square(file_of(sq), pawn_rank);
                if rank_of(sq) != target_rank
                    || board[sq] != 0
                    || board[pawn_sq] != PieceKind::Pawn.code(side.opposite())
                {
                    return Err(invalid());
                }
                Some(file_of(sq) as u8)
            }
        };

        let halfmove: u16 = halfmove_part
            .parse()
            .map_err(|_| FenError::InvalidHalfmove(halfmove_part.to_string()))?;

        Ok(Self::from_parts(
            board,
            side,
            castling,
            ep_file,
            FIFTY_MOVE_PLIES - halfmove as i32,
            king_sq,
        ))
    }

    /// Five-field position string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_on(square(file, rank)) {
                    Some((kind, color)) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(kind.fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen.push(' ');
        fen.push(match self.side {
            Color::White => 'w',
            Color::Black => 'b',
        });
        fen.push(' ');
        if self.castling == 0 {
            fen.push('-');
        } else {
            for (bit, ch) in [
                (CASTLE_WHITE_KING, 'K'),
                (CASTLE_WHITE_QUEEN, 'Q'),
                (CASTLE_BLACK_KING, 'k'),
                (CASTLE_BLACK_QUEEN, 'q'),
            ] {
                if self.castling & bit != 0 {
                    fen.push(ch);
                }
            }
        }
        fen.push(' ');
        match self.ep_file {
            Some(file) => {
                let rank = match self.side {
                    Color::White => 5,
                    Color::Black => 2,
                };
                fen.push_str(&square_name(square(file as usize, rank)));
            }
            None => fen.push('-'),
        }
        fen.push(' ');
        fen.push_str(&self.halfmove_clock().to_string());
        fen
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

// Simple display (board diagram)
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                match self.piece_on(square(file, rank)) {
                    Some((kind, color)) => write!(f, "{} ", kind.fen_char(color))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}
