use flickering_chess::board::{Position, START_FEN};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position as _};
use test_case::test_case;

fn shakmaty_moves(fen: &str) -> Vec<String> {
    let setup: Fen = fen.parse().expect("shakmaty fen");
    let pos: Chess = setup
        .into_position(CastlingMode::Standard)
        .expect("shakmaty position");
    let mut out: Vec<String> = pos
        .legal_moves()
        .iter()
        .map(|m| m.to_uci(CastlingMode::Standard).to_string())
        .collect();
    out.sort();
    out
}

fn own_moves(fen: &str) -> Vec<String> {
    let mut pos = Position::from_fen(fen).expect("own fen");
    let mut out: Vec<String> = pos.legal_moves().iter().map(|m| m.notation()).collect();
    out.sort();
    out
}

// Every knight, bishop and rook stands on a file matching its own kind, so
// flickering and orthodox rules produce the same legal moves.
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1" ; "start position")]
#[test_case("r1bqk2r/pppp1ppp/8/2b1p3/2B1P3/8/PPPP1PPP/RNBQK2R w KQkq - 0 1" ; "kingside castling available")]
#[test_case("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1" ; "both castlings")]
#[test_case("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1" ; "both castlings for black")]
#[test_case("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1" ; "rook next to king")]
#[test_case("4k3/1P6/8/3pP3/8/8/8/4K3 w - d6 0 1" ; "en passant and promotion")]
#[test_case("4k3/8/8/8/8/8/8/3qK3 w - - 0 1" ; "queen check")]
#[test_case("4k3/8/8/8/8/2b5/3P4/4K3 w - - 0 1" ; "pinned pawn may only take the pinner")]
#[test_case("4k3/8/8/8/8/8/3P4/r3K3 w - - 0 1" ; "rook checks along rank")]
fn test_matches_orthodox_oracle(fen: &str) {
    flickering_chess::init();
    assert_eq!(own_moves(fen), shakmaty_moves(fen), "move sets differ for {}", fen);
}

#[test]
fn perft_start_position() {
    flickering_chess::init();
    let mut pos = Position::from_fen(START_FEN).unwrap();
    assert_eq!(pos.perft(1), 20);
    // Black's replies are unaffected by where white's first move landed
    assert_eq!(pos.perft(2), 400);
}

#[test]
fn divide_sums_to_perft() {
    flickering_chess::init();
    let mut pos = Position::new();
    let split = pos.divide(3);
    assert_eq!(split.len(), 20);
    let total: u64 = split.iter().map(|(_, n)| n).sum();
    assert_eq!(total, pos.perft(3));
    assert_eq!(pos, Position::new());
}
