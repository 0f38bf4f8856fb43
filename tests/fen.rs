use flickering_chess::board::{Position, START_FEN};
use flickering_chess::error::FenError;
use flickering_chess::game::Game;
use test_case::test_case;

#[test]
fn test_round_trip_after_moves() {
    flickering_chess::init();
    let mut game = Game::new();
    game.submit_move("e2e4").unwrap();
    let fen = game.to_fen();
    assert_eq!(fen, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0");

    let parsed = Position::from_fen(&fen).unwrap();
    assert_eq!(&parsed, game.position());
    assert_eq!(parsed.hash(), game.position().hash());
}

#[test]
fn test_halfmove_clock_maps_to_fifty_counter() {
    flickering_chess::init();
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 30").unwrap();
    assert_eq!(pos.fifty(), 70);
    assert_eq!(pos.halfmove_clock(), 30);
    assert!(pos.to_fen().ends_with(" 30"));
}

#[test]
fn test_fullmove_field_accepted() {
    flickering_chess::init();
    let six = format!("{} 1", START_FEN);
    let pos: Position = six.parse().unwrap();
    assert_eq!(pos, Position::new());
    assert_eq!(pos.to_fen(), START_FEN);
}

#[test]
fn test_castling_subset_round_trip() {
    flickering_chess::init();
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0";
    let pos = Position::from_fen(fen).unwrap();
    assert_eq!(pos.castling(), 0b0110);
    assert_eq!(pos.to_fen(), fen);
}

#[test_case("rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0", FenError::RankCount(7) ; "seven ranks")]
#[test_case("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0", FenError::FileCount { rank: 7, files: 9 } ; "nine files")]
#[test_case("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0", FenError::FileCount { rank: 7, files: 7 } ; "seven files")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR w kq - 0", FenError::KingCount { color: "white", count: 0 } ; "missing king")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/4k3/PPPPPPPP/RNBQKBNR w KQ - 0", FenError::KingCount { color: "black", count: 2 } ; "two kings")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0", FenError::InvalidPiece('X') ; "bad piece letter")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0", FenError::InvalidSide("x".to_string()) ; "bad side")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkqK - 0", FenError::InvalidCastling("KQkqK".to_string()) ; "repeated castling letter")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e3 0", FenError::InvalidEnPassant("e3".to_string()) ; "en passant square for wrong side")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x", FenError::InvalidHalfmove("x".to_string()) ; "bad half-move clock")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -", FenError::MissingField("half-move clock") ; "missing half-move clock")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0", FenError::InvalidFullmove("0".to_string()) ; "zero full-move number")]
#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra", FenError::TrailingField("extra".to_string()) ; "trailing field")]
#[test_case("4k3/8/8/8/8/8/8/P3K3 w - - 0", FenError::InvalidPiece('P') ; "pawn on first rank")]
fn test_rejects_malformed(fen: &str, expected: FenError) {
    assert_eq!(Position::from_fen(fen), Err(expected));
}

#[test]
fn test_error_messages_are_readable() {
    let err = Position::from_fen("8/8/8/8/8/8/8/8 w - - 0").unwrap_err();
    assert_eq!(err.to_string(), "expected exactly one white king, found 0");
}
