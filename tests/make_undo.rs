use flickering_chess::board::Position;
use flickering_chess::game::Game;
use test_case::test_case;

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

// Walks random games and checks that every legal move keeps the position
// consistent and that undoing it restores the exact previous state.
#[test_case(0x9E37_79B9_7F4A_7C15 ; "seed a")]
#[test_case(0x0123_4567_89AB_CDEF ; "seed b")]
#[test_case(0xDEAD_BEEF_CAFE_F00D ; "seed c")]
#[test_case(42 ; "seed d")]
fn test_random_walk_undo(seed: u64) {
    flickering_chess::init();
    let mut rng = XorShift(seed);
    let mut game = Game::new();

    for _ in 0..200 {
        if game.result().is_over() {
            break;
        }
        let mut pos = game.position().clone();
        let moves = pos.legal_moves();
        assert!(!moves.is_empty());

        for &m in &moves {
            let before = pos.clone();
            let undo = pos.do_move(m);
            pos.validate()
                .unwrap_or_else(|e| panic!("{} after {}: {}", before.to_fen(), m, e));
            assert!(!pos.is_attacked(pos.king_square(before.side()), pos.side()));
            pos.undo_move(undo);
            assert_eq!(pos, before);
            assert_eq!(pos.hash(), before.hash());
        }

        let pick = moves[(rng.next() % moves.len() as u64) as usize];
        game.play(pick).unwrap();
        let reparsed = Position::from_fen(&game.to_fen()).unwrap();
        assert_eq!(reparsed.hash(), game.position().hash());
    }
}
