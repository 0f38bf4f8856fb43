use flickering_chess::engine::Engine;
use flickering_chess::game::{Game, GameResult};
use flickering_chess::search::{Search, SearchParams, MATE_THRESHOLD};
use flickering_chess::Color;

fn small_search() -> Search {
    Search::new(SearchParams::new().tt_bits(14))
}

fn game(fen: &str) -> Game {
    flickering_chess::init();
    Game::from_fen(fen).expect("valid position string")
}

#[test]
fn mate_in_1_scholar() {
    // Neither black knight can reach f7: both stand on bishop files
    let mut g = game("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4");
    let mut search = small_search();
    let outcome = search.root_search(&mut g, 3, 0);

    assert!(
        outcome.score >= MATE_THRESHOLD,
        "score {} indicates no mate found",
        outcome.score
    );
    let mv = outcome.best_move.expect("a move in a won position");
    g.play(mv).unwrap();
    assert_eq!(
        g.result(),
        GameResult::Checkmate {
            winner: Color::White
        }
    );
}

#[test]
fn search_is_deterministic_from_fresh_state() {
    let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4";
    let mut first = game(fen);
    let mut second = game(fen);

    let a = small_search().root_search(&mut first, 3, 0);
    let b = small_search().root_search(&mut second, 3, 0);
    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.score, b.score);
    assert_eq!(a.nodes, b.nodes);
}

#[test]
fn cleared_search_repeats_its_first_result() {
    let mut g = game(flickering_chess::board::START_FEN);
    let mut search = small_search();
    let first = search.root_search(&mut g, 4, 0);

    // The second call reuses the table and history, so only the cleared
    // instance is guaranteed to match
    search.root_search(&mut g, 4, 0);
    search.clear();
    let again = search.root_search(&mut g, 4, 0);
    assert_eq!(again.best_move, first.best_move);
    assert_eq!(again.score, first.score);
    assert_eq!(again.nodes, first.nodes);
}

#[test]
fn engine_new_game_repeats_its_first_choice() {
    flickering_chess::init();
    let mut engine = Engine::new(SearchParams::new().tt_bits(14));
    let first = engine.choose_move(4, 0);
    engine.choose_move(4, 0);
    engine.new_game();
    let again = engine.choose_move(4, 0);
    assert_eq!(again.best_move, first.best_move);
    assert_eq!(again.nodes, first.nodes);
}

#[test]
fn search_restores_position() {
    let mut g = game("r3k2r/pp3ppp/2n5/3pP3/8/2N5/PP3PPP/R3K2R w KQkq d6 0");
    let fen = g.to_fen();
    let hashes = g.hashes().to_vec();

    let outcome = small_search().root_search(&mut g, 3, 0);
    assert!(outcome.best_move.is_some());
    assert_eq!(g.to_fen(), fen);
    assert_eq!(g.hashes(), &hashes[..]);
    g.position().validate().unwrap();
}

#[test]
fn node_budget_stops_after_first_iteration() {
    let mut g = game(flickering_chess::board::START_FEN);
    let outcome = small_search().root_search(&mut g, 6, 1);
    assert_eq!(outcome.completed_depth(), 1);
    assert!(outcome.best_move.is_some());
    assert!(outcome.nodes >= 1);
}

#[test]
fn iterations_are_reported_in_order() {
    let mut g = game(flickering_chess::board::START_FEN);
    let outcome = small_search().root_search(&mut g, 3, 0);
    let depths: Vec<u8> = outcome.depths.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![1, 2, 3]);
    let nodes: Vec<u64> = outcome.depths.iter().map(|r| r.nodes).collect();
    assert!(nodes.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn no_move_when_game_is_over() {
    let mut mated = game("k7/8/1K6/8/8/8/8/7R w - - 0");
    mated.submit_move("h1h8").unwrap();
    let outcome = small_search().root_search(&mut mated, 3, 0);
    assert_eq!(outcome.best_move, None);
    assert!(outcome.score <= -MATE_THRESHOLD);

    let mut stalemate = game("7k/5Q2/6K1/8/8/8/8/8 b - - 0");
    let outcome = small_search().root_search(&mut stalemate, 3, 0);
    assert_eq!(outcome.best_move, None);
    assert_eq!(outcome.score, 0);
}

#[test]
fn takes_hanging_rook() {
    // The queen takes along the a-file; the king on e8 is too far to recapture
    let mut g = game("r3k3/8/8/8/8/8/8/Q3K3 w - - 0");
    let outcome = small_search().root_search(&mut g, 2, 0);
    assert_eq!(outcome.best_move.map(|m| m.notation()), Some("a1a8".to_string()));
}
