//! Integration tests for the line protocol front end

use flickering_chess::search::SearchParams;
use flickering_chess::uci::{process_uci_line, run_loop, UciEngine};
use std::io::Cursor;

fn engine() -> UciEngine {
    flickering_chess::init();
    UciEngine::new(SearchParams::new().tt_bits(12).max_depth(2))
}

fn info_depths(responses: &[String]) -> usize {
    responses.iter().filter(|r| r.starts_with("info depth ")).count()
}

#[test]
fn test_handshake() {
    let mut engine = engine();
    let responses = process_uci_line("uci", &mut engine);
    assert_eq!(responses.len(), 3);
    assert!(responses[0].starts_with("id name"));
    assert!(responses[1].starts_with("id author"));
    assert_eq!(responses[2], "uciok");

    assert_eq!(process_uci_line("isready", &mut engine), vec!["readyok"]);
}

#[test]
fn test_go_reports_iterations_then_bestmove() {
    let mut engine = engine();
    assert!(process_uci_line("position startpos moves e2e4 e7e5", &mut engine).is_empty());
    let responses = process_uci_line("go depth 2", &mut engine);
    assert_eq!(responses.len(), 3);
    assert!(responses[0].starts_with("info depth 1 "));
    assert!(responses[1].starts_with("info depth 2 "));
    assert!(responses[2].starts_with("bestmove "));

    // The chosen move is reported, not played
    assert_eq!(engine.engine().game().moves().len(), 2);
}

#[test]
fn test_go_limits_default_to_search_params() {
    let mut engine = engine();
    let responses = process_uci_line("go", &mut engine);
    assert_eq!(info_depths(&responses), 2);
    assert!(responses.last().is_some_and(|r| r.starts_with("bestmove ")));

    // An explicit depth wins over the configured one
    let responses = process_uci_line("go depth 1", &mut engine);
    assert_eq!(info_depths(&responses), 1);

    flickering_chess::init();
    let mut budgeted = UciEngine::new(SearchParams::new().tt_bits(12).max_depth(5).node_limit(1));
    let responses = process_uci_line("go", &mut budgeted);
    assert_eq!(info_depths(&responses), 1, "node budget stops after the first iteration");
}

#[test]
fn test_bad_position_keeps_previous_game() {
    let mut engine = engine();
    process_uci_line("position startpos moves e2e4", &mut engine);
    let before = engine.engine().fen();

    let responses = process_uci_line("position startpos moves e2e4 e2e4", &mut engine);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].starts_with("info string position rejected"));
    assert_eq!(engine.engine().fen(), before);

    let responses = process_uci_line("position fen 8/8/8/8 w - - 0", &mut engine);
    assert!(responses[0].starts_with("info string position rejected"));
    assert_eq!(engine.engine().fen(), before);
}

#[test]
fn test_go_in_finished_game() {
    let mut engine = engine();
    process_uci_line("position fen 7k/5Q2/6K1/8/8/8/8/8 b - - 0", &mut engine);
    let responses = process_uci_line("go", &mut engine);
    assert_eq!(
        responses,
        vec!["info string draw by stalemate", "bestmove 0000"]
    );
}

#[test]
fn test_display_shows_result() {
    let mut engine = engine();
    process_uci_line("position startpos moves f2f3 e7e5 g2g4 d8h4", &mut engine);
    let responses = process_uci_line("d", &mut engine);
    assert_eq!(
        responses.last().map(String::as_str),
        Some("result: checkmate, black wins")
    );
    assert!(responses.iter().any(|l| l.starts_with("fen: ")));
}

#[test]
fn test_run_loop_over_streams() {
    let mut engine = engine();
    let input = "uci\n\nisready\nposition startpos\ngo depth 1\nquit\nisready\n";
    let mut output = Vec::new();
    run_loop(&mut engine, Cursor::new(input), &mut output).unwrap();

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"uciok"));
    assert_eq!(lines.iter().filter(|l| **l == "readyok").count(), 1, "nothing runs after quit");
    assert!(lines.last().is_some_and(|l| l.starts_with("bestmove ")));
    assert!(!engine.is_running());
}

#[test]
fn test_new_game_resets_position() {
    let mut engine = engine();
    process_uci_line("position startpos moves d2d4", &mut engine);
    process_uci_line("ucinewgame", &mut engine);
    assert_eq!(engine.engine().fen(), flickering_chess::board::START_FEN);
}
