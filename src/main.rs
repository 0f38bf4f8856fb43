//! Flicker: flickering-chess engine speaking a UCI-style line protocol.

use clap::Parser;
use flickering_chess::search::SearchParams;
use flickering_chess::uci::run_uci_loop;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transposition table holds 2^N slots
    #[arg(long, default_value_t = 20)]
    tt_bits: u32,

    /// Search depth used when `go` gives none
    #[arg(short, long, default_value_t = 6)]
    depth: u8,

    /// Soft node budget used when `go` gives none (0 = unlimited)
    #[arg(short, long, default_value_t = 0)]
    nodes: u64,
}

fn main() {
    // Logs go to stderr; stdout carries the protocol
    env_logger::init();
    let args = Args::parse();
    flickering_chess::init();

    let params = SearchParams::new()
        .tt_bits(args.tt_bits)
        .max_depth(args.depth)
        .node_limit(args.nodes);

    if let Err(e) = run_uci_loop(params) {
        eprintln!("protocol loop failed: {:?}", e);
        std::process::exit(1);
    }
}
