use clap::Parser;
use flickering_chess::board::{Position, START_FEN};

#[derive(Parser, Debug)]
#[command(author, version, about = "Count leaf nodes of the flickering-chess move tree", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    #[arg(short, long, default_value_t = 4)]
    depth: u32,

    /// Print the node count below every root move
    #[arg(long)]
    divide: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    flickering_chess::init();

    let mut pos = match Position::from_fen(&args.fen) {
        Ok(pos) => pos,
        Err(e) => {
            eprintln!("invalid position '{}': {}", args.fen, e);
            std::process::exit(2);
        }
    };

    println!("Running perft on FEN: '{}' at depth {}", args.fen, args.depth);

    let start = std::time::Instant::now();
    let nodes = if args.divide {
        let mut total = 0;
        for (mv, count) in pos.divide(args.depth) {
            println!("{}: {}", mv, count);
            total += count;
        }
        total
    } else {
        pos.perft(args.depth)
    };
    let duration = start.elapsed();

    println!(
        "perft({}) = {} nodes ({} ms, {:.2} Mnps)",
        args.depth,
        nodes,
        duration.as_millis(),
        nodes as f64 / (duration.as_micros().max(1) as f64)
    );
}
