//! Line protocol parser: the subset of UCI the engine understands.

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go {
        depth: Option<u8>,
        nodes: Option<u64>,
    },
    /// Print the board, position string and game state
    Display,
    Quit,
    Unknown(String),
}

fn value_after<T: std::str::FromStr>(parts: &[&str], i: usize) -> Option<T> {
    parts.get(i + 1).and_then(|v| v.parse().ok())
}

/// Parse a command from a string (simple tokenizer)
pub fn parse_uci_command(line: &str) -> UciCommand {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = parts.first() else {
        return UciCommand::Unknown(String::new());
    };

    match head {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "d" => UciCommand::Display,
        "quit" => UciCommand::Quit,
        "position" => {
            // position [fen <fenstring> | startpos] [moves <move1> ...]
            let moves_at = parts.iter().position(|&s| s == "moves");
            let setup_end = moves_at.unwrap_or(parts.len());
            let fen = match parts.get(1) {
                Some(&"startpos") => None,
                Some(&"fen") => Some(parts[2..setup_end].join(" ")),
                _ => return UciCommand::Unknown(line.trim().to_string()),
            };
            let moves = moves_at
                .map(|i| parts[i + 1..].iter().map(|m| m.to_string()).collect())
                .unwrap_or_default();
            UciCommand::Position { fen, moves }
        }
        "go" => {
            let mut depth = None;
            let mut nodes = None;
            let mut i = 1usize;
            while i < parts.len() {
                match parts[i] {
                    "depth" => {
                        depth = value_after(&parts, i);
                        i += 2;
                    }
                    "nodes" => {
                        nodes = value_after(&parts, i);
                        i += 2;
                    }
                    _ => i += 1,
                }
            }
            UciCommand::Go { depth, nodes }
        }
        other => UciCommand::Unknown(other.to_string()),
    }
}
