//! Command loop: reads protocol lines, drives the engine, writes replies

use super::parser::{parse_uci_command, UciCommand};
use crate::engine::Engine;
use crate::search::SearchParams;
use log::{trace, warn};
use std::io::{self, BufRead, Write};

pub struct UciEngine {
    engine: Engine,
    running: bool,
}

impl UciEngine {
    /// `params.max_depth` and `params.node_limit` apply when `go` leaves a
    /// limit out.
    pub fn new(params: SearchParams) -> Self {
        Self {
            engine: Engine::new(params),
            running: true,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn handle_command(&mut self, cmd: UciCommand) -> Vec<String> {
        let mut res = Vec::new();
        match cmd {
            UciCommand::Uci => {
                res.push("id name Flicker".to_string());
                res.push("id author the flickering-chess authors".to_string());
                res.push("uciok".to_string());
            }
            UciCommand::IsReady => {
                res.push("readyok".to_string());
            }
            UciCommand::UciNewGame => {
                self.engine.new_game();
            }
            UciCommand::Position { fen, moves } => {
                // Applied to a scratch game first; the current one survives any error
                if let Err(e) = self.engine.set_position(fen.as_deref(), &moves[..]) {
                    warn!("position rejected: {}", e);
                    res.push(format!("info string position rejected: {}", e));
                }
            }
            UciCommand::Go { depth, nodes } => {
                let params = self.engine.params();
                let depth = depth.unwrap_or(params.max_depth).max(1);
                let nodes = nodes.unwrap_or(params.node_limit);
                let outcome = self.engine.choose_move(depth, nodes);
                for report in &outcome.depths {
                    let pv = report
                        .best_move
                        .map(|m| format!(" pv {}", m))
                        .unwrap_or_default();
                    res.push(format!(
                        "info depth {} score cp {} nodes {}{}",
                        report.depth, report.score, report.nodes, pv
                    ));
                }
                match outcome.best_move {
                    Some(mv) => res.push(format!("bestmove {}", mv)),
                    None => {
                        res.push(format!("info string {}", self.engine.result()));
                        res.push("bestmove 0000".to_string());
                    }
                }
            }
            UciCommand::Display => {
                let game = self.engine.game();
                res.extend(game.to_string().lines().map(str::to_string));
                res.push(format!("result: {}", self.engine.result()));
            }
            UciCommand::Quit => {
                self.running = false;
            }
            UciCommand::Unknown(s) => {
                res.push(format!("info string unknown command: {}", s));
            }
        }
        res
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Run the loop over arbitrary streams until `quit` or end of input.
pub fn run_loop<R: BufRead, W: Write>(
    engine: &mut UciEngine,
    mut reader: R,
    mut writer: W,
) -> io::Result<()> {
    let mut buf = String::new();
    while engine.is_running() {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        trace!("<< {}", line);

        for r in process_uci_line(line, engine) {
            trace!(">> {}", r);
            writeln!(writer, "{}", r)?;
        }
        // Flush after every command so the peer sees replies immediately
        writer.flush()?;
    }
    Ok(())
}

pub fn run_uci_loop(params: SearchParams) -> io::Result<()> {
    let mut engine = UciEngine::new(params);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_loop(&mut engine, stdin.lock(), stdout.lock())
}

pub fn process_uci_line(line: &str, engine: &mut UciEngine) -> Vec<String> {
    let cmd = parse_uci_command(line);
    engine.handle_command(cmd)
}
