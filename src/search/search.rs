//! Main search engine implementation
//!
//! Iterative deepening alpha-beta (principal variation search) with a
//! transposition table, history move ordering, check and pawn-push
//! extensions, and a quiescence search over captures and promotions.

use super::history::HistoryTable;
use super::params::{SearchParams, PLY};
use super::stats::{DepthReport, SearchOutcome, SearchStats};
use super::tt::{score_to_tt, NodeType, TranspositionTable};
use crate::board::{Color, Move, PieceKind, Position, FIFTY_MOVE_PLIES};
use crate::eval::evaluate;
use crate::game::Game;
use crate::utils::rank_of;
use log::{debug, info};

/// Search engine configurations
pub const INFINITE: i32 = 32000;
pub const MATE: i32 = 30000;
pub const MATE_THRESHOLD: i32 = MATE - 1000;

/// Hard recursion guard, extensions included
pub const MAX_PLY: usize = 128;

// Move ordering bands
const ORDER_TT_MOVE: i64 = 1 << 30;
const ORDER_TACTICAL: i64 = 1 << 20;

/// Material swing of a capture or promotion, used to order tactical moves.
pub fn material_delta(pos: &Position, m: Move) -> i32 {
    let captured = if m.is_en_passant() {
        PieceKind::Pawn.value()
    } else {
        PieceKind::from_code(pos.piece_at(m.to_sq())).map_or(0, |k| k.value())
    };
    let promotion = m
        .promotion()
        .map_or(0, |k| k.value() - PieceKind::Pawn.value());
    captured + promotion
}

/// Main search engine
pub struct Search {
    /// Transposition table for caching
    tt: TranspositionTable,

    /// Quiet-move history for ordering
    history: HistoryTable,

    /// Search parameters
    params: SearchParams,

    /// Search statistics
    stats: SearchStats,

    /// Hashes of the game since the last irreversible move, then of every
    /// node above the current one
    path: Vec<u64>,

    /// Best move of the last root node searched
    root_best: Option<Move>,
}

impl Search {
    pub fn new(params: SearchParams) -> Self {
        Self {
            tt: TranspositionTable::new(params.tt_bits),
            history: HistoryTable::new(),
            params,
            stats: SearchStats::new(),
            path: Vec::with_capacity(FIFTY_MOVE_PLIES as usize + MAX_PLY),
            root_best: None,
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    /// Forget everything learned in earlier games.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.history.clear();
    }

    /// Pick a move for the side to move in `game`.
    ///
    /// `max_nodes` is a soft ceiling checked between iterations (0 means no
    /// limit). The game's position is restored before returning. Tables
    /// learned in earlier calls are reused; call `clear` first to repeat a
    /// search exactly.
    pub fn root_search(&mut self, game: &mut Game, max_depth: u8, max_nodes: u64) -> SearchOutcome {
        self.stats.reset();
        self.stats.start_timing();
        self.tt.new_search();
        self.history.age();
        self.root_best = None;

        // Earlier positions back to the last capture or pawn move count as draws
        let reversible = (FIFTY_MOVE_PLIES - game.position().fifty()).max(0) as usize;
        let hashes = game.hashes();
        let earlier = &hashes[..hashes.len().saturating_sub(1)];
        let start = earlier.len().saturating_sub(reversible);
        self.path.clear();
        self.path.extend_from_slice(&earlier[start..]);

        let pos = game.position_mut();
        let mut outcome = SearchOutcome {
            best_move: None,
            score: 0,
            nodes: 0,
            depths: Vec::new(),
            stats: SearchStats::new(),
        };

        if !pos.has_legal_move() {
            outcome.score = if pos.is_check() { -MATE } else { 0 };
            debug!("root search: no legal move in {}", pos.to_fen());
            return self.finish(outcome);
        }

        let window = self.params.aspiration_window;
        for depth in 1..=max_depth.max(1) {
            let units = depth as i32 * PLY;
            let score = if depth == 1 {
                self.search(pos, -INFINITE, INFINITE, units, 0)
            } else {
                let alpha = outcome.score - window;
                let beta = outcome.score + window;
                let score = self.search(pos, alpha, beta, units, 0);
                if score <= alpha {
                    debug!("depth {}: fail low at {}, re-searching", depth, score);
                    self.stats.inc_research();
                    self.search(pos, -INFINITE, beta, units, 0)
                } else if score >= beta {
                    debug!("depth {}: fail high at {}, re-searching", depth, score);
                    self.stats.inc_research();
                    self.search(pos, alpha, INFINITE, units, 0)
                } else {
                    score
                }
            };

            if self.root_best.is_some() {
                outcome.best_move = self.root_best;
            }
            outcome.score = score;
            let report = DepthReport {
                depth,
                best_move: outcome.best_move,
                score,
                nodes: self.stats.nodes,
            };
            info!("{}", report);
            outcome.depths.push(report);

            if score.abs() >= MATE_THRESHOLD {
                debug!("mate score {} at depth {}, stopping", score, depth);
                break;
            }
            if max_nodes > 0 && self.stats.nodes >= max_nodes {
                debug!(
                    "node budget {} spent after depth {} ({} nodes)",
                    max_nodes, depth, self.stats.nodes
                );
                break;
            }
        }

        debug_assert!(pos.validate().is_ok(), "search left the position inconsistent");
        self.finish(outcome)
    }

    fn finish(&mut self, mut outcome: SearchOutcome) -> SearchOutcome {
        self.stats.update_timing();
        outcome.nodes = self.stats.nodes;
        outcome.stats = self.stats.clone();
        debug!("search done: {}", self.stats);
        outcome
    }

    /// Principal variation search. `depth` is in `PLY` units.
    fn search(&mut self, pos: &mut Position, mut alpha: i32, beta: i32, depth: i32, ply: usize) -> i32 {
        self.stats.inc_node();
        let hash = pos.hash();

        if ply > 0 && (pos.fifty() <= 0 || self.path.contains(&hash)) {
            return 0;
        }

        if depth <= 0 || ply >= MAX_PLY {
            return if self.params.enable_quiescence {
                self.quiescence(pos, alpha, beta, ply)
            } else {
                evaluate(pos)
            };
        }

        let orig_alpha = alpha;
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(hash) {
            self.stats.inc_tt_hit();
            tt_move = entry.best_move;
            if ply > 0 && entry.depth >= depth {
                if let Some(score) = entry.cutoff(ply, alpha, beta) {
                    self.stats.inc_tt_cutoff();
                    return score;
                }
            }
        }

        let in_check = pos.is_check();
        let moves = self.order_moves(pos, tt_move);
        let mut best = -INFINITE;
        let mut best_move = None;
        let mut legal = 0;

        self.path.push(hash);
        for mv in moves {
            let undo = pos.do_move(mv);
            if !pos.is_legal() {
                pos.undo_move(undo);
                continue;
            }
            legal += 1;

            let new_depth = depth - PLY + self.extension(pos, mv, undo.piece_from);
            let score = if legal == 1 {
                -self.search(pos, -beta, -alpha, new_depth, ply + 1)
            } else {
                let probe = -self.search(pos, -alpha - 1, -alpha, new_depth, ply + 1);
                if probe > alpha && probe < beta {
                    -self.search(pos, -beta, -alpha, new_depth, ply + 1)
                } else {
                    probe
                }
            };
            pos.undo_move(undo);

            if score > best {
                best = score;
                best_move = Some(mv);
                if score > alpha {
                    alpha = score;
                    if alpha >= beta {
                        self.stats.inc_cutoff();
                        break;
                    }
                }
            }
        }
        self.path.pop();

        if legal == 0 {
            return if in_check { -(MATE - ply as i32) } else { 0 };
        }

        let node_type = if best <= orig_alpha {
            NodeType::UpperBound
        } else if best >= beta {
            NodeType::LowerBound
        } else {
            NodeType::Exact
        };
        self.tt
            .store(hash, score_to_tt(best, ply), depth, node_type, best_move);

        if let Some(m) = best_move {
            if best > orig_alpha && !m.is_tactical() {
                self.history.update(m, depth / PLY);
            }
        }
        if ply == 0 {
            self.root_best = best_move;
        }
        best
    }

    /// Depth bonus for the move just made; `pos` is the position after it.
    fn extension(&self, pos: &Position, mv: Move, moved: i8) -> i32 {
        let mut ext = 0;
        if pos.is_check() {
            ext += self.params.check_extension;
        }
        if moved.unsigned_abs() == PieceKind::Pawn as u8 {
            let seventh = match pos.side().opposite() {
                Color::White => 6,
                Color::Black => 1,
            };
            if rank_of(mv.to_sq()) == seventh {
                ext += self.params.pawn_extension;
            }
        }
        // Never let a single move deepen the search
        ext.min(PLY)
    }

    /// Captures and promotions only, on top of a stand-pat lower bound.
    fn quiescence(&mut self, pos: &mut Position, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.stats.inc_node();
        self.stats.inc_qsearch_node();

        if !pos.has_legal_move() {
            return if pos.is_check() { -(MATE - ply as i32) } else { 0 };
        }

        let stand_pat = evaluate(pos);
        if stand_pat >= beta || ply >= MAX_PLY {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut tactical: Vec<(i32, Move)> = Vec::new();
        pos.enumerate_moves(|m| {
            if m.is_tactical() {
                tactical.push((material_delta(pos, m), m));
            }
            false
        });
        tactical.sort_by(|a, b| b.0.cmp(&a.0));

        let mut best = stand_pat;
        for (_, mv) in tactical {
            let undo = pos.do_move(mv);
            if !pos.is_legal() {
                pos.undo_move(undo);
                continue;
            }
            let score = -self.quiescence(pos, -beta, -alpha, ply + 1);
            pos.undo_move(undo);

            if score > best {
                best = score;
                if score > alpha {
                    alpha = score;
                    if alpha >= beta {
                        self.stats.inc_cutoff();
                        break;
                    }
                }
            }
        }
        best
    }

    fn move_order_score(&self, pos: &Position, m: Move, tt_move: Option<Move>) -> i64 {
        if tt_move == Some(m) {
            ORDER_TT_MOVE
        } else if m.is_tactical() {
            ORDER_TACTICAL + material_delta(pos, m) as i64
        } else {
            self.history.score(m) as i64
        }
    }

    /// Pseudo-legal moves, best first. The sort is stable so ties keep
    /// generation order and the search stays deterministic.
    fn order_moves(&self, pos: &Position, tt_move: Option<Move>) -> Vec<Move> {
        let mut scored: Vec<(i64, Move)> = pos
            .pseudo_legal_moves()
            .into_iter()
            .map(|m| (self.move_order_score(pos, m, tt_move), m))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, m)| m).collect()
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new(SearchParams::default())
    }
}
