//! Search statistics and per-iteration reports
//!
//! Tracks nodes searched, cutoffs and hash table hits, and collects one
//! `DepthReport` per completed iteration into the final `SearchOutcome`.

use crate::board::Move;
use std::fmt;
use std::time::{Duration, Instant};

/// Search statistics
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Total nodes searched, quiescence included
    pub nodes: u64,

    /// Quiescence nodes searched
    pub qsearch_nodes: u64,

    /// Transposition table probes that matched
    pub tt_hits: u64,

    /// Transposition table cutoffs taken
    pub tt_cutoffs: u64,

    /// Beta cutoffs
    pub cutoffs: u64,

    /// Aspiration re-searches
    pub researches: u64,

    /// Search start time
    pub start_time: Option<Instant>,

    /// Time spent searching
    pub search_time: Duration,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_timing(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn update_timing(&mut self) {
        if let Some(start) = self.start_time {
            self.search_time = start.elapsed();
        }
    }

    pub fn nps(&self) -> u64 {
        let ms = self.search_time.as_millis() as u64;
        if ms > 0 {
            self.nodes * 1000 / ms
        } else {
            0
        }
    }

    pub fn inc_node(&mut self) {
        self.nodes += 1;
    }

    pub fn inc_qsearch_node(&mut self) {
        self.qsearch_nodes += 1;
    }

    pub fn inc_tt_hit(&mut self) {
        self.tt_hits += 1;
    }

    pub fn inc_tt_cutoff(&mut self) {
        self.tt_cutoffs += 1;
    }

    pub fn inc_cutoff(&mut self) {
        self.cutoffs += 1;
    }

    pub fn inc_research(&mut self) {
        self.researches += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes {} (qsearch {}) tt hits {} tt cutoffs {} cutoffs {} re-searches {} time {} ms nps {}",
            self.nodes,
            self.qsearch_nodes,
            self.tt_hits,
            self.tt_cutoffs,
            self.cutoffs,
            self.researches,
            self.search_time.as_millis(),
            self.nps()
        )
    }
}

/// Result of one completed iterative-deepening iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthReport {
    pub depth: u8,
    pub best_move: Option<Move>,
    pub score: i32,
    pub nodes: u64,
}

impl fmt::Display for DepthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mv = self
            .best_move
            .map(|m| m.notation())
            .unwrap_or_else(|| "(none)".to_string());
        write!(
            f,
            "depth {:>2}  score {:>6}  nodes {:>10}  best {}",
            self.depth, self.score, self.nodes, mv
        )
    }
}

/// What a root search hands back to its caller.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// None only when the side to move has no legal move
    pub best_move: Option<Move>,
    pub score: i32,
    pub nodes: u64,
    pub depths: Vec<DepthReport>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn completed_depth(&self) -> u8 {
        self.depths.last().map_or(0, |r| r.depth)
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.depths {
            writeln!(f, "{}", report)?;
        }
        writeln!(f, "{}", self.stats)
    }
}
