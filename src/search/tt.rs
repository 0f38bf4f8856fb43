//! Direct-mapped transposition table with generation aging

use super::search::MATE_THRESHOLD;
use crate::board::Move;

/// Node type for transposition table entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Exact = 0,
    LowerBound = 1,
    UpperBound = 2,
}

/// Single TT entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub best_move: Option<Move>,
    pub depth: i32,
    pub score: i32,
    pub node_type: NodeType,
    pub generation: u8,
}

impl TTEntry {
    /// Score that ends the search at `ply` with window (alpha, beta), if the
    /// bound allows it.
    pub fn cutoff(&self, ply: usize, alpha: i32, beta: i32) -> Option<i32> {
        let score = score_from_tt(self.score, ply);
        let cuts = match self.node_type {
            NodeType::Exact => true,
            NodeType::LowerBound => score >= beta,
            NodeType::UpperBound => score <= alpha,
        };
        cuts.then_some(score)
    }
}

/// Mate scores are stored relative to the node, not the root.
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    mask: u64,
    generation: u8,
}

impl TranspositionTable {
    /// Create a table with `2^bits` slots.
    pub fn new(bits: u32) -> Self {
        let size = 1usize << bits.min(30);
        Self {
            entries: vec![None; size],
            mask: (size - 1) as u64,
            generation: 0,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key & self.mask) as usize
    }

    /// Returns the slot only on a full key match; an index collision is a miss.
    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        self.entries[self.index(key)].filter(|e| e.key == key)
    }

    /// Store unless the slot holds a deeper entry from the current search.
    pub fn store(
        &mut self,
        key: u64,
        score: i32,
        depth: i32,
        node_type: NodeType,
        best_move: Option<Move>,
    ) {
        let index = self.index(key);
        let generation = self.generation;
        let replace = match &self.entries[index] {
            None => true,
            Some(existing) => depth >= existing.depth || existing.generation != generation,
        };
        if replace {
            self.entries[index] = Some(TTEntry {
                key,
                best_move,
                depth,
                score,
                node_type,
                generation,
            });
        }
    }

    /// Increment search generation (call at start of each new root search)
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u8 {
        self.generation
    }

    pub fn fill_percentage(&self) -> f64 {
        let filled = self.entries.iter().filter(|e| e.is_some()).count();
        (filled as f64 / self.entries.len() as f64) * 100.0
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
        self.generation = 0;
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(16)
    }
}
