//! History heuristic: per (from, to) counters for quiet moves that raised alpha

use crate::board::Move;
use crate::utils::to_index64;

// Stays below the capture ordering band
const HISTORY_MAX: u32 = 1 << 16;

pub struct HistoryTable {
    table: Vec<u32>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: vec![0; 64 * 64],
        }
    }

    #[inline]
    fn index(mv: Move) -> usize {
        to_index64(mv.from_sq()) * 64 + to_index64(mv.to_sq())
    }

    pub fn score(&self, mv: Move) -> u32 {
        self.table[Self::index(mv)]
    }

    /// Bump by depth*depth, the usual weighting.
    pub fn update(&mut self, mv: Move, depth_plies: i32) {
        let d = depth_plies.max(1) as u32;
        let slot = &mut self.table[Self::index(mv)];
        *slot = (*slot + d * d).min(HISTORY_MAX);
    }

    /// Halve every counter so older searches weigh less.
    pub fn age(&mut self) {
        self.table.iter_mut().for_each(|v| *v >>= 1);
    }

    pub fn clear(&mut self) {
        self.table.iter_mut().for_each(|v| *v = 0);
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
