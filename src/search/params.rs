//! Search parameters and configuration
//!
//! Controls depth and node limits, the aspiration window, extension sizes
//! and the transposition table size.

/// Depth unit: one ply is this many fractional steps, so extensions can be
/// smaller than a whole ply.
pub const PLY: i32 = 16;

/// Search parameters for the engine
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Depth in plies for a `go` without `depth`
    pub max_depth: u8,

    /// Node budget for a `go` without `nodes`, checked between iterations
    /// (0 = unlimited)
    pub node_limit: u64,

    /// Aspiration window half-width in centipawns
    pub aspiration_window: i32,

    /// Search captures and promotions at the horizon
    pub enable_quiescence: bool,

    /// Extension when the side to move is in check, in depth units
    pub check_extension: i32,

    /// Extension for a pawn push to the seventh rank, in depth units
    pub pawn_extension: i32,

    /// Transposition table holds 2^tt_bits slots
    pub tt_bits: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            node_limit: 0,
            aspiration_window: 50, // 0.5 pawn
            enable_quiescence: true,
            check_extension: 12,
            pawn_extension: 8,
            tt_bits: 20,
        }
    }
}

impl SearchParams {
    /// Create new search params with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum depth in plies
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set node limit
    pub fn node_limit(mut self, limit: u64) -> Self {
        self.node_limit = limit;
        self
    }

    /// Set aspiration window size in centipawns
    pub fn aspiration_window(mut self, window: i32) -> Self {
        self.aspiration_window = window;
        self
    }

    /// Enable or disable quiescence search
    pub fn enable_quiescence(mut self, enable: bool) -> Self {
        self.enable_quiescence = enable;
        self
    }

    /// Set check extension in depth units
    pub fn check_extension(mut self, units: i32) -> Self {
        self.check_extension = units;
        self
    }

    /// Set seventh-rank pawn push extension in depth units
    pub fn pawn_extension(mut self, units: i32) -> Self {
        self.pawn_extension = units;
        self
    }

    /// Set transposition table size as a power of two
    pub fn tt_bits(mut self, bits: u32) -> Self {
        self.tt_bits = bits;
        self
    }
}
