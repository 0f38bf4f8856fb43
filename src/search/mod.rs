//! Search engine: iterative deepening, transposition table, history ordering

pub mod history;
pub mod params;
pub mod search;
pub mod stats;
pub mod tt;

pub use self::history::HistoryTable;
pub use self::params::{SearchParams, PLY};
pub use self::search::{Search, INFINITE, MATE, MATE_THRESHOLD};
pub use self::stats::{DepthReport, SearchOutcome, SearchStats};
pub use self::tt::{NodeType, TranspositionTable};
