//! Run bookkeeping: statistics counters and the end-of-run sample dump.
//!
//! Nothing here feeds back into detection; it exists so a run can be
//! inspected afterwards.

pub mod run;
pub mod stats;

// Re-export commonly used types
pub use run::RunRecord;
pub use stats::{create_shared_stats, RunStats, RunStatsSnapshot, SharedRunStats};
