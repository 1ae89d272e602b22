//! Monthly shift optimizer.
//!
//! Each attempt fills a fresh grid from the person quotas, flattens daily
//! headcounts per team and then globally, and hill-climbs with single-person
//! day swaps. Attempts repeat while the daily spread stays gross, and the
//! best one is committed to the ledger.

mod builder;
mod core;
mod flatten;
mod progress;
pub mod scoring;
mod search;
mod state;

pub use builder::build_initial;
pub use core::{OptimizationOutcome, OptimizerError, ShiftOptimizer};
pub use flatten::flatten;
pub use progress::{CancellationToken, NoProgress, ProgressFn, ProgressSink, ProgressUpdate};
pub use scoring::{score, score_breakdown, ScoreBreakdown};
pub use search::{local_search, SearchStats};
pub use state::{DaySlot, MemberSlot, PairRule, ScheduleContext, ShiftGrid};
