//! The race protocol: dispatch one problem to competing strategies, accept
//! the first finisher, cancel the rest.
//!
//! # Architecture
//!
//! The runtime consists of:
//! - A **coordinator** that encodes and dispatches the problem, accepts the
//!   first DONE, cancels all losers and collects exactly one result
//! - One **worker harness** per strategy, driving it through its checkpoints
//!   and speaking the protocol on its behalf
//! - A **channel system** carrying DATA/DONE/CANCEL/RESULT between them
//! - A per-worker **cancellation token**, the non-blocking probe strategies
//!   query at their checkpoints
//!
//! Cancellation is cooperative: a strategy that never probes its token
//! cannot be stopped. The probe interval bounds how much work a loser wastes
//! after the race has been decided.
//!
//! # Example
//!
//! ```ignore
//! let config = RaceConfig::default().with_timeout(Duration::from_secs(30));
//! let report = run_race(&problem, strategies, &config)?;
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod harness;
pub mod result;
pub mod token;

pub use config::RaceConfig;
pub use coordinator::run_race;
pub use error::{RaceError, Result};
pub use result::{RaceOutcome, RaceReport, WorkerReport, WorkerState};
pub use token::CancellationToken;

/// Outcome of a single strategy run.
#[derive(Debug)]
pub enum StrategyOutcome<R> {
    /// The strategy solved the problem.
    Solved(R),
    /// The strategy observed a cancellation at a checkpoint and aborted,
    /// discarding any partial result.
    Cancelled,
    /// The strategy ran out of work without finding a solution.
    Exhausted,
}

/// A competing algorithm.
///
/// Implementations must call `cancel.should_cancel()` at bounded intervals
/// (every recursion entry, every batch of loop iterations) and return
/// [`StrategyOutcome::Cancelled`] as soon as the probe is positive. The
/// checkpoint interval is a correctness/performance trade-off: it bounds the
/// work wasted between the coordinator's decision and the strategy noticing
/// it.
pub trait Strategy<P, R>: Send {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Solve `problem`, probing `cancel` at checkpoints.
    fn solve(&self, problem: &P, cancel: &CancellationToken) -> StrategyOutcome<R>;
}
