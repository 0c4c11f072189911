//! Race outcomes and per-worker reporting.

use std::fmt;
use std::time::Duration;

/// Terminal (or in-flight) state of a worker in the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Still computing; no terminal event observed yet.
    Running,
    /// Finished, passed the final cancellation probe and announced a result.
    Completed,
    /// Observed CANCEL and stood down without announcing anything.
    Cancelled,
    /// Ran out of work without finding a solution; stood down silently.
    Exhausted,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Running => "running",
            WorkerState::Completed => "completed",
            WorkerState::Cancelled => "cancelled",
            WorkerState::Exhausted => "exhausted",
        };
        f.write_str(s)
    }
}

/// How a race ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RaceOutcome<R> {
    /// Exactly one worker's DONE was accepted; its result is authoritative.
    Winner {
        worker_id: usize,
        strategy: String,
        result: R,
    },
    /// No DONE arrived before the deadline.
    NoWinner,
}

impl<R> RaceOutcome<R> {
    /// The winning worker id, if the race had a winner.
    pub fn winner_id(&self) -> Option<usize> {
        match self {
            RaceOutcome::Winner { worker_id, .. } => Some(*worker_id),
            RaceOutcome::NoWinner => None,
        }
    }

    /// The accepted result, if the race had a winner.
    pub fn result(&self) -> Option<&R> {
        match self {
            RaceOutcome::Winner { result, .. } => Some(result),
            RaceOutcome::NoWinner => None,
        }
    }
}

/// Per-worker account of what happened during the race.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// Name of the strategy this worker ran.
    pub strategy: String,
    pub state: WorkerState,
    /// Wall-clock time from problem receipt to stand-down.
    pub elapsed: Duration,
    /// Cancellation probes performed, counting the final pre-announce check.
    pub checkpoints: u64,
}

/// Full report for one race: the outcome plus per-worker accounts.
#[derive(Debug)]
pub struct RaceReport<R> {
    pub outcome: RaceOutcome<R>,
    /// Wall-clock time from dispatch to the last worker joining.
    pub elapsed: Duration,
    pub workers: Vec<WorkerReport>,
}

impl<R> RaceReport<R> {
    /// Format the per-worker accounts as a human-readable block.
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Race finished in {:.2?}\n", self.elapsed));
        match &self.outcome {
            RaceOutcome::Winner {
                worker_id,
                strategy,
                ..
            } => {
                s.push_str(&format!("Winner: worker {} ({})\n", worker_id, strategy));
            }
            RaceOutcome::NoWinner => {
                s.push_str("Winner: none (deadline passed)\n");
            }
        }
        for w in &self.workers {
            s.push_str(&format!(
                "  worker {} ({}): {}, {} checkpoints, {:.2?}\n",
                w.worker_id, w.strategy, w.state, w.checkpoints, w.elapsed
            ));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> RaceReport<u32> {
        RaceReport {
            outcome: RaceOutcome::Winner {
                worker_id: 1,
                strategy: "fast".to_string(),
                result: 42,
            },
            elapsed: Duration::from_millis(12),
            workers: vec![
                WorkerReport {
                    worker_id: 0,
                    strategy: "slow".to_string(),
                    state: WorkerState::Cancelled,
                    elapsed: Duration::from_millis(11),
                    checkpoints: 3,
                },
                WorkerReport {
                    worker_id: 1,
                    strategy: "fast".to_string(),
                    state: WorkerState::Completed,
                    elapsed: Duration::from_millis(9),
                    checkpoints: 1,
                },
            ],
        }
    }

    #[test]
    fn test_outcome_accessors() {
        let report = sample_report();
        assert_eq!(report.outcome.winner_id(), Some(1));
        assert_eq!(report.outcome.result(), Some(&42));

        let none: RaceOutcome<u32> = RaceOutcome::NoWinner;
        assert_eq!(none.winner_id(), None);
        assert_eq!(none.result(), None);
    }

    #[test]
    fn test_format_summary() {
        let report = sample_report();
        let summary = report.format_summary();
        assert!(summary.contains("Winner: worker 1 (fast)"));
        assert!(summary.contains("worker 0 (slow): cancelled"));
    }

    #[test]
    fn test_no_winner_summary() {
        let report: RaceReport<u32> = RaceReport {
            outcome: RaceOutcome::NoWinner,
            elapsed: Duration::from_secs(1),
            workers: Vec::new(),
        };
        assert!(report.format_summary().contains("none"));
    }
}
