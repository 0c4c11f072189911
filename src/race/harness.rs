//! Worker harness: drives one strategy and speaks the race protocol.

use std::time::Instant;

use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::race::channel::{CoordinatorMessage, WorkerChannels, WorkerMessage};
use crate::race::result::{WorkerReport, WorkerState};
use crate::race::token::CancellationToken;
use crate::race::{Strategy, StrategyOutcome};

/// Receive the problem, run the strategy to completion or cancellation, and
/// announce the result only if the final probe is clear.
///
/// The worker blocks exactly once, waiting for DATA at startup. From then on
/// it never blocks: cancellation checks are non-blocking probes through the
/// [`CancellationToken`]. A worker that observes CANCEL, at a checkpoint or
/// at the final probe, stays silent for the rest of the race.
pub fn run_worker<P, R, S>(worker_id: usize, strategy: &S, channels: WorkerChannels) -> WorkerReport
where
    P: DeserializeOwned,
    R: Serialize,
    S: Strategy<P, R> + ?Sized,
{
    let start = Instant::now();
    let WorkerChannels {
        to_coordinator,
        from_coordinator,
    } = channels;

    let mut report = WorkerReport {
        worker_id,
        strategy: strategy.name().to_string(),
        state: WorkerState::Running,
        elapsed: start.elapsed(),
        checkpoints: 0,
    };

    let problem: P = match from_coordinator.recv() {
        Ok(CoordinatorMessage::Data(payload)) => match bincode::deserialize(&payload) {
            Ok(problem) => problem,
            Err(err) => {
                error!("worker {worker_id}: malformed problem payload: {err}");
                report.state = WorkerState::Cancelled;
                report.elapsed = start.elapsed();
                return report;
            }
        },
        Ok(CoordinatorMessage::Cancel) => {
            debug!("worker {worker_id}: cancelled before receiving the problem");
            report.state = WorkerState::Cancelled;
            report.elapsed = start.elapsed();
            return report;
        }
        Err(_) => {
            // Coordinator hung up before dispatch.
            report.state = WorkerState::Cancelled;
            report.elapsed = start.elapsed();
            return report;
        }
    };

    let token = CancellationToken::new(from_coordinator);

    report.state = match strategy.solve(&problem, &token) {
        StrategyOutcome::Cancelled => {
            debug!("worker {worker_id} ({}): cancelled mid-run", report.strategy);
            WorkerState::Cancelled
        }
        StrategyOutcome::Exhausted => {
            debug!(
                "worker {worker_id} ({}): exhausted without a solution",
                report.strategy
            );
            WorkerState::Exhausted
        }
        StrategyOutcome::Solved(result) => {
            match bincode::serialize(&result) {
                Err(err) => {
                    error!(
                        "worker {worker_id} ({}): result payload encoding failed: {err}",
                        report.strategy
                    );
                    WorkerState::Exhausted
                }
                // Encoding happens before the final probe so that nothing
                // sits between the probe and the DONE send.
                Ok(payload) => {
                    // The final probe closes the race between this worker's
                    // completion and a concurrent CANCEL: if the coordinator
                    // already picked another winner, stay silent.
                    if token.should_cancel() {
                        debug!(
                            "worker {worker_id} ({}): cancelled at the finish line",
                            report.strategy
                        );
                        WorkerState::Cancelled
                    } else {
                        let _ = to_coordinator.send(WorkerMessage::Done { worker_id });
                        let _ = to_coordinator.send(WorkerMessage::Result { worker_id, payload });
                        WorkerState::Completed
                    }
                }
            }
        }
    };

    report.checkpoints = token.probe_count();
    report.elapsed = start.elapsed();
    report
}
