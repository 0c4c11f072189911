//! Race coordinator: dispatches the problem, picks the winner, cancels the
//! rest, collects exactly one result.

use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::race::channel::{
    create_channels, CoordinatorChannels, CoordinatorMessage, WorkerMessage,
};
use crate::race::config::RaceConfig;
use crate::race::error::{RaceError, Result};
use crate::race::harness::run_worker;
use crate::race::result::{RaceOutcome, RaceReport, WorkerReport};
use crate::race::Strategy;

/// Race `strategies` against each other on `problem`.
///
/// The problem is encoded once and dispatched to one worker per strategy
/// before any worker starts. The first DONE to arrive is authoritative,
/// regardless of wall-clock finish time at the sender; every other worker is
/// sent CANCEL exactly once, and the result is accepted from the winner
/// only. With a configured timeout and no finisher, the outcome is
/// [`RaceOutcome::NoWinner`] and every worker is cancelled.
pub fn run_race<P, R>(
    problem: &P,
    strategies: Vec<Box<dyn Strategy<P, R>>>,
    config: &RaceConfig,
) -> Result<RaceReport<R>>
where
    P: Serialize + DeserializeOwned + 'static,
    R: Serialize + DeserializeOwned + 'static,
{
    let num_workers = strategies.len();
    if num_workers < 2 {
        return Err(RaceError::TooFewStrategies(num_workers));
    }

    let start = Instant::now();
    let names: Vec<String> = strategies.iter().map(|s| s.name().to_string()).collect();
    let payload = bincode::serialize(problem).map_err(RaceError::Encode)?;

    let (coordinator, worker_channels) = create_channels(num_workers);

    // Dispatch before spawning: every worker finds its problem already
    // waiting, and none can start computing ahead of the others.
    for tx in &coordinator.to_workers {
        let _ = tx.send(CoordinatorMessage::Data(payload.clone()));
    }

    let handles: Vec<_> = strategies
        .into_iter()
        .zip(worker_channels)
        .enumerate()
        .map(|(worker_id, (strategy, channels))| {
            std::thread::spawn(move || run_worker(worker_id, strategy.as_ref(), channels))
        })
        .collect();

    let deadline = config.timeout.map(|t| start + t);
    let decided =
        match await_first_completion(&coordinator, num_workers, deadline, config.poll_interval) {
            Some(winner_id) => {
                info!("accepted DONE from worker {winner_id}");
                cancel_losers(&coordinator, winner_id);
                Some((winner_id, collect_result::<R>(&coordinator, winner_id)))
            }
            None => {
                info!("no DONE before the deadline, cancelling every worker");
                cancel_all(&coordinator);
                None
            }
        };

    let mut workers: Vec<WorkerReport> = Vec::with_capacity(num_workers);
    for handle in handles {
        match handle.join() {
            Ok(report) => workers.push(report),
            Err(_) => warn!("a worker thread panicked"),
        }
    }

    let outcome = match decided {
        Some((winner_id, Ok(result))) => RaceOutcome::Winner {
            worker_id: winner_id,
            strategy: names[winner_id].clone(),
            result,
        },
        Some((_, Err(err))) => return Err(err),
        None => RaceOutcome::NoWinner,
    };

    Ok(RaceReport {
        outcome,
        elapsed: start.elapsed(),
        workers,
    })
}

/// Wait for the first DONE from any worker.
///
/// This is the race's sole synchronization point: whichever DONE arrives
/// first on the channel decides the winner. Returns `None` if the deadline
/// passes, or if every worker hung up, before any DONE.
fn await_first_completion(
    channels: &CoordinatorChannels,
    num_workers: usize,
    deadline: Option<Instant>,
    poll_interval: Duration,
) -> Option<usize> {
    loop {
        let wait = match deadline {
            Some(d) => {
                let remaining = d.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return None;
                }
                remaining.min(poll_interval)
            }
            None => poll_interval,
        };

        match channels.from_workers.recv_timeout(wait) {
            Ok(WorkerMessage::Done { worker_id }) if worker_id < num_workers => {
                return Some(worker_id)
            }
            Ok(WorkerMessage::Done { worker_id }) => {
                warn!("discarding DONE naming unknown worker {worker_id}");
            }
            Ok(WorkerMessage::Result { worker_id, .. }) => {
                // RESULT before any accepted DONE breaks the protocol.
                warn!("discarding RESULT from worker {worker_id} before any DONE");
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}

/// Send CANCEL to every worker except the accepted winner, exactly once
/// each. Fire-and-forget: no acknowledgment is needed for correctness.
fn cancel_losers(channels: &CoordinatorChannels, winner_id: usize) {
    for (worker_id, tx) in channels.to_workers.iter().enumerate() {
        if worker_id != winner_id {
            let _ = tx.send(CoordinatorMessage::Cancel);
        }
    }
}

/// Send CANCEL to every worker; used when the deadline passes with no
/// winner.
fn cancel_all(channels: &CoordinatorChannels) {
    for tx in &channels.to_workers {
        let _ = tx.send(CoordinatorMessage::Cancel);
    }
}

/// Block until the winner's RESULT arrives.
///
/// Anything else on the channel (a late DONE from a loser that finished
/// before its CANCEL landed, a RESULT from a non-winner) is logged and
/// dropped, never accepted.
fn collect_result<R>(channels: &CoordinatorChannels, winner_id: usize) -> Result<R>
where
    R: DeserializeOwned,
{
    loop {
        match channels.from_workers.recv() {
            Ok(WorkerMessage::Result { worker_id, payload }) if worker_id == winner_id => {
                return bincode::deserialize(&payload).map_err(|source| {
                    warn!("malformed RESULT from winner {worker_id}");
                    RaceError::MalformedResult { worker_id, source }
                });
            }
            Ok(WorkerMessage::Result { worker_id, .. }) => {
                warn!("discarding RESULT from non-winner {worker_id}");
            }
            Ok(WorkerMessage::Done { worker_id }) => {
                debug!("ignoring late DONE from worker {worker_id}");
            }
            Err(_) => return Err(RaceError::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::result::WorkerState;
    use crate::race::token::CancellationToken;
    use crate::race::StrategyOutcome;
    use std::time::Duration;

    /// Finishes immediately with a fixed value.
    struct Immediate {
        value: u64,
    }

    impl Strategy<u64, u64> for Immediate {
        fn name(&self) -> &str {
            "immediate"
        }

        fn solve(&self, _problem: &u64, _cancel: &CancellationToken) -> StrategyOutcome<u64> {
            StrategyOutcome::Solved(self.value)
        }
    }

    /// Never finishes; sleeps between checkpoints until cancelled.
    struct Stubborn;

    impl Strategy<u64, u64> for Stubborn {
        fn name(&self) -> &str {
            "stubborn"
        }

        fn solve(&self, _problem: &u64, cancel: &CancellationToken) -> StrategyOutcome<u64> {
            loop {
                if cancel.should_cancel() {
                    return StrategyOutcome::Cancelled;
                }
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }

    #[test]
    fn test_first_finisher_wins() {
        let strategies: Vec<Box<dyn Strategy<u64, u64>>> = vec![
            Box::new(Immediate { value: 42 }),
            Box::new(Stubborn),
            Box::new(Stubborn),
        ];

        let report = run_race(&0u64, strategies, &RaceConfig::default()).unwrap();

        assert_eq!(report.outcome.winner_id(), Some(0));
        assert_eq!(report.outcome.result(), Some(&42));
        for w in &report.workers {
            if w.worker_id == 0 {
                assert_eq!(w.state, WorkerState::Completed);
            } else {
                assert_eq!(w.state, WorkerState::Cancelled);
            }
        }
    }

    #[test]
    fn test_deadline_yields_no_winner_and_cancels_everyone() {
        let strategies: Vec<Box<dyn Strategy<u64, u64>>> =
            vec![Box::new(Stubborn), Box::new(Stubborn)];

        let config = RaceConfig::default()
            .with_timeout(Duration::from_millis(100))
            .with_poll_interval(Duration::from_millis(10));
        let start = Instant::now();
        let report = run_race(&0u64, strategies, &config).unwrap();

        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(report.outcome, RaceOutcome::NoWinner);
        assert_eq!(report.workers.len(), 2);
        for w in &report.workers {
            assert_eq!(w.state, WorkerState::Cancelled);
        }
    }

    #[test]
    fn test_too_few_strategies() {
        let strategies: Vec<Box<dyn Strategy<u64, u64>>> =
            vec![Box::new(Immediate { value: 1 })];

        match run_race(&0u64, strategies, &RaceConfig::default()) {
            Err(RaceError::TooFewStrategies(1)) => {}
            other => panic!("expected TooFewStrategies, got {:?}", other.map(|r| r.outcome)),
        }
    }

    #[test]
    fn test_every_worker_reports() {
        let strategies: Vec<Box<dyn Strategy<u64, u64>>> = vec![
            Box::new(Immediate { value: 1 }),
            Box::new(Stubborn),
            Box::new(Stubborn),
            Box::new(Stubborn),
        ];

        let report = run_race(&0u64, strategies, &RaceConfig::default()).unwrap();
        assert_eq!(report.workers.len(), 4);
        let completed = report
            .workers
            .iter()
            .filter(|w| w.state == WorkerState::Completed)
            .count();
        assert_eq!(completed, 1);
    }
}
