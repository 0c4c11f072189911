//! Protocol-level races with synthetic strategies: winner uniqueness, loser
//! cancellation, deadlines.

mod common;

use std::time::{Duration, Instant};

use common::{Delayed, Immediate, Stubborn};
use specrace::demos::matmul;
use specrace::race::{run_race, RaceConfig, RaceError, RaceOutcome, Strategy, WorkerState};

#[test]
fn exactly_one_winner_among_many() {
    // The classic two-worker race generalized: one finisher, three losers.
    let strategies: Vec<Box<dyn Strategy<u64, u64>>> = vec![
        Box::new(Immediate { value: 9 }),
        Box::new(Stubborn::default()),
        Box::new(Stubborn::default()),
        Box::new(Stubborn::default()),
    ];

    let report = run_race(&1u64, strategies, &RaceConfig::default()).unwrap();

    assert_eq!(report.outcome.winner_id(), Some(0));
    assert_eq!(report.outcome.result(), Some(&9));

    let completed = report
        .workers
        .iter()
        .filter(|w| w.state == WorkerState::Completed)
        .count();
    assert_eq!(completed, 1);

    // Cancel recipients are exactly the non-winners.
    for w in &report.workers {
        if w.worker_id != 0 {
            assert_eq!(w.state, WorkerState::Cancelled, "worker {}", w.worker_id);
        }
    }
}

#[test]
fn deadline_declares_no_winner_and_cancels_all() {
    let strategies: Vec<Box<dyn Strategy<u64, u64>>> = vec![
        Box::new(Stubborn::default()),
        Box::new(Stubborn::default()),
        Box::new(Stubborn::default()),
    ];

    let config = RaceConfig::default()
        .with_timeout(Duration::from_millis(150))
        .with_poll_interval(Duration::from_millis(10));
    let start = Instant::now();
    let report = run_race(&1u64, strategies, &config).unwrap();

    assert!(start.elapsed() >= Duration::from_millis(150));
    assert!(matches!(report.outcome, RaceOutcome::NoWinner));
    assert_eq!(report.workers.len(), 3);
    for w in &report.workers {
        assert_eq!(w.state, WorkerState::Cancelled, "worker {}", w.worker_id);
    }
}

#[test]
fn delayed_matmul_race_returns_the_exact_reference_product() {
    let pair = matmul::MatrixPair::random(4, 99).unwrap();
    let expected = matmul::reference_product(&pair);

    // The short handicap wins: the race is decided by arrival order, not by
    // which algorithm is nominally faster.
    let strategies: Vec<Box<dyn Strategy<matmul::MatrixPair, matmul::Product>>> = vec![
        Box::new(Delayed {
            delay: Duration::from_millis(20),
            inner: matmul::BlockRecursive::default(),
        }),
        Box::new(Delayed {
            delay: Duration::from_millis(500),
            inner: matmul::Classical,
        }),
    ];

    let report = run_race(&pair, strategies, &RaceConfig::default()).unwrap();

    assert_eq!(report.outcome.winner_id(), Some(0));
    let product = report.outcome.result().unwrap();
    assert_eq!(product.n, expected.n);
    for (got, want) in product.c.iter().zip(&expected.c) {
        assert!((got - want).abs() <= 1e-9, "got {got}, want {want}");
    }

    // The slower strategy never got to announce anything.
    assert_eq!(report.workers[1].state, WorkerState::Cancelled);
}

#[test]
fn losers_waste_a_bounded_number_of_batches() {
    let counter = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
    let strategies: Vec<Box<dyn Strategy<u64, u64>>> = vec![
        Box::new(Immediate { value: 1 }),
        Box::new(Stubborn {
            batches: counter.clone(),
        }),
    ];

    let report = run_race(&1u64, strategies, &RaceConfig::default()).unwrap();
    assert_eq!(report.outcome.winner_id(), Some(0));

    // The loser probes after every batch, so it can overrun the cancel by at
    // most one batch beyond what it had started when CANCEL landed. A
    // generous ceiling catches runaway loops without being flaky.
    let wasted = counter.load(std::sync::atomic::Ordering::Relaxed);
    assert!(wasted < 1_000, "loser kept running: {wasted} batches");
}

#[test]
fn single_strategy_is_rejected() {
    let strategies: Vec<Box<dyn Strategy<u64, u64>>> = vec![Box::new(Immediate { value: 1 })];

    assert!(matches!(
        run_race(&0u64, strategies, &RaceConfig::default()),
        Err(RaceError::TooFewStrategies(1))
    ));
}
