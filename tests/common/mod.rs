//! Strategies shared by the protocol-level integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use specrace::race::{CancellationToken, Strategy, StrategyOutcome};

/// Solves instantly with a fixed value.
pub struct Immediate {
    pub value: u64,
}

impl Strategy<u64, u64> for Immediate {
    fn name(&self) -> &str {
        "immediate"
    }

    fn solve(&self, _problem: &u64, _cancel: &CancellationToken) -> StrategyOutcome<u64> {
        StrategyOutcome::Solved(self.value)
    }
}

/// Never finishes; sleeps between checkpoints until cancelled, counting the
/// batches it worked through.
#[derive(Default)]
pub struct Stubborn {
    pub batches: Arc<AtomicU64>,
}

impl Strategy<u64, u64> for Stubborn {
    fn name(&self) -> &str {
        "stubborn"
    }

    fn solve(&self, _problem: &u64, cancel: &CancellationToken) -> StrategyOutcome<u64> {
        loop {
            if cancel.should_cancel() {
                return StrategyOutcome::Cancelled;
            }
            self.batches.fetch_add(1, Ordering::Relaxed);
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Wraps a strategy with a checkpointed startup delay, so races between
/// otherwise-comparable strategies finish in a deterministic order.
pub struct Delayed<S> {
    pub delay: Duration,
    pub inner: S,
}

impl<P, R, S: Strategy<P, R>> Strategy<P, R> for Delayed<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn solve(&self, problem: &P, cancel: &CancellationToken) -> StrategyOutcome<R> {
        let slice = Duration::from_millis(1);
        let mut remaining = self.delay;
        while remaining > Duration::ZERO {
            if cancel.should_cancel() {
                return StrategyOutcome::Cancelled;
            }
            thread::sleep(slice.min(remaining));
            remaining = remaining.saturating_sub(slice);
        }
        self.inner.solve(problem, cancel)
    }
}
