//! Synthetic simulation race: two numerically distinct models integrate the
//! same number of steps; the faster model's value wins.

use serde::{Deserialize, Serialize};

use crate::race::{CancellationToken, Strategy, StrategyOutcome};

/// Step count for one simulation run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimInput {
    pub steps: u64,
}

/// Probe once every 65 536 steps.
const PROBE_MASK: u64 = 0xFFFF;

/// Per-step update of the conservative model.
pub fn conservative_step(i: u64) -> i64 {
    (i % 7) as i64 - (i % 3) as i64
}

/// Per-step update of the optimistic model.
pub fn optimistic_step(i: u64) -> i64 {
    ((i.wrapping_mul(127) ^ i.wrapping_shl(3)) % 19) as i64
}

/// Reference accumulation of the conservative model.
pub fn conservative_reference(steps: u64) -> i64 {
    (0..steps).map(conservative_step).sum()
}

/// Reference accumulation of the optimistic model.
pub fn optimistic_reference(steps: u64) -> i64 {
    (0..steps).map(optimistic_step).sum()
}

/// Both models, conservative first.
pub fn strategies() -> Vec<Box<dyn Strategy<SimInput, i64>>> {
    vec![Box::new(Conservative), Box::new(Optimistic)]
}

/// Deterministic accumulator, the cautious model.
pub struct Conservative;

impl Strategy<SimInput, i64> for Conservative {
    fn name(&self) -> &str {
        "conservative"
    }

    fn solve(&self, input: &SimInput, cancel: &CancellationToken) -> StrategyOutcome<i64> {
        let mut acc: i64 = 0;
        for i in 0..input.steps {
            acc += conservative_step(i);
            if i & PROBE_MASK == 0 && cancel.should_cancel() {
                return StrategyOutcome::Cancelled;
            }
        }
        StrategyOutcome::Solved(acc)
    }
}

/// Mixing accumulator, the optimistic model.
pub struct Optimistic;

impl Strategy<SimInput, i64> for Optimistic {
    fn name(&self) -> &str {
        "optimistic"
    }

    fn solve(&self, input: &SimInput, cancel: &CancellationToken) -> StrategyOutcome<i64> {
        let mut acc: i64 = 0;
        for i in 0..input.steps {
            acc += optimistic_step(i);
            if i & PROBE_MASK == 0 && cancel.should_cancel() {
                return StrategyOutcome::Cancelled;
            }
        }
        StrategyOutcome::Solved(acc)
    }
}
