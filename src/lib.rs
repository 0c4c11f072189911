//! Speculative multi-strategy racing with cooperative cancellation.
//!
//! A coordinator hands the same problem to several workers, each running a
//! different algorithm. The first worker whose DONE signal arrives wins the
//! race; every other worker is sent CANCEL and stands down at its next
//! checkpoint. Exactly one result is ever accepted per race.
//!
//! The [`race`] module is the protocol runtime: channels, the cancellation
//! token, the worker harness and the coordinator. The [`demos`] module holds
//! the classic demo problems (matrix multiplication, sorting, the 8-puzzle,
//! a synthetic simulation) together with the strategy pools that race on
//! them.
//!
//! # Quick start
//!
//! ```no_run
//! use specrace::demos::sort;
//! use specrace::race::{run_race, RaceConfig, RaceOutcome};
//!
//! let keys = sort::random_keys(100_000, 12345).unwrap();
//! let report = run_race(&keys, sort::strategies(), &RaceConfig::default()).unwrap();
//! if let RaceOutcome::Winner { strategy, .. } = &report.outcome {
//!     println!("{strategy} finished first");
//! }
//! ```

pub mod demos;
pub mod race;
