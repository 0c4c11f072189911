//! Demo problems and the strategy pools that race on them.
//!
//! Each demo mirrors one of the classic speculative-execution exercises:
//! several algorithms attack the identical input and the first finisher
//! wins. The algorithm bodies differ per demo; the checkpoint contract with
//! the race runtime is the same everywhere.

pub mod matmul;
pub mod puzzle;
pub mod sim;
pub mod sort;
