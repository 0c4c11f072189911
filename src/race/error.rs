//! Error taxonomy for the race runtime.

use thiserror::Error;

/// Errors that abort a race.
///
/// Cancellation is deliberately absent: a cancelled worker is a normal
/// terminal state, not a failure. Protocol violations coming from losing
/// workers are logged and discarded by the coordinator; only a violation
/// that leaves the race without a usable result surfaces here.
#[derive(Error, Debug)]
pub enum RaceError {
    /// A race needs at least two competing strategies.
    #[error("race requires at least two strategies, got {0}")]
    TooFewStrategies(usize),

    /// A problem buffer cannot be sized within the configured limits.
    #[error("problem dimension {requested} exceeds the allocatable limit")]
    ProblemTooLarge { requested: usize },

    /// The problem payload could not be encoded for dispatch.
    #[error("payload encoding failed: {0}")]
    Encode(#[source] bincode::Error),

    /// The winner delivered a result payload that does not decode.
    #[error("malformed result payload from winner {worker_id}: {source}")]
    MalformedResult {
        worker_id: usize,
        #[source]
        source: bincode::Error,
    },

    /// Every worker hung up before a result was delivered.
    #[error("all workers disconnected before delivering a result")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, RaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RaceError::TooFewStrategies(1);
        assert!(err.to_string().contains("at least two"));

        let err = RaceError::ProblemTooLarge { requested: 1 << 40 };
        assert!(err.to_string().contains("allocatable limit"));
    }
}
