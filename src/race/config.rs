//! Configuration for a race run.

use std::time::Duration;

/// Configuration for a single race.
#[derive(Debug, Clone)]
pub struct RaceConfig {
    /// Deadline for the first DONE; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// How often the coordinator wakes up to re-check the deadline while
    /// waiting for the first DONE.
    pub poll_interval: Duration,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl RaceConfig {
    /// Set the deadline for the first finisher.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the deadline from an Option.
    pub fn with_timeout_option(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the coordinator's deadline poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
