//! Cooperative cancellation, checked at strategy checkpoints.

use std::cell::Cell;

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

use crate::race::channel::CoordinatorMessage;

/// Per-worker cancellation flag fed by the coordinator's channel.
///
/// The token owns the worker's receive endpoint once the initial problem
/// delivery has been consumed. [`should_cancel`](Self::should_cancel) is a
/// non-blocking probe: it consumes a pending CANCEL if one has arrived and
/// latches the flag. Once observed, the flag is terminal for the rest of the
/// worker's life; later probes return `true` without touching the channel.
///
/// Single writer (the coordinator), single reader (the worker); the worker
/// runs on one sequential control flow, so plain `Cell`s suffice.
pub struct CancellationToken {
    from_coordinator: Receiver<CoordinatorMessage>,
    cancelled: Cell<bool>,
    probes: Cell<u64>,
}

impl CancellationToken {
    pub(crate) fn new(from_coordinator: Receiver<CoordinatorMessage>) -> Self {
        Self {
            from_coordinator,
            cancelled: Cell::new(false),
            probes: Cell::new(0),
        }
    }

    /// Non-blocking cancellation probe.
    ///
    /// Returns `true` once a CANCEL has been observed, consuming it from the
    /// channel on first sight.
    pub fn should_cancel(&self) -> bool {
        self.probes.set(self.probes.get() + 1);
        if self.cancelled.get() {
            return true;
        }
        match self.from_coordinator.try_recv() {
            Ok(CoordinatorMessage::Cancel) => {
                self.cancelled.set(true);
                true
            }
            Ok(CoordinatorMessage::Data(_)) => {
                // DATA is legal exactly once, before the token exists.
                warn!("duplicate DATA after problem delivery, discarding");
                false
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                // Coordinator is gone; nobody is left to accept a result.
                self.cancelled.set(true);
                true
            }
        }
    }

    /// Whether a cancellation has already been observed.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Number of probes performed so far, counting the final pre-announce
    /// check the harness makes.
    pub fn probe_count(&self) -> u64 {
        self.probes.get()
    }
}
