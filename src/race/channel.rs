//! Message types and channel endpoints between the coordinator and workers.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

/// Message sent from the coordinator to a worker.
#[derive(Debug, Clone)]
pub enum CoordinatorMessage {
    /// Encoded problem payload, delivered exactly once before the worker
    /// starts computing.
    Data(Vec<u8>),
    /// Advisory cancellation signal; at most one per non-winning worker.
    Cancel,
}

/// Message sent from a worker to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// The worker finished and its final cancellation probe was clear.
    Done { worker_id: usize },
    /// Encoded result payload, sent immediately after `Done`.
    Result { worker_id: usize, payload: Vec<u8> },
}

/// Channel endpoints owned by one worker.
pub struct WorkerChannels {
    /// Send DONE/RESULT to the coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
    /// Receive DATA, then possibly CANCEL, from the coordinator.
    pub from_coordinator: Receiver<CoordinatorMessage>,
}

/// Channel endpoints owned by the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from all workers, in arrival order.
    pub from_workers: Receiver<WorkerMessage>,
    /// One sender per worker, indexed by worker id.
    pub to_workers: Vec<Sender<CoordinatorMessage>>,
}

/// Create the channel system for a race with `num_workers` workers.
///
/// Worker→coordinator traffic shares one unbounded channel so workers never
/// block after startup. Each coordinator→worker link is bounded: it only
/// ever carries one DATA and at most one CANCEL.
pub fn create_channels(num_workers: usize) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    let (worker_tx, coordinator_rx) = unbounded();

    let mut to_workers = Vec::with_capacity(num_workers);
    let mut worker_channels = Vec::with_capacity(num_workers);

    for _ in 0..num_workers {
        let (coord_tx, worker_rx) = bounded(4);
        to_workers.push(coord_tx);
        worker_channels.push(WorkerChannels {
            to_coordinator: worker_tx.clone(),
            from_coordinator: worker_rx,
        });
    }

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        to_workers,
    };

    (coordinator, worker_channels)
}
