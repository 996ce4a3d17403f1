//! Progress checkpointing with an offline retry queue.
//!
//! Durable storage is a collaborator behind [`ProgressStore`]. Persistence
//! is fire-and-forget from the engine's point of view: a failed write is
//! logged, parked in a bounded queue, and replayed on the next successful
//! opportunity. Store failures never propagate into playback control flow.
//!
//! The queue is an explicit object (serializable to JSON so the host can
//! stash it in local storage), not ambient state.

use std::collections::VecDeque;

use log::warn;
use serde::{Deserialize, Serialize};

/// Default cadence of periodic progress reports while playing.
pub const AUTOSAVE_INTERVAL_MS: u64 = 10_000;

/// Default bound on the offline queue.
pub const OFFLINE_QUEUE_CAPACITY: usize = 64;

/// One progress snapshot worth persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCheckpoint {
    /// Index into the word sequence.
    pub position: usize,
    /// Accumulated play time in seconds.
    pub elapsed_seconds: u64,
    /// Average rate so far.
    pub avg_wpm: u32,
}

/// Failure to persist a checkpoint (network down, store rejected the write).
#[derive(Debug, thiserror::Error)]
#[error("progress store failure: {0}")]
pub struct ProgressStoreError(pub String);

/// Collaborator that durably stores progress checkpoints.
pub trait ProgressStore {
    /// Persists one checkpoint for the given reading session.
    fn persist(
        &mut self,
        session_id: &str,
        checkpoint: &ProgressCheckpoint,
    ) -> Result<(), ProgressStoreError>;
}

/// A checkpoint waiting for the store to come back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedCheckpoint {
    /// Session the checkpoint belongs to.
    pub session_id: String,
    /// The parked checkpoint.
    pub checkpoint: ProgressCheckpoint,
}

/// Bounded FIFO of checkpoints that failed to persist.
///
/// When full, the oldest entry is dropped: a newer checkpoint always
/// supersedes an older one for the same session, so shedding from the front
/// loses nothing that matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineQueue {
    entries: VecDeque<QueuedCheckpoint>,
    capacity: usize,
}

impl Default for OfflineQueue {
    fn default() -> Self {
        Self::new(OFFLINE_QUEUE_CAPACITY)
    }
}

impl OfflineQueue {
    /// An empty queue holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Number of parked checkpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parks a checkpoint, shedding the oldest entry when full.
    pub fn push(&mut self, entry: QueuedCheckpoint) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Replays parked checkpoints in order, stopping at the first failure.
    /// Returns how many were successfully persisted.
    pub fn flush(&mut self, store: &mut dyn ProgressStore) -> usize {
        let mut flushed = 0;
        while let Some(entry) = self.entries.front() {
            match store.persist(&entry.session_id, &entry.checkpoint) {
                Ok(()) => {
                    self.entries.pop_front();
                    flushed += 1;
                }
                Err(err) => {
                    warn!("offline queue flush stopped: {err}");
                    break;
                }
            }
        }
        flushed
    }

    /// Serializes the queue for host-side storage.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Restores a queue from host-side storage; malformed input yields an
    /// empty queue rather than an error.
    #[must_use]
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(mut queue) => {
                queue.capacity = queue.capacity.max(1);
                queue
            }
            Err(err) => {
                warn!("discarding malformed offline queue snapshot: {err}");
                Self::new(OFFLINE_QUEUE_CAPACITY)
            }
        }
    }
}

/// Periodic progress reporter driven by the host clock.
///
/// Started only while a session is playing (and, by the caller's choice,
/// only for authenticated users); always stopped when play stops so a stale
/// timer can never report against a resumed or replaced session.
pub struct ProgressReporter<S: ProgressStore> {
    session_id: String,
    store: S,
    queue: OfflineQueue,
    interval_ms: u64,
    next_due: Option<u64>,
}

impl<S: ProgressStore> ProgressReporter<S> {
    /// A reporter for one reading session with default cadence and queue.
    pub fn new(session_id: impl Into<String>, store: S) -> Self {
        Self::with_queue(session_id, store, OfflineQueue::new(OFFLINE_QUEUE_CAPACITY))
    }

    /// A reporter resuming with a previously persisted offline queue.
    pub fn with_queue(session_id: impl Into<String>, store: S, queue: OfflineQueue) -> Self {
        Self {
            session_id: session_id.into(),
            store,
            queue,
            interval_ms: AUTOSAVE_INTERVAL_MS,
            next_due: None,
        }
    }

    /// Arms the periodic timer.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due = Some(now_ms + self.interval_ms);
    }

    /// Disarms the periodic timer.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Whether the periodic timer is armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// When the host should next call [`Self::tick`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.next_due
    }

    /// Reports `checkpoint` if the periodic timer is due; otherwise a no-op.
    pub fn tick(&mut self, now_ms: u64, checkpoint: ProgressCheckpoint) {
        let Some(due) = self.next_due else {
            return;
        };
        if now_ms < due {
            return;
        }
        self.next_due = Some(now_ms + self.interval_ms);
        self.report(checkpoint);
    }

    /// Persists a checkpoint immediately. Failures are logged and parked;
    /// nothing propagates to the caller.
    pub fn report(&mut self, checkpoint: ProgressCheckpoint) {
        // Drain the backlog first so the freshest checkpoint lands last in a
        // last-write-wins store.
        if !self.queue.is_empty() {
            self.queue.flush(&mut self.store);
            if !self.queue.is_empty() {
                // Still offline; park the fresh checkpoint behind the rest.
                self.queue.push(QueuedCheckpoint {
                    session_id: self.session_id.clone(),
                    checkpoint,
                });
                return;
            }
        }

        if let Err(err) = self.store.persist(&self.session_id, &checkpoint) {
            warn!("progress checkpoint failed, queuing offline: {err}");
            self.queue.push(QueuedCheckpoint {
                session_id: self.session_id.clone(),
                checkpoint,
            });
        }
    }

    /// The current offline backlog.
    #[must_use]
    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }
}
