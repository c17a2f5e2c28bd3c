use std::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::messages::Message;
use crate::tracker::{Admission, Tracker, TrackerConfig, TrackerError, TrackerStats};

/// A [`Tracker`] behind one mutex, shareable across threads and tasks.
///
/// Every operation holds the lock for its whole duration, so adds, deletes and
/// reads are linearizable and [`SharedTracker::messages`] is a consistent
/// point-in-time snapshot. Nothing here blocks on I/O or awaits; the critical
/// sections are the O(1) tracker operations (or one O(n) copy for snapshots).
#[derive(Clone, Debug)]
pub struct SharedTracker {
    inner: Arc<Mutex<Tracker>>,
}

impl SharedTracker {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::from(Tracker::new(capacity))
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, TrackerError> {
        Tracker::with_capacity(capacity).map(Self::from)
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self, TrackerError> {
        Tracker::from_config(config).map(Self::from)
    }

    pub fn add(&self, message: Message) -> Admission {
        self.inner.lock().add(message)
    }

    pub fn delete(&self, id: &str) -> Result<Message, TrackerError> {
        self.inner.lock().delete(id)
    }

    /// Clone of the retained message with the given ID.
    pub fn message(&self, id: &str) -> Result<Message, TrackerError> {
        self.inner.lock().message(id).cloned()
    }

    /// Snapshot of all retained messages, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.lock().iter().cloned().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    pub fn stats(&self) -> TrackerStats {
        self.inner.lock().stats()
    }

    /// Run `f` with exclusive access, for compound operations that must not
    /// interleave with other callers.
    pub fn with<R>(&self, f: impl FnOnce(&mut Tracker) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<Tracker> for SharedTracker {
    fn from(tracker: Tracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }
}
