use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::messages::{Message, MessageId};


pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum number of messages retained before the oldest is evicted.
    pub capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TrackerConfig {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        self.non_zero_capacity().map(|_| ())
    }

    fn non_zero_capacity(&self) -> Result<NonZeroUsize, TrackerError> {
        NonZeroUsize::new(self.capacity).ok_or(TrackerError::ZeroCapacity)
    }
}


/// Error returned by tracker lookups, deletions and construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// No retained message has the requested ID.
    NotFound(MessageId),
    /// A tracker was requested with room for zero messages.
    ZeroCapacity,
}

impl std::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "message not found: {}", id),
            Self::ZeroCapacity => write!(f, "tracker capacity must be at least 1"),
        }
    }
}

impl std::error::Error for TrackerError {}


/// Outcome of [`Tracker::add`].
///
/// Every variant is a normal result; `add` has no failure mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The message was appended and nothing had to make room for it.
    Inserted,
    /// The message was appended after evicting the oldest retained message.
    Evicted(Message),
    /// A message with the same ID is already retained; nothing changed.
    Duplicate,
}

impl Admission {
    /// True when the offered message is now retained.
    pub fn is_inserted(&self) -> bool {
        !matches!(self, Self::Duplicate)
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }

    pub fn evicted(self) -> Option<Message> {
        match self {
            Self::Evicted(message) => Some(message),
            _ => None,
        }
    }
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub len: usize,
    pub capacity: usize,
    pub inserted: u64,
    pub duplicates: u64,
    pub evicted: u64,
    pub deleted: u64,
    /// Messages dropped by [`Tracker::clear`].
    pub cleared: u64,
    pub retained_bytes: usize,
}


/// Bounded, deduplicating record of recently seen messages in arrival order.
///
/// Both the ID index and the arrival order live in one linked hash map: every
/// entry is a node of an intrusive doubly-linked list and the hash table maps
/// the ID straight to that node. Adding appends at the newest end, eviction
/// pops the oldest end, and deleting unlinks the node found through the table,
/// so `add`, `delete` and `message` are all O(1). Only enumeration walks the list.
///
/// Reads go through `peek`/`contains`, which never promote an entry, so the
/// list order stays exactly the order in which messages were first accepted.
///
/// Mutation takes `&mut self`; callers sharing one tracker between threads
/// either serialize access themselves or use [`crate::SharedTracker`].
#[derive(Debug)]
pub struct Tracker {
    entries: LruCache<MessageId, Message>,
    retained_bytes: usize,
    inserted: u64,
    duplicates: u64,
    evicted: u64,
    deleted: u64,
    cleared: u64,
}

impl Tracker {
    pub fn new(capacity: NonZeroUsize) -> Self {
        debug!(capacity = capacity.get(), "message tracker created");
        Self {
            entries: LruCache::new(capacity),
            retained_bytes: 0,
            inserted: 0,
            duplicates: 0,
            evicted: 0,
            deleted: 0,
            cleared: 0,
        }
    }

    /// Create a tracker from a plain capacity, rejecting zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, TrackerError> {
        Self::from_config(&TrackerConfig::new(capacity))
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self, TrackerError> {
        Ok(Self::new(config.non_zero_capacity()?))
    }

    /// Track `message` unless its ID is already retained.
    ///
    /// When the tracker is full the oldest message is evicted first and handed
    /// back in [`Admission::Evicted`]. A duplicate ID leaves the retained copy,
    /// its payload and its position untouched, whatever peer sent the new copy.
    pub fn add(&mut self, message: Message) -> Admission {
        if self.entries.contains(message.id.as_str()) {
            self.duplicates = self.duplicates.saturating_add(1);
            trace!(
                message_id = %message.id,
                peer = %message.peer_id,
                "duplicate message ignored"
            );
            return Admission::Duplicate;
        }

        let evicted = if self.is_full() {
            self.pop_oldest()
        } else {
            None
        };

        self.retained_bytes = self.retained_bytes.saturating_add(message.size_bytes());
        self.inserted = self.inserted.saturating_add(1);
        self.entries.put(message.id.clone(), message);

        match evicted {
            Some(oldest) => Admission::Evicted(oldest),
            None => Admission::Inserted,
        }
    }

    fn pop_oldest(&mut self) -> Option<Message> {
        let (_, oldest) = self.entries.pop_lru()?;
        self.retained_bytes = self.retained_bytes.saturating_sub(oldest.size_bytes());
        self.evicted = self.evicted.saturating_add(1);
        trace!(
            message_id = %oldest.id,
            peer = %oldest.peer_id,
            len = self.entries.len(),
            "evicted oldest message"
        );
        Some(oldest)
    }

    /// Remove the message with the given ID and hand it back.
    pub fn delete(&mut self, id: &str) -> Result<Message, TrackerError> {
        let message = self
            .entries
            .pop(id)
            .ok_or_else(|| TrackerError::NotFound(MessageId::from(id)))?;

        self.retained_bytes = self.retained_bytes.saturating_sub(message.size_bytes());
        self.deleted = self.deleted.saturating_add(1);
        Ok(message)
    }

    /// Look up a retained message. The message stays in the tracker.
    pub fn message(&self, id: &str) -> Result<&Message, TrackerError> {
        self.entries
            .peek(id)
            .ok_or_else(|| TrackerError::NotFound(MessageId::from(id)))
    }

    /// All retained messages, oldest first.
    pub fn messages(&self) -> Vec<&Message> {
        self.iter().collect()
    }

    /// Iterate retained messages oldest first without allocating.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter().rev(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    pub fn oldest(&self) -> Option<&Message> {
        self.entries.peek_lru().map(|(_, message)| message)
    }

    pub fn newest(&self) -> Option<&Message> {
        self.entries.iter().next().map(|(_, message)| message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Drop every retained message. Capacity and counters are kept.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.retained_bytes = 0;
        self.cleared = self.cleared.saturating_add(dropped as u64);
        debug!(dropped, "message tracker cleared");
    }

    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            len: self.entries.len(),
            capacity: self.capacity(),
            inserted: self.inserted,
            duplicates: self.duplicates,
            evicted: self.evicted,
            deleted: self.deleted,
            cleared: self.cleared,
            retained_bytes: self.retained_bytes,
        }
    }
}

impl Extend<Message> for Tracker {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, messages: I) {
        for message in messages {
            self.add(message);
        }
    }
}

impl<'a> IntoIterator for &'a Tracker {
    type Item = &'a Message;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


/// Oldest-first iterator over a [`Tracker`].
pub struct Iter<'a> {
    inner: std::iter::Rev<lru::Iter<'a, MessageId, Message>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Message;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, message)| message)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, message)| message)
    }
}

impl ExactSizeIterator for Iter<'_> {}
