//! # Tracked Message Types
//!
//! The tracker treats every field of a [`Message`] as opaque:
//!
//! - [`MessageId`]: unique identifier, the only key used for deduplication and lookup
//! - [`PeerId`]: identifier of the peer the message arrived from, carried untouched
//! - `data`: payload bytes, carried untouched
//!
//! Two messages with the same `MessageId` are the same message as far as the
//! tracker is concerned, even if they came from different peers or carry
//! different payloads.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed per-message bookkeeping overhead counted by [`Message::size_bytes`].
const MESSAGE_OVERHEAD_BYTES: usize = 64;

/// Unique identifier of a gossiped message.
///
/// Hashes and compares exactly like the underlying string, so maps keyed by
/// `MessageId` can be queried with a plain `&str`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MessageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of the peer a message was received from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PeerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A message as handed to the tracker by the network layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub peer_id: PeerId,
    pub data: Vec<u8>,
}

impl Message {
    pub fn new(
        id: impl Into<MessageId>,
        peer_id: impl Into<PeerId>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id: id.into(),
            peer_id: peer_id.into(),
            data: data.into(),
        }
    }

    /// Approximate heap footprint, used for the tracker's retained-bytes counter.
    pub fn size_bytes(&self) -> usize {
        self.id.as_str().len()
            + self.peer_id.as_str().len()
            + self.data.len()
            + MESSAGE_OVERHEAD_BYTES
    }
}
