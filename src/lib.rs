//! Bounded, deduplicating, arrival-ordered record of recently seen peer-to-peer messages.
//!
//! [`Tracker`] keeps at most `capacity` messages, ignores any message whose ID it
//! already holds, evicts the oldest message when a new one arrives at capacity,
//! and supports O(1) lookup and removal by ID. [`SharedTracker`] is the same
//! structure behind a single lock for use from several threads.

mod messages;
mod shared;
mod tracker;

pub use messages::{Message, MessageId, PeerId};
pub use shared::SharedTracker;
pub use tracker::{
    Admission, Iter, Tracker, TrackerConfig, TrackerError, TrackerStats, DEFAULT_CAPACITY,
};
