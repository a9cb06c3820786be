//! Rolling snapshots.
//!
//! A snapshot here is an ordinary event in the stream, designated as an
//! origin by [`Decider::is_origin`](crate::decider::Decider::is_origin) and
//! built by [`Decider::snapshot`](crate::decider::Decider::snapshot). Readers
//! scan backwards only as far as the newest origin, so a snapshot bounds
//! replay cost without any separate snapshot storage.
//!
//! [`SnapshotPolicy`] decides when a writer appends one alongside the events
//! it decided on.

use serde::{Deserialize, Serialize};

/// Policy for when to append a snapshot event.
///
/// - [`SnapshotPolicy::Always`]: with every write (high storage cost, minimal
///   replay)
/// - [`SnapshotPolicy::EveryNEvents`]: once N events have accumulated since
///   the last origin (balanced approach)
/// - [`SnapshotPolicy::Never`]: never write snapshots; existing origin events
///   are still honoured when reading
///
/// Start with `EveryNEvents(n)` for n around the store's read batch size and
/// tune from there.
///
/// Serialized as `"always"`, `{ "every_n_events": 100 }` or `"never"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPolicy {
    /// Snapshot with every write that appends events.
    Always,
    /// Snapshot once at least N events follow the last origin.
    EveryNEvents(u64),
    /// Never write snapshots.
    #[default]
    Never,
}

impl SnapshotPolicy {
    /// Whether a snapshot should be written given the number of events that
    /// will follow the last origin once the pending append lands.
    #[must_use]
    pub const fn should_snapshot(&self, events_since_origin: u64) -> bool {
        match self {
            Self::Always => true,
            Self::EveryNEvents(threshold) => events_since_origin >= *threshold,
            Self::Never => false,
        }
    }
}
