//! Optimistic concurrency.
//!
//! A stream's version is the number of events it holds. A writer remembers
//! the version it observed when reading and passes it as the expected version
//! when appending; the store rejects the append if another writer got there
//! first. Nothing is locked between the read and the append.

use thiserror::Error;

/// Number of events in a stream. `0` is an empty (or not yet created) stream.
pub type Version = u64;

/// Error indicating a concurrency conflict during append.
///
/// Returned by a store when the stream's version no longer matches the
/// version the writer observed at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", format_conflict(.expected, .actual))]
pub struct ConcurrencyConflict {
    /// The version observed when the stream was read.
    pub expected: Version,
    /// The version found in the store at append time.
    pub actual: Version,
}

/// Build a human-readable message for a [`ConcurrencyConflict`], including an
/// actionable hint for the caller.
fn format_conflict(expected: &Version, actual: &Version) -> String {
    if *expected == 0 {
        format!(
            "concurrency conflict: expected new stream, found version {actual} (hint: another \
             process created this stream; reload and retry)"
        )
    } else {
        format!(
            "concurrency conflict: expected version {expected}, found {actual} (hint: stream was \
             modified; reload and retry)"
        )
    }
}
