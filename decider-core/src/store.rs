//! Persistence layer abstractions.
//!
//! This module describes the storage contract (`EventStore`) that the
//! [`Repository`](crate::repository::Repository) resolves streams against,
//! the shapes events take on either side of it, and a reference in-memory
//! implementation.
//!
//! A store only ever sees encoded events. Decoding, folding and deciding stay
//! on the other side of the boundary.
use std::future::Future;

pub use nonempty::NonEmpty;
use thiserror::Error;

use crate::{
    codec::Codec,
    concurrency::{ConcurrencyConflict, Version},
    event::EncodedEvent,
    stream::StreamName,
};

pub mod inmemory;

/// Event materialized from a stream, with its zero-based index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredEvent {
    pub index: u64,
    pub kind: String,
    pub data: Vec<u8>,
}

/// A page of events read backwards from a stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slice {
    /// Version of the stream at read time.
    pub version: Version,
    /// Events ordered newest first.
    pub events: Vec<StoredEvent>,
}

/// Error from append operations with version checking.
#[derive(Debug, Error)]
pub enum AppendError<StoreError>
where
    StoreError: std::error::Error,
{
    /// Another writer modified the stream since it was read.
    #[error(transparent)]
    Conflict(#[from] ConcurrencyConflict),
    /// Underlying store error.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

/// Result of a successful append operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AppendResult {
    /// Version of the stream after the append.
    pub version: Version,
}

/// Convenience alias for append outcomes returned by event stores.
pub type AppendOutcome<Err> = Result<AppendResult, AppendError<Err>>;

/// Append-only storage of named event streams.
///
/// Implementations own durability and must make [`EventStore::append`] atomic
/// and version checked: either every event in the batch is written at
/// `expected_version..`, or none is.
pub trait EventStore: Send + Sync {
    /// Store-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serialization codec for event payloads.
    type Codec: Codec + Send + Sync;

    fn codec(&self) -> &Self::Codec;

    /// Read up to `max_count` events backwards.
    ///
    /// With `before = None` reading starts at the newest event; otherwise at
    /// the event with index `before - 1`. Events are returned newest first.
    /// The slice always carries the stream's current version (`0` if it holds
    /// no events), even when no events are returned.
    ///
    /// # Errors
    ///
    /// Returns a store-specific error when loading fails.
    fn read_backward<'a>(
        &'a self,
        stream: &'a StreamName,
        before: Option<u64>,
        max_count: usize,
    ) -> impl Future<Output = Result<Slice, Self::Error>> + Send + 'a;

    /// Append events if the stream is still at `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`AppendError::Conflict`] if the version doesn't match, or
    /// [`AppendError::Store`] if persistence fails.
    fn append<'a>(
        &'a self,
        stream: &'a StreamName,
        expected_version: Version,
        events: NonEmpty<EncodedEvent>,
    ) -> impl Future<Output = AppendOutcome<Self::Error>> + Send + 'a;
}
