//! In-memory event store implementation for testing.
//!
//! This module provides [`Store`], a thread-safe in-memory implementation of
//! [`EventStore`](super::EventStore) suitable for unit tests and examples.
//!
//! # Example
//!
//! ```
//! use decider_core::{codec::JsonCodec, store::inmemory};
//!
//! let store: inmemory::Store<JsonCodec> = inmemory::Store::new(JsonCodec);
//! ```

use std::{
    collections::HashMap,
    convert::Infallible,
    future::Future,
    sync::{Arc, RwLock},
};

use nonempty::NonEmpty;

use crate::{
    concurrency::{ConcurrencyConflict, Version},
    event::EncodedEvent,
    store::{AppendOutcome, AppendResult, EventStore, Slice, StoredEvent},
    stream::StreamName,
};

/// In-memory event store that keeps streams in a hash map.
///
/// Clones share the same underlying streams.
#[derive(Clone)]
pub struct Store<C> {
    streams: Arc<RwLock<HashMap<StreamName, Vec<StoredEvent>>>>,
    codec: C,
}

impl<C> Store<C> {
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            streams: Arc::new(RwLock::new(HashMap::new())),
            codec,
        }
    }

    /// Every event of a stream, oldest first.
    #[must_use]
    pub fn events(&self, stream: &StreamName) -> Vec<StoredEvent> {
        self.streams
            .read()
            .expect("in-memory store lock poisoned")
            .get(stream)
            .cloned()
            .unwrap_or_default()
    }
}

impl<C: Default> Default for Store<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

fn version_of(events: &[StoredEvent]) -> Version {
    events.len() as Version
}

impl<C> EventStore for Store<C>
where
    C: crate::codec::Codec + Send + Sync,
{
    type Codec = C;
    type Error = Infallible;

    fn codec(&self) -> &Self::Codec {
        &self.codec
    }

    #[tracing::instrument(skip_all, fields(stream = %stream, ?before, max_count))]
    fn read_backward<'a>(
        &'a self,
        stream: &'a StreamName,
        before: Option<u64>,
        max_count: usize,
    ) -> impl Future<Output = Result<Slice, Self::Error>> + Send + 'a {
        let slice = {
            let streams = self.streams.read().expect("in-memory store lock poisoned");
            streams.get(stream).map_or_else(Slice::default, |events| {
                let end = before.map_or(events.len(), |before| {
                    usize::try_from(before).map_or(events.len(), |b| b.min(events.len()))
                });
                Slice {
                    version: version_of(events),
                    events: events[..end].iter().rev().take(max_count).cloned().collect(),
                }
            })
        };
        tracing::trace!(
            version = slice.version,
            events_read = slice.events.len(),
            "read stream backwards"
        );
        std::future::ready(Ok(slice))
    }

    #[tracing::instrument(
        skip_all,
        fields(stream = %stream, expected_version, event_count = events.len())
    )]
    fn append<'a>(
        &'a self,
        stream: &'a StreamName,
        expected_version: Version,
        events: NonEmpty<EncodedEvent>,
    ) -> impl Future<Output = AppendOutcome<Self::Error>> + Send + 'a {
        let result: AppendOutcome<Self::Error> = (|| {
            let mut streams = self.streams.write().expect("in-memory store lock poisoned");
            let existing = streams.entry(stream.clone()).or_default();
            let actual = version_of(existing);

            if actual != expected_version {
                tracing::debug!(expected_version, actual, "version mismatch, rejecting append");
                return Err(ConcurrencyConflict {
                    expected: expected_version,
                    actual,
                }
                .into());
            }

            for (index, event) in (actual..).zip(events) {
                existing.push(StoredEvent {
                    index,
                    kind: event.kind,
                    data: event.data,
                });
            }

            let version = version_of(existing);
            drop(streams);
            tracing::debug!(version, "events appended to stream");
            Ok(AppendResult { version })
        })();

        std::future::ready(result)
    }
}
