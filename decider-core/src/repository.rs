//! Stream resolution and the read, decide, append cycle.
//!
//! `Repository` owns an [`EventStore`] and the [`StreamOptions`] that govern
//! access to it. [`Repository::resolve`] binds a stream name to a decider
//! type, producing a [`Stream`] that can:
//!
//! - load current state: read backwards to the newest origin event, then fold
//!   forwards from [`Decider::initial`];
//! - transact: load, run a pure decision, and append its events with the
//!   version observed at load time, re-running the whole cycle on conflict.
//!
//! No lock is held between reading and appending. Writers to the same stream
//! are serialized by the store's version check alone.

use std::{fmt, marker::PhantomData};

use thiserror::Error;

use crate::{
    codec::Codec,
    concurrency::{ConcurrencyConflict, Version},
    decider::Decider,
    event::{EncodedEvent, StreamEvent},
    options::{OptionsError, StreamOptions},
    store::{AppendError, AppendResult, EventStore, NonEmpty},
    stream::{StreamName, StreamNameError},
};

/// A stored event whose kind is known but whose payload does not decode.
#[derive(Debug, Error)]
#[error("failed to decode event {index} (kind `{kind}`, one of {expected:?}): {source}")]
pub struct EventDecodeError<CodecError>
where
    CodecError: std::error::Error + 'static,
{
    pub kind: String,
    pub index: u64,
    /// Every kind the reading decider's event type decodes.
    pub expected: &'static [&'static str],
    #[source]
    pub source: CodecError,
}

/// Error rebuilding state from a stream.
#[derive(Debug, Error)]
pub enum LoadError<StoreError, CodecError>
where
    StoreError: std::error::Error + 'static,
    CodecError: std::error::Error + 'static,
{
    #[error("failed to read stream: {0}")]
    Store(#[source] StoreError),
    #[error(transparent)]
    Decode(#[from] EventDecodeError<CodecError>),
}

/// Error executing a decision against a stream.
#[derive(Debug, Error)]
pub enum ExecuteError<StoreError, CodecError>
where
    StoreError: std::error::Error + 'static,
    CodecError: std::error::Error + 'static,
{
    #[error("failed to rebuild state: {0}")]
    Load(#[source] LoadError<StoreError, CodecError>),
    #[error("failed to encode events: {0}")]
    Codec(#[source] CodecError),
    #[error("failed to persist events: {0}")]
    Store(#[source] StoreError),
    #[error("gave up after {attempts} attempts: {conflict}")]
    Conflict {
        attempts: usize,
        #[source]
        conflict: ConcurrencyConflict,
    },
}

/// [`LoadError`] for a given store.
pub type StoreLoadError<S> =
    LoadError<<S as EventStore>::Error, <<S as EventStore>::Codec as Codec>::Error>;

/// [`ExecuteError`] for a given store.
pub type StoreExecuteError<S> =
    ExecuteError<<S as EventStore>::Error, <<S as EventStore>::Codec as Codec>::Error>;

/// State rebuilt from a stream, with the version it was read at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loaded<D> {
    /// Stream version observed by the read; the expected version of the
    /// next append.
    pub version: Version,
    pub state: D,
    /// Events folded after the newest origin (all events if none was found).
    pub events_since_origin: u64,
}

pub struct Repository<S>
where
    S: EventStore,
{
    store: S,
    options: StreamOptions,
}

impl<S> Repository<S>
where
    S: EventStore,
{
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            options: StreamOptions::default(),
        }
    }

    /// Replace the stream options.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError`] if the options are invalid.
    pub fn with_options(mut self, options: StreamOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    #[must_use]
    pub const fn event_store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// Bind the stream of decider `D`'s instance `id`, named
    /// `"{D::CATEGORY}-{id}"`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamNameError`] if `D::CATEGORY` contains `-` or `id`
    /// renders empty.
    pub fn resolve_id<D>(&self, id: impl fmt::Display) -> Result<Stream<'_, S, D>, StreamNameError>
    where
        D: Decider,
    {
        StreamName::new(D::CATEGORY, id).map(|name| self.resolve(name))
    }

    /// Bind a stream to the decider that interprets it.
    ///
    /// Resolving is cheap; nothing is read until the stream is used.
    pub const fn resolve<D>(&self, name: StreamName) -> Stream<'_, S, D>
    where
        D: Decider,
    {
        Stream {
            store: &self.store,
            options: self.options,
            name,
            _decider: PhantomData,
        }
    }
}

/// A named stream bound to a decider type.
pub struct Stream<'r, S, D> {
    store: &'r S,
    options: StreamOptions,
    name: StreamName,
    _decider: PhantomData<fn() -> D>,
}

impl<S, D> Stream<'_, S, D>
where
    S: EventStore,
    D: Decider,
{
    #[must_use]
    pub const fn name(&self) -> &StreamName {
        &self.name
    }

    /// Rebuild current state.
    ///
    /// Reads backwards in pages of `batch_size` until an origin event (or the
    /// start of the stream) is reached, skipping kinds the decider's event
    /// type does not know, then folds the collected events oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Store`] if reading fails and
    /// [`LoadError::Decode`] if a known event's payload does not decode.
    #[tracing::instrument(skip_all, fields(stream = %self.name))]
    pub async fn load(&self) -> Result<Loaded<D>, StoreLoadError<S>> {
        let codec = self.store.codec();
        let batch_size = self.options.batch_size;

        let mut version = None;
        let mut before = None;
        let mut events = Vec::new();
        let mut origin_found = false;

        'read: loop {
            let slice = self
                .store
                .read_backward(&self.name, before, batch_size)
                .await
                .map_err(LoadError::Store)?;
            version.get_or_insert(slice.version);
            let page_len = slice.events.len();

            for stored in slice.events {
                before = Some(stored.index);
                match D::Event::try_decode(&stored.kind, &stored.data, codec) {
                    Ok(Some(event)) => {
                        let is_origin = D::is_origin(&event);
                        events.push(event);
                        if is_origin {
                            origin_found = true;
                            break 'read;
                        }
                    }
                    Ok(None) => {
                        tracing::trace!(
                            kind = %stored.kind,
                            index = stored.index,
                            known = ?D::Event::EVENT_KINDS,
                            "skipping unknown event kind"
                        );
                    }
                    Err(source) => {
                        return Err(EventDecodeError {
                            kind: stored.kind,
                            index: stored.index,
                            expected: D::Event::EVENT_KINDS,
                            source,
                        }
                        .into());
                    }
                }
            }

            if page_len < batch_size || before == Some(0) {
                break;
            }
        }

        events.reverse();
        let folded = u64::try_from(events.len()).unwrap_or(u64::MAX);
        let events_since_origin = if origin_found {
            folded.saturating_sub(1)
        } else {
            folded
        };
        let version = version.unwrap_or(0);
        let state = D::initial().fold(&events);

        tracing::debug!(
            version,
            events_folded = folded,
            origin_found,
            "loaded stream state"
        );

        Ok(Loaded {
            version,
            state,
            events_since_origin,
        })
    }

    /// Rebuild current state and project a view from it.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the state cannot be rebuilt.
    pub async fn query<T, P>(&self, projection: P) -> Result<T, StoreLoadError<S>>
    where
        P: FnOnce(&D) -> T,
    {
        let loaded = self.load().await?;
        Ok(projection(&loaded.state))
    }

    /// Run `decide` against current state and append what it returns.
    ///
    /// An empty decision appends nothing. On a concurrency conflict the
    /// stream is reloaded and `decide` re-run against the fresher state, up
    /// to `max_attempts` times in total.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::Conflict`] once attempts are exhausted, or the
    /// first load, encode or store failure encountered.
    #[tracing::instrument(skip_all, fields(stream = %self.name))]
    pub async fn transact<F>(&self, decide: F) -> Result<(), StoreExecuteError<S>>
    where
        F: Fn(&D) -> Vec<D::Event>,
    {
        let max_attempts = self.options.max_attempts;
        let mut attempt = 1;

        loop {
            let loaded = self.load().await.map_err(ExecuteError::Load)?;

            let Some(decided) = NonEmpty::from_vec(decide(&loaded.state)) else {
                tracing::debug!(attempt, "decision produced no events");
                return Ok(());
            };

            let batch = self.encode_batch(&loaded, &decided)?;

            match self.store.append(&self.name, loaded.version, batch).await {
                Ok(AppendResult { version }) => {
                    tracing::debug!(attempt, version, "decision appended");
                    return Ok(());
                }
                Err(AppendError::Conflict(conflict)) if attempt < max_attempts => {
                    tracing::debug!(attempt, %conflict, "concurrency conflict, retrying");
                    attempt += 1;
                }
                Err(AppendError::Conflict(conflict)) => {
                    tracing::warn!(attempts = attempt, %conflict, "concurrency conflict, giving up");
                    return Err(ExecuteError::Conflict {
                        attempts: attempt,
                        conflict,
                    });
                }
                Err(AppendError::Store(error)) => return Err(ExecuteError::Store(error)),
            }
        }
    }

    /// Encode decided events, followed by a snapshot of the resulting state
    /// when the snapshot policy asks for one.
    fn encode_batch(
        &self,
        loaded: &Loaded<D>,
        decided: &NonEmpty<D::Event>,
    ) -> Result<NonEmpty<EncodedEvent>, StoreExecuteError<S>> {
        let codec = self.store.codec();
        let encode = |event: &D::Event| -> Result<EncodedEvent, StoreExecuteError<S>> {
            event.encode(codec).map_err(ExecuteError::Codec)
        };

        let mut batch = NonEmpty::new(encode(&decided.head)?);
        for event in &decided.tail {
            batch.push(encode(event)?);
        }

        let pending = u64::try_from(decided.len()).unwrap_or(u64::MAX);
        let since_origin = loaded.events_since_origin.saturating_add(pending);
        if self.options.snapshots.should_snapshot(since_origin)
            && let Some(snapshot) = loaded.state.fold(decided.iter()).snapshot()
        {
            tracing::debug!(since_origin, kind = snapshot.kind(), "appending snapshot");
            batch.push(encode(&snapshot)?);
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, io};

    use super::*;

    #[test]
    fn decode_error_names_kind_and_index() {
        let error = EventDecodeError {
            kind: "Happened".to_string(),
            index: 3,
            expected: &["Happened", "Snapshotted"],
            source: io::Error::other("bad json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("event 3"));
        assert!(msg.contains("`Happened`"));
        assert!(msg.contains(r#"one of ["Happened", "Snapshotted"]"#));
        assert!(error.source().is_some());
    }

    #[test]
    fn conflict_error_reports_attempts() {
        let error: ExecuteError<io::Error, io::Error> = ExecuteError::Conflict {
            attempts: 3,
            conflict: ConcurrencyConflict {
                expected: 1,
                actual: 2,
            },
        };
        let msg = error.to_string();
        assert!(msg.contains("gave up after 3 attempts"));
        assert!(error.source().is_some());
    }

    #[test]
    fn store_error_has_source() {
        let error: ExecuteError<io::Error, io::Error> =
            ExecuteError::Store(io::Error::other("store error"));
        assert!(error.to_string().contains("failed to persist events"));
        assert!(error.source().is_some());
    }
}
