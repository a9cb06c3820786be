//! The `Aggregate` domain: a per-client flag that is set at most once.
//!
//! Event kinds and payload field names are the persisted format. Renaming
//! either is a breaking schema change.

use decider_core::{
    codec::Codec,
    decider::{Decider, Interpret},
    event::{DomainEvent, EncodedEvent, StreamEvent, encode_payload},
    handler::Handler,
    repository::{Repository, StoreExecuteError, StoreLoadError},
    store::EventStore,
    stream::StreamName,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client_id::{ClientId, ClientIdError};

// =============================================================================
// Events
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Happened {}

impl DomainEvent for Happened {
    const KIND: &'static str = "Happened";
}

/// Origin event carrying the complete state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshotted {
    pub happened: bool,
}

impl DomainEvent for Snapshotted {
    const KIND: &'static str = "Snapshotted";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Happened(Happened),
    Snapshotted(Snapshotted),
}

impl From<Happened> for Event {
    fn from(event: Happened) -> Self {
        Self::Happened(event)
    }
}

impl From<Snapshotted> for Event {
    fn from(event: Snapshotted) -> Self {
        Self::Snapshotted(event)
    }
}

impl StreamEvent for Event {
    const EVENT_KINDS: &'static [&'static str] = &[Happened::KIND, Snapshotted::KIND];

    fn kind(&self) -> &'static str {
        match self {
            Self::Happened(_) => Happened::KIND,
            Self::Snapshotted(_) => Snapshotted::KIND,
        }
    }

    fn encode<C: Codec>(&self, codec: &C) -> Result<EncodedEvent, C::Error> {
        match self {
            Self::Happened(e) => encode_payload(codec, e),
            Self::Snapshotted(e) => encode_payload(codec, e),
        }
    }

    fn try_decode<C: Codec>(kind: &str, data: &[u8], codec: &C) -> Result<Option<Self>, C::Error> {
        match kind {
            Happened::KIND => codec.deserialize(data).map(Self::Happened).map(Some),
            Snapshotted::KIND => codec.deserialize(data).map(Self::Snapshotted).map(Some),
            _ => Ok(None),
        }
    }
}

// =============================================================================
// State
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct State {
    pub happened: bool,
}

impl State {
    pub const INITIAL: Self = Self { happened: false };
}

impl Decider for State {
    const CATEGORY: &'static str = "Aggregate";

    type Event = Event;

    fn initial() -> Self {
        Self::INITIAL
    }

    fn evolve(self, event: &Event) -> Self {
        match event {
            Event::Happened(_) => Self { happened: true },
            Event::Snapshotted(e) => Self {
                happened: e.happened,
            },
        }
    }

    fn is_origin(event: &Event) -> bool {
        matches!(event, Event::Snapshotted(_))
    }

    fn snapshot(&self) -> Option<Event> {
        Some(
            Snapshotted {
                happened: self.happened,
            }
            .into(),
        )
    }
}

// =============================================================================
// Commands
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    MakeItSo,
}

impl Interpret<Command> for State {
    fn interpret(&self, command: &Command) -> Vec<Event> {
        match command {
            Command::MakeItSo if self.happened => vec![],
            Command::MakeItSo => vec![Happened {}.into()],
        }
    }
}

// =============================================================================
// Read model
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub sorted: bool,
}

impl View {
    #[must_use]
    pub const fn render(state: &State) -> Self {
        Self {
            sorted: state.happened,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Name of the stream holding `id`'s aggregate.
///
/// # Panics
///
/// Never in practice: the category is a valid constant and a client id
/// always renders as 32 hex digits.
#[must_use]
pub fn stream_name(id: &ClientId) -> StreamName {
    StreamName::new(State::CATEGORY, id)
        .expect("category has no '-' and client ids are never empty")
}

/// Error from the string-keyed entry points of [`Service`].
#[derive(Debug, Error)]
pub enum RequestError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    InvalidClientId(#[from] ClientIdError),
    #[error(transparent)]
    Service(E),
}

/// Per-client use cases over the `Aggregate` streams.
///
/// Each call resolves a fresh [`Handler`] for the client's stream; nothing
/// is cached between calls, so every read folds from the newest origin.
pub struct Service<S>
where
    S: EventStore,
{
    repository: Repository<S>,
}

impl<S> Service<S>
where
    S: EventStore,
{
    #[must_use]
    pub const fn new(repository: Repository<S>) -> Self {
        Self { repository }
    }

    #[must_use]
    pub const fn repository(&self) -> &Repository<S> {
        &self.repository
    }

    fn handler(&self, id: &ClientId) -> Handler<'_, S, State> {
        let stream = self
            .repository
            .resolve_id::<State>(id)
            .expect("category has no '-' and client ids are never empty");
        Handler::new(stream)
    }

    /// Execute `command` against the client's aggregate.
    ///
    /// # Errors
    ///
    /// Propagates the stream's [`ExecuteError`](decider_core::repository::ExecuteError).
    #[tracing::instrument(skip_all, fields(client_id = %id, ?command))]
    pub async fn execute(&self, id: &ClientId, command: Command) -> Result<(), StoreExecuteError<S>> {
        self.handler(id).execute(&command).await
    }

    /// Read the present state of the client's aggregate.
    ///
    /// # Errors
    ///
    /// Propagates the stream's [`LoadError`](decider_core::repository::LoadError).
    #[tracing::instrument(skip_all, fields(client_id = %id))]
    pub async fn read(&self, id: &ClientId) -> Result<View, StoreLoadError<S>> {
        self.handler(id).query(View::render).await
    }

    /// [`Service::execute`] for an id that has not been validated yet.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidClientId`] without touching the store
    /// if `id` is not a GUID.
    pub async fn execute_raw(
        &self,
        id: &str,
        command: Command,
    ) -> Result<(), RequestError<StoreExecuteError<S>>> {
        let id = ClientId::parse(id)?;
        self.execute(&id, command)
            .await
            .map_err(RequestError::Service)
    }

    /// [`Service::read`] for an id that has not been validated yet.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidClientId`] without touching the store
    /// if `id` is not a GUID.
    pub async fn read_raw(&self, id: &str) -> Result<View, RequestError<StoreLoadError<S>>> {
        let id = ClientId::parse(id)?;
        self.read(&id).await.map_err(RequestError::Service)
    }
}
