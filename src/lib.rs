#![doc = include_str!("../README.md")]

#[cfg(feature = "test-util")]
pub use decider_core::test;
pub use decider_core::{
    codec,
    codec::{Codec, JsonCodec},
    concurrency,
    concurrency::{ConcurrencyConflict, Version},
    decider,
    decider::{Decider, Interpret},
    event,
    event::{DomainEvent, EncodedEvent, StreamEvent},
    handler,
    handler::Handler,
    options,
    options::{OptionsError, StreamOptions},
    repository,
    repository::{EventDecodeError, ExecuteError, LoadError, Loaded, Repository, Stream},
    stream,
    stream::{StreamName, StreamNameError},
};

pub mod aggregate;
pub mod client_id;

pub use client_id::{ClientId, ClientIdError};

pub mod store {

    pub use decider_core::store::{EventStore, NonEmpty, Slice, StoredEvent};

    // Re-export low-level append types for EventStore implementors only.
    // Most users should interact with the Repository API instead.
    #[doc(hidden)]
    pub use decider_core::store::{AppendError, AppendOutcome, AppendResult};

    pub use decider_core::store::inmemory;
}

pub mod snapshot {

    pub use decider_core::snapshot::SnapshotPolicy;
}
