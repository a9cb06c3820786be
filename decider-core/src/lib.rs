//! Core traits and types for the Decider event-sourcing library.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`decider`] - Pure domain primitives (`Decider`, `Interpret`)
//! - [`event`] - Event encoding (`DomainEvent`, `StreamEvent`, `EncodedEvent`)
//! - [`codec`] - Payload serialization (`Codec`, `JsonCodec`)
//! - [`stream`] - Stream naming (`StreamName`)
//! - [`store`] - Event persistence abstraction (`EventStore`)
//! - [`repository`] - Loading state and the read, decide, append cycle
//! - [`handler`] - Command execution for one resolved stream (`Handler`)
//! - [`options`] - Retry, paging and snapshot settings (`StreamOptions`)
//! - [`snapshot`] - Rolling snapshot policy (`SnapshotPolicy`)
//! - [`concurrency`] - Stream versions and conflicts
//!
//! # Example
//!
//! ```
//! use decider_core::{codec::JsonCodec, repository::Repository, store::inmemory};
//!
//! let store = inmemory::Store::new(JsonCodec);
//! let repository = Repository::new(store);
//! assert_eq!(repository.options().max_attempts, 3);
//! ```
//!
//! Most users should depend on the `decider` crate, which re-exports these
//! types with a flatter API surface.

pub mod codec;
pub mod concurrency;
pub mod decider;
pub mod event;
pub mod handler;
pub mod options;
pub mod repository;
pub mod snapshot;
pub mod store;
pub mod stream;
