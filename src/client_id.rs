//! Strongly typed client identifier.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a string is not a well-formed GUID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid client id `{input}`: {source}")]
pub struct ClientIdError {
    pub input: String,
    #[source]
    pub source: uuid::Error,
}

/// Identifies the client whose aggregate a request addresses.
///
/// Any textual GUID form is accepted when parsing (hyphenated, simple,
/// braced, parenthesized or URN); the canonical rendering is 32 lowercase hex digits with no
/// hyphens, which is also the id part of the client's stream name.
///
/// Serializes as that canonical string and deserializes through [`parse`],
/// so a malformed id is rejected wherever it enters.
///
/// [`parse`]: ClientId::parse
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(Uuid);

impl ClientId {
    /// A fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// # Errors
    ///
    /// Returns [`ClientIdError`] if `input` is not a GUID.
    pub fn parse(input: &str) -> Result<Self, ClientIdError> {
        let guid = input
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(input);
        Uuid::parse_str(guid).map(Self).map_err(|source| ClientIdError {
            input: input.to_string(),
            source,
        })
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ClientId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for ClientId {
    type Err = ClientIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

impl Serialize for ClientId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClientId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
