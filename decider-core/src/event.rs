//! Domain event traits and the encoded wire form.
//!
//! `DomainEvent` is the lightweight trait every concrete event payload
//! implements. `StreamEvent` is implemented by the closed event enum of a
//! decider and maps each variant to and from its stored `(kind, bytes)` pair.
//!
//! The `kind` string is part of the persisted format: once events with a given
//! kind have been written, renaming it is a breaking schema change.

use crate::codec::Codec;

/// Marker trait for event payloads that can be persisted in a stream.
///
/// Each event carries a unique [`Self::KIND`] identifier so a reader can
/// route stored bytes back to the correct variant.
pub trait DomainEvent {
    const KIND: &'static str;
}

/// Event in its stored representation: a stable kind tag plus the payload
/// bytes produced by a [`Codec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedEvent {
    pub kind: String,
    pub data: Vec<u8>,
}

/// Closed sum type of the events a decider folds.
///
/// ```ignore
/// impl StreamEvent for CartEvent {
///     const EVENT_KINDS: &'static [&'static str] = &[ItemAdded::KIND];
///
///     fn kind(&self) -> &'static str {
///         match self {
///             Self::ItemAdded(_) => ItemAdded::KIND,
///         }
///     }
///
///     fn encode<C: Codec>(&self, codec: &C) -> Result<EncodedEvent, C::Error> {
///         match self {
///             Self::ItemAdded(e) => encode_payload(codec, e),
///         }
///     }
///
///     fn try_decode<C: Codec>(kind: &str, data: &[u8], codec: &C) -> Result<Option<Self>, C::Error> {
///         match kind {
///             ItemAdded::KIND => codec.deserialize(data).map(Self::ItemAdded).map(Some),
///             _ => Ok(None),
///         }
///     }
/// }
/// ```
pub trait StreamEvent: Sized {
    /// Every kind this sum type can decode.
    const EVENT_KINDS: &'static [&'static str];

    /// The stored kind tag of this variant.
    fn kind(&self) -> &'static str;

    /// Encode this event into its stored representation.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the payload cannot be serialized.
    fn encode<C: Codec>(&self, codec: &C) -> Result<EncodedEvent, C::Error>;

    /// Decode a stored event.
    ///
    /// Returns `Ok(None)` for kinds this type does not know, so streams
    /// written by newer code (with additional event kinds) remain readable.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the kind is known but the payload does not
    /// deserialize. Payloads are never coerced.
    fn try_decode<C: Codec>(kind: &str, data: &[u8], codec: &C) -> Result<Option<Self>, C::Error>;
}

/// Encode a single payload under its [`DomainEvent::KIND`].
///
/// # Errors
///
/// Returns a codec error if the payload cannot be serialized.
pub fn encode_payload<C, E>(codec: &C, payload: &E) -> Result<EncodedEvent, C::Error>
where
    C: Codec,
    E: DomainEvent + serde::Serialize,
{
    Ok(EncodedEvent {
        kind: E::KIND.to_string(),
        data: codec.serialize(payload)?,
    })
}
