//! Pure domain primitives.
//!
//! A decider is the pair of functions that define an aggregate's behaviour:
//! [`Decider::evolve`] folds events into state and [`Interpret::interpret`]
//! maps a command against that state to the events representing the decision.
//! Neither performs I/O; reading and appending streams is the job of
//! [`Stream`](crate::repository::Stream), so both can be unit tested with no
//! store at all.

use crate::event::StreamEvent;

/// State of an event-sourced aggregate, rebuilt by folding its events.
///
/// `evolve` must be total over the event enum. Matching exhaustively (no `_`
/// arm) means adding a variant fails to compile until every decider handles
/// it.
pub trait Decider: Clone + Send + Sync + Sized {
    /// Stream category, combined with an instance id to name a stream.
    const CATEGORY: &'static str;

    type Event: StreamEvent + Send + Sync;

    /// State before any event has been applied.
    fn initial() -> Self;

    /// Apply a single event, producing the next state.
    #[must_use]
    fn evolve(self, event: &Self::Event) -> Self;

    /// Apply `events` left to right, starting from a copy of `self`.
    ///
    /// `self` is left untouched.
    #[must_use]
    fn fold<'a, I>(&self, events: I) -> Self
    where
        I: IntoIterator<Item = &'a Self::Event>,
        Self::Event: 'a,
    {
        events.into_iter().fold(self.clone(), Self::evolve)
    }

    /// Whether `event` carries the complete state, so a reader scanning the
    /// stream backwards can stop there and fold forwards from
    /// [`Decider::initial`].
    fn is_origin(_event: &Self::Event) -> bool {
        false
    }

    /// Build an origin event embedding this state.
    ///
    /// Folding the returned event from [`Decider::initial`] must reproduce
    /// `self`. Deciders without snapshot events return `None`, and rolling
    /// snapshots are then never written for their streams.
    fn snapshot(&self) -> Option<Self::Event> {
        None
    }
}

/// Interpretation of a command against the current state.
///
/// Implementations must be deterministic and side-effect free: under
/// optimistic concurrency a conflicting append re-runs `interpret` against
/// fresher state. Returning no events means the command is already satisfied.
///
/// ```ignore
/// impl Interpret<AddItem> for Cart {
///     fn interpret(&self, command: &AddItem) -> Vec<Self::Event> {
///         if self.contains(&command.sku) {
///             return vec![];
///         }
///         vec![ItemAdded { sku: command.sku.clone() }.into()]
///     }
/// }
/// ```
pub trait Interpret<C>: Decider {
    fn interpret(&self, command: &C) -> Vec<Self::Event>;
}
