//! Command execution and queries for one resolved stream.

use crate::{
    decider::{Decider, Interpret},
    repository::{StoreExecuteError, StoreLoadError, Stream},
    store::EventStore,
};

/// Binds a resolved [`Stream`] to its decider's interpreter.
///
/// ```ignore
/// let handler = Handler::new(repository.resolve::<Cart>(name));
/// handler.execute(&AddItem { sku }).await?;
/// let count = handler.query(|cart| cart.items.len()).await?;
/// ```
pub struct Handler<'r, S, D> {
    stream: Stream<'r, S, D>,
}

impl<'r, S, D> Handler<'r, S, D>
where
    S: EventStore,
    D: Decider,
{
    #[must_use]
    pub const fn new(stream: Stream<'r, S, D>) -> Self {
        Self { stream }
    }

    #[must_use]
    pub const fn stream(&self) -> &Stream<'r, S, D> {
        &self.stream
    }

    /// Execute `command`, appending any events it decides on.
    ///
    /// A command already reflected in the state decides no events and
    /// succeeds without writing.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecuteError`](crate::repository::ExecuteError) if state
    /// cannot be rebuilt, events cannot be encoded or persisted, or
    /// concurrency conflicts outlast the configured attempts.
    pub async fn execute<C>(&self, command: &C) -> Result<(), StoreExecuteError<S>>
    where
        D: Interpret<C>,
    {
        self.stream
            .transact(|state| state.interpret(command))
            .await
    }

    /// Establish the present state of the stream and project from it.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`](crate::repository::LoadError) if state cannot
    /// be rebuilt.
    pub async fn query<T, P>(&self, projection: P) -> Result<T, StoreLoadError<S>>
    where
        P: FnOnce(&D) -> T,
    {
        self.stream.query(projection).await
    }
}
