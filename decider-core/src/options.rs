//! Stream access options.
//!
//! [`StreamOptions`] is plain serde data so a host can embed it in its own
//! configuration file:
//!
//! ```toml
//! [streams]
//! max_attempts = 5
//! batch_size = 200
//! snapshots = { every_n_events = 100 }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::SnapshotPolicy;

/// Error returned when [`StreamOptions`] fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,
}

/// How streams are read and written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Attempts of the read, decide, append cycle before a concurrency
    /// conflict is surfaced to the caller.
    pub max_attempts: usize,
    /// Events requested per backward read.
    pub batch_size: usize,
    /// When to append a snapshot event.
    pub snapshots: SnapshotPolicy,
}

impl StreamOptions {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
    pub const DEFAULT_BATCH_SIZE: usize = 500;

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub const fn with_snapshots(mut self, snapshots: SnapshotPolicy) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// # Errors
    ///
    /// Returns [`OptionsError`] if `max_attempts` or `batch_size` is zero.
    pub const fn validate(&self) -> Result<(), OptionsError> {
        if self.max_attempts == 0 {
            return Err(OptionsError::ZeroAttempts);
        }
        if self.batch_size == 0 {
            return Err(OptionsError::ZeroBatchSize);
        }
        Ok(())
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            snapshots: SnapshotPolicy::Never,
        }
    }
}
