//! Stream naming.
//!
//! A stream is named `"{category}-{id}"`. The category identifies the
//! decider type (e.g. `"Aggregate"`), the id the instance. Because the first
//! `-` separates the two parts, a category may not contain one; ids may.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Error returned when a stream name cannot be built or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamNameError {
    #[error("stream category must not be empty")]
    EmptyCategory,
    #[error("stream category `{0}` must not contain '-'")]
    CategoryContainsSeparator(String),
    #[error("stream id must not be empty")]
    EmptyId,
    #[error("stream name `{0}` has no '-' separating category and id")]
    MissingSeparator(String),
}

/// Validated name of an event stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamName {
    name: String,
    separator: usize,
}

impl StreamName {
    /// Build a stream name from a category and an instance id.
    ///
    /// # Errors
    ///
    /// Returns [`StreamNameError`] if either part is empty or the category
    /// contains `-`.
    pub fn new(category: &str, id: impl fmt::Display) -> Result<Self, StreamNameError> {
        if category.is_empty() {
            return Err(StreamNameError::EmptyCategory);
        }
        if category.contains('-') {
            return Err(StreamNameError::CategoryContainsSeparator(
                category.to_string(),
            ));
        }
        let id = id.to_string();
        if id.is_empty() {
            return Err(StreamNameError::EmptyId);
        }
        Ok(Self {
            name: format!("{category}-{id}"),
            separator: category.len(),
        })
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.name[..self.separator]
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.name[self.separator + 1..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for StreamName {
    type Err = StreamNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, id) = s
            .split_once('-')
            .ok_or_else(|| StreamNameError::MissingSeparator(s.to_string()))?;
        Self::new(category, id)
    }
}

impl AsRef<str> for StreamName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
