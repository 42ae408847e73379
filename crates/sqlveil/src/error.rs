//! Error types for sqlveil.
//!
//! Tokenization and de-anonymization never fail — malformed input degrades
//! into `Unknown` tokens or passes through. The errors here cover the two
//! remaining boundaries: caller contract violations on the mapping engine,
//! and mapping persistence.

use crate::tokens::TokenCategory;
use thiserror::Error;

/// The result type for sqlveil operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A placeholder was requested for a category outside the anonymizable
    /// set. This is a programming error in the caller, not a data problem.
    #[error("no placeholder prefix for token category {0:?}")]
    UnsupportedCategory(TokenCategory),

    /// The mapping state could not be serialized for persistence.
    #[error("failed to serialize mapping state: {0}")]
    SerializeMappings(#[source] serde_json::Error),

    /// Persisted mapping data failed to parse or violated a state
    /// invariant. Never silently replaced by an empty state — the caller
    /// decides whether to proceed empty or abort.
    #[error("mapping data is corrupt: {0}")]
    CorruptMappings(String),
}

impl Error {
    pub fn unsupported_category(category: TokenCategory) -> Self {
        Error::UnsupportedCategory(category)
    }

    pub fn serialize_mappings(err: serde_json::Error) -> Self {
        Error::SerializeMappings(err)
    }

    pub fn corrupt_mappings(message: impl Into<String>) -> Self {
        Error::CorruptMappings(message.into())
    }
}
