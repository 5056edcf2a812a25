//! Error type shared by both priority containers.

use thiserror::Error;

/// Errors surfaced by `OrderedPriorityMap` and `PriorityExtractionQueue`.
///
/// Every variant is a contract violation reported to the caller; nothing is
/// retried internally and a failing operation leaves the container unchanged.
#[derive(Error, Debug)]
pub enum PriorityError {
    /// The referenced key is not present in the map.
    #[error("item not found")]
    NotFound,

    /// No live entries remain in the queue's heap.
    #[error("cannot extract from an empty priority queue")]
    EmptyQueue,

    /// The priority cannot be represented as a signed 64-bit integer.
    #[error("invalid priority: {value} is not representable as i64")]
    InvalidPriority {
        /// Textual form of the rejected value
        value: String,
    },

    /// A serialized queue could not be decoded or encoded.
    #[error("queue blob error: {0}")]
    Blob(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PriorityError>;
