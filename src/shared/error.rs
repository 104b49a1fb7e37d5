//! Conversation Error Taxonomy
//!
//! Failure cases of the conversation engine, shared so clients can match on
//! the machine-readable `reason` string the server returns alongside HTTP
//! status codes.
//!
//! - `InvalidPath` - a reply/edit addressed a node that no longer resolves
//! - `MalformedContent` - empty content submitted for a mutation
//! - `Storage` - the durable store read/write failed
//! - `StorageTimeout` - the durable store did not answer within the bound

use thiserror::Error;

/// Errors the conversation engine reports to callers.
///
/// A failed operation never partially applies: the thread the caller last
/// fetched is still the canonical one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// A mutation targeted a path that does not resolve in the current
    /// tree. Typically stale client state; the caller should refetch and
    /// retry deliberately, never automatically.
    #[error("invalid path {path:?}")]
    InvalidPath {
        /// The path that failed to resolve.
        path: Vec<usize>,
    },

    /// Empty or blank content submitted for append/reply/edit. A
    /// precondition violation, rejected before the tree is touched.
    #[error("malformed content: {message}")]
    MalformedContent {
        /// Human-readable detail.
        message: String,
    },

    /// The durable store failed a read or write.
    #[error("storage error: {message}")]
    Storage {
        /// Human-readable detail.
        message: String,
    },

    /// The durable store did not respond within the configured bound.
    #[error("storage operation timed out after {timeout_ms}ms")]
    StorageTimeout {
        /// The bound that was exceeded, in milliseconds.
        timeout_ms: u64,
    },
}

impl ConversationError {
    /// Create an invalid-path error.
    pub fn invalid_path(path: &[usize]) -> Self {
        Self::InvalidPath {
            path: path.to_vec(),
        }
    }

    /// Create a malformed-content error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContent {
            message: message.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Machine-readable reason string carried in failure responses.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "invalid_path",
            Self::MalformedContent { .. } => "malformed_content",
            Self::Storage { .. } => "storage_unavailable",
            Self::StorageTimeout { .. } => "storage_timeout",
        }
    }
}
