//! Backend Error Types
//!
//! Errors raised by HTTP handlers. Domain failures from the conversation
//! engine wrap transparently; handler-local problems (bad request bodies,
//! missing identity) carry their own status code.

use crate::shared::error::ConversationError;
use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status (missing identity header,
    /// unparseable request, and the like).
    #[error("handler error: {message}")]
    Handler {
        /// HTTP status code for this error.
        status: StatusCode,
        /// Human-readable error message.
        message: String,
    },

    /// Domain failure from the conversation engine.
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    /// Serialization failure building a response.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a handler error with a status code.
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// The HTTP status code for this error.
    ///
    /// Domain mapping: an unresolvable path is a conflict with the current
    /// tree (409), malformed content is the caller's fault (400), and
    /// storage trouble is unavailability (503) or a timeout (504).
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Handler { status, .. } => *status,
            Self::Conversation(err) => match err {
                ConversationError::InvalidPath { .. } => StatusCode::CONFLICT,
                ConversationError::MalformedContent { .. } => StatusCode::BAD_REQUEST,
                ConversationError::Storage { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ConversationError::StorageTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            },
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable reason string for the response body.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Handler { .. } => "bad_request",
            Self::Conversation(err) => err.reason(),
            Self::Serialization(_) => "internal_error",
        }
    }
}
