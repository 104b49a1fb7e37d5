//! Identity Extraction
//!
//! The identity collaborator authenticates requests upstream and forwards
//! the acting user's display name in the `x-user` header. This module only
//! consumes that already-authenticated string; there is no token handling
//! here.

use crate::backend::error::BackendError;
use axum::http::{HeaderMap, StatusCode};

/// Header carrying the authenticated user's display name.
pub const USER_HEADER: &str = "x-user";

/// Extract the acting user from request headers.
///
/// # Errors
///
/// * `401 Unauthorized` - if the header is missing, empty, or not valid
///   UTF-8
pub fn current_user(headers: &HeaderMap) -> Result<String, BackendError> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            BackendError::handler(
                StatusCode::UNAUTHORIZED,
                "missing or empty x-user identity header",
            )
        })
}
