//! Error-to-Response Conversion
//!
//! Every failed operation answers with one structured body:
//!
//! ```json
//! {"ok": false, "reason": "invalid_path", "message": "invalid path [0, 3]"}
//! ```
//!
//! so clients can roll back optimistic updates and show a single failure
//! notice without parsing prose.

use super::types::BackendError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// The structured failure body.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub ok: bool,
    pub reason: &'static str,
    pub message: String,
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Server] {}", self);
        } else {
            tracing::warn!("[Server] {}", self);
        }
        let body = FailureBody {
            ok: false,
            reason: self.reason(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
