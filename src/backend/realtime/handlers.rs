//! Presence and Unread Read Models
//!
//! Thin HTTP views over the realtime registry: who currently holds a live
//! connection, and how many updates each task accumulated while the
//! requesting user was looking elsewhere.

use crate::backend::error::BackendError;
use crate::backend::middleware::identity::current_user;
use crate::backend::realtime::registry::RealtimeState;
use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Response body for GET /api/presence.
#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    /// `username -> online`. Users without a live connection are absent.
    pub online: HashMap<String, bool>,
}

/// Handle GET /api/presence.
pub async fn get_presence(State(realtime): State<RealtimeState>) -> Json<PresenceResponse> {
    Json(PresenceResponse {
        online: realtime.presence(),
    })
}

/// Response body for GET /api/unread.
#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    /// `task_id -> count` for the requesting user.
    pub unread: HashMap<Uuid, u64>,
}

/// Handle GET /api/unread for the authenticated user.
pub async fn get_unread(
    State(realtime): State<RealtimeState>,
    headers: HeaderMap,
) -> Result<Json<UnreadResponse>, BackendError> {
    let username = current_user(&headers)?;
    Ok(Json(UnreadResponse {
        unread: realtime.unread_for(&username),
    }))
}
