//! API Routes
//!
//! The `/api` surface:
//!
//! - `GET  /api/tasks/{task_id}/conversation` - canonical document
//! - `POST /api/tasks/{task_id}/conversation` - append / reply / edit
//! - `POST /api/tasks/{task_id}/changes` - field-change batch intake
//! - `GET  /api/conversations/recent` - recency-sorted listing
//! - `GET  /api/presence` - who holds a live connection
//! - `GET  /api/unread` - unread counters for the requesting user

use crate::backend::annotator::handlers::post_changes;
use crate::backend::conversation::handlers::{
    get_conversation, post_conversation, recent_conversations,
};
use crate::backend::realtime::handlers::{get_presence, get_unread};
use crate::backend::server::state::AppState;
use axum::{routing::get, routing::post, Router};

/// Add the API routes to the router.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/tasks/{task_id}/conversation",
            get(get_conversation).post(post_conversation),
        )
        .route("/api/tasks/{task_id}/changes", post(post_changes))
        .route("/api/conversations/recent", get(recent_conversations))
        .route("/api/presence", get(get_presence))
        .route("/api/unread", get(get_unread))
}
