//! Conversation HTTP Handlers
//!
//! The read/write surface the UI consumes. Reads return the canonical
//! document; writes follow one pipeline: extract identity, validate the
//! body, run the pure mutation through the store's serialized cycle,
//! broadcast the persisted result. A mutation that fails leaves the stored
//! thread exactly as the client last fetched it.
//!
//! The UI sends only the human-authored body text; the server owns the
//! header prefix, the tree shape, and the ordering rules.

use crate::backend::conversation::mutator;
use crate::backend::conversation::store::ConversationStore;
use crate::backend::error::BackendError;
use crate::backend::middleware::identity::current_user;
use crate::backend::realtime::registry::RealtimeState;
use crate::shared::error::ConversationError;
use crate::shared::event::ThreadUpdate;
use crate::shared::prefix::{encode_header, sender_tag, HeaderStamp};
use crate::shared::thread::{ConversationDocument, ThreadMessage};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

/// Mutation request body for POST /api/tasks/{task_id}/conversation.
///
/// - no `path` - append a new top-level message
/// - `path`, `isEdit: false` - reply to the node at `path`
/// - `path`, `isEdit: true` - replace the content of the node at `path`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertConversationRequest {
    /// Human-authored body text, without the header prefix.
    pub content: String,
    /// Target node for reply/edit; absent for append.
    #[serde(default)]
    pub path: Option<Vec<usize>>,
    /// Whether this is an edit of the target node rather than a reply.
    #[serde(default)]
    pub is_edit: bool,
}

/// Handle GET /api/tasks/{task_id}/conversation.
///
/// Always answers with a document; a task with no conversation yet yields
/// an empty thread.
pub async fn get_conversation(
    State(store): State<ConversationStore>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<ConversationDocument>, BackendError> {
    let document = store.get(task_id).await?;
    Ok(Json(document))
}

/// Handle POST /api/tasks/{task_id}/conversation.
///
/// # Errors
///
/// * `400 Bad Request` - blank content, or an edit without a path
/// * `401 Unauthorized` - missing identity header
/// * `409 Conflict` - the path no longer resolves (stale client state);
///   nothing was persisted and the client should refetch
/// * `503`/`504` - the durable store failed or timed out
pub async fn post_conversation(
    State(store): State<ConversationStore>,
    State(realtime): State<RealtimeState>,
    Path(task_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpsertConversationRequest>,
) -> Result<Json<ConversationDocument>, BackendError> {
    let user = current_user(&headers)?;

    // Reject blank bodies before prefixing; the header alone would
    // otherwise smuggle an empty message past the mutator's check.
    if request.content.trim().is_empty() {
        return Err(ConversationError::malformed("content must not be empty").into());
    }

    let content = format!(
        "{}{}",
        encode_header(&sender_tag(&user), &HeaderStamp::now()),
        request.content
    );

    let document = match (&request.path, request.is_edit) {
        (None, false) => {
            tracing::info!("[Conversation] {} appends to task {}", user, task_id);
            store
                .mutate(task_id, move |thread| {
                    mutator::append(&thread, ThreadMessage::new(content))
                })
                .await?
        }
        (Some(path), false) => {
            tracing::info!(
                "[Conversation] {} replies at {:?} on task {}",
                user,
                path,
                task_id
            );
            let path = path.clone();
            store
                .mutate(task_id, move |thread| {
                    mutator::reply(&thread, &path, ThreadMessage::new(content))
                })
                .await?
        }
        (Some(path), true) => {
            tracing::info!(
                "[Conversation] {} edits {:?} on task {}",
                user,
                path,
                task_id
            );
            let path = path.clone();
            store
                .mutate(task_id, move |thread| mutator::edit(&thread, &path, &content))
                .await?
        }
        (None, true) => {
            return Err(BackendError::handler(
                StatusCode::BAD_REQUEST,
                "edit requires a path",
            ));
        }
    };

    // Persisted; fan out to live viewers. Delivery failures never fail the
    // mutation.
    realtime.broadcast(
        task_id,
        ThreadUpdate::new(task_id, document.thread.clone(), user),
    );

    Ok(Json(document))
}

/// Query parameters for GET /api/conversations/recent.
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    20
}

/// Handle GET /api/conversations/recent: conversations ordered by last
/// activity, most recent first.
pub async fn recent_conversations(
    State(store): State<ConversationStore>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<ConversationDocument>>, BackendError> {
    let documents = store.recent(query.limit.clamp(1, 100)).await?;
    Ok(Json(documents))
}
