//! Field-Change Intake
//!
//! HTTP entry point for task field-change batches. The task CRUD service
//! posts here as a side effect of every edit; the annotator decides which
//! deltas produce conversation messages.

use crate::backend::annotator::changes::FieldChange;
use crate::backend::annotator::engine::AutoAnnotator;
use crate::backend::error::BackendError;
use crate::backend::middleware::identity::current_user;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request body for POST /api/tasks/{task_id}/changes.
#[derive(Debug, Deserialize)]
pub struct ChangeBatchRequest {
    pub changes: Vec<FieldChange>,
}

/// Response body: how many annotation messages the batch produced.
#[derive(Debug, Serialize)]
pub struct ChangeBatchResponse {
    pub ok: bool,
    pub appended: usize,
}

/// Handle POST /api/tasks/{task_id}/changes.
///
/// # Errors
///
/// * `401 Unauthorized` - missing identity header
/// * `503`/`504` - the durable store failed or timed out
pub async fn post_changes(
    State(annotator): State<Arc<AutoAnnotator>>,
    Path(task_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ChangeBatchRequest>,
) -> Result<Json<ChangeBatchResponse>, BackendError> {
    let user = current_user(&headers)?;
    let appended = annotator.annotate(task_id, &user, request.changes).await?;
    Ok(Json(ChangeBatchResponse { ok: true, appended }))
}
