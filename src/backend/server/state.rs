//! Application State
//!
//! The central state container for the Axum application. Every field is
//! cheap to clone and safe to share: the store and realtime registry hold
//! their own synchronization internally, and the annotator is behind an
//! `Arc`. The `FromRef` implementations let handlers extract just the part
//! they use instead of the whole `AppState`.

use crate::backend::annotator::engine::AutoAnnotator;
use crate::backend::conversation::store::ConversationStore;
use crate::backend::realtime::registry::RealtimeState;
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Per-task conversation document store.
    pub store: ConversationStore,
    /// Realtime fan-out registry (channels, presence, unread).
    pub realtime: RealtimeState,
    /// The field-change annotator.
    pub annotator: Arc<AutoAnnotator>,
    /// `None` when running on in-memory storage.
    pub db_pool: Option<PgPool>,
}

impl FromRef<AppState> for ConversationStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for RealtimeState {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.realtime.clone()
    }
}

impl FromRef<AppState> for Arc<AutoAnnotator> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.annotator.clone()
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
