//! Server Initialization
//!
//! Assembles the application: pick the storage backend, build the store,
//! realtime registry, and annotator, wire the router, and start the
//! periodic channel cleanup task.

use crate::backend::annotator::changes::{ChangeLog, MemoryChangeLog, PgChangeLog, TaskDirectory};
use crate::backend::annotator::engine::AutoAnnotator;
use crate::backend::annotator::templates::StaticTemplateCatalog;
use crate::backend::conversation::repository::{
    ConversationRepository, MemoryConversationRepository, PgConversationRepository,
};
use crate::backend::conversation::store::ConversationStore;
use crate::backend::realtime::registry::RealtimeState;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, storage_timeout};
use crate::backend::server::state::AppState;
use axum::Router;
use std::sync::Arc;

/// Interval between sweeps dropping subscriberless broadcast channels.
const CHANNEL_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Create and configure the Axum application.
///
/// With a reachable database the conversation documents and change log
/// live in Postgres; otherwise everything runs in memory and state is lost
/// on restart.
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing taskboard server");

    let db_pool = load_database().await;
    let timeout = storage_timeout();

    let repository: Arc<dyn ConversationRepository> = match &db_pool {
        Some(pool) => Arc::new(PgConversationRepository::new(pool.clone())),
        None => Arc::new(MemoryConversationRepository::new()),
    };
    let (change_log, directory): (Arc<dyn ChangeLog>, Arc<dyn TaskDirectory>) = match &db_pool {
        Some(pool) => {
            let log = Arc::new(PgChangeLog::new(pool.clone()));
            (log.clone(), log)
        }
        None => {
            let log = Arc::new(MemoryChangeLog::new());
            (log.clone(), log)
        }
    };

    let store = ConversationStore::new(repository, timeout);
    let realtime = RealtimeState::new();
    let annotator = Arc::new(AutoAnnotator::new(
        store.clone(),
        realtime.clone(),
        Arc::new(StaticTemplateCatalog::builtin()),
        directory,
        change_log,
    ));

    let app_state = AppState {
        store,
        realtime: realtime.clone(),
        annotator,
        db_pool,
    };

    // Abandoned tasks would otherwise accumulate broadcast senders and
    // per-task locks forever.
    let sweep_store = app_state.store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            CHANNEL_CLEANUP_INTERVAL_SECS,
        ));
        loop {
            interval.tick().await;
            realtime.cleanup_inactive_channels();
            sweep_store.cleanup_idle_locks();
            tracing::debug!("Cleaned up inactive broadcast channels and idle task locks");
        }
    });

    tracing::info!("Router configured");
    create_router(app_state)
}
