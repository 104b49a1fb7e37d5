//! Shared test fixtures
//!
//! Builds the application over in-memory repositories and drives it with
//! `tower::ServiceExt::oneshot`, so no database or socket is needed.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use taskboard::backend::annotator::changes::MemoryChangeLog;
use taskboard::backend::annotator::engine::AutoAnnotator;
use taskboard::backend::annotator::templates::StaticTemplateCatalog;
use taskboard::backend::conversation::repository::MemoryConversationRepository;
use taskboard::backend::conversation::store::ConversationStore;
use taskboard::backend::realtime::registry::RealtimeState;
use taskboard::backend::routes::router::create_router;
use taskboard::backend::server::state::AppState;
use tower::ServiceExt;

/// Build the application state over in-memory repositories.
pub fn test_state() -> AppState {
    let store = ConversationStore::new(
        Arc::new(MemoryConversationRepository::new()),
        Duration::from_secs(5),
    );
    let realtime = RealtimeState::new();
    let change_log = Arc::new(MemoryChangeLog::new());
    let annotator = Arc::new(AutoAnnotator::new(
        store.clone(),
        realtime.clone(),
        Arc::new(StaticTemplateCatalog::builtin()),
        change_log.clone(),
        change_log,
    ));
    AppState {
        store,
        realtime,
        annotator,
        db_pool: None,
    }
}

/// The application router plus the state behind it, for tests that poke
/// the registry or store directly.
pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    (create_router(state.clone()), state)
}

/// Send one request through the router.
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

/// POST a JSON body as the given user.
pub fn post_json(uri: &str, user: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// GET as the given user.
pub fn get_as(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user", user);
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
