//! Router Configuration
//!
//! Combines the realtime socket endpoint and the API routes into the
//! application router. Unknown routes fall through to a plain 404.

use crate::backend::realtime::socket::handle_socket_upgrade;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use axum::{routing::get, Router};
use tower_http::services::ServeDir;

/// Create the Axum router with all routes configured.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/ws", get(handle_socket_upgrade));

    let router = configure_api_routes(router);

    // Static assets for the task UI
    let router = router.nest_service("/static", ServeDir::new("public"));

    let router = router.fallback(|| async { "404 Not Found" });

    router.with_state(app_state)
}
