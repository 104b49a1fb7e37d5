//! Routing
//!
//! - **`router`** - top-level router assembly (websocket + API)
//! - **`api_routes`** - the `/api` surface

pub mod api_routes;
pub mod router;
