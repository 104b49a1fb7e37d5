//! Backend Server
//!
//! The Axum server and everything behind it: the conversation mutation and
//! persistence layer, realtime fan-out over WebSocket, the automatic change
//! annotator, HTTP error mapping, routing, and server wiring.

pub mod annotator;
pub mod conversation;
pub mod error;
pub mod middleware;
pub mod realtime;
pub mod routes;
pub mod server;
