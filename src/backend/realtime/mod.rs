//! Realtime Fan-out
//!
//! Live delivery of conversation updates to connected viewers:
//!
//! - **`registry`** - per-task broadcast channels, connection/presence
//!   tracking, and per-user unread counters
//! - **`socket`** - the WebSocket transport and its INIT subscribe protocol
//! - **`handlers`** - presence and unread read models over HTTP
//!
//! Delivery is at-most-once and best-effort. A disconnected client misses
//! live updates and reconciles by fetching the full conversation when it
//! next opens the task; no replay buffer is kept.

pub mod handlers;
pub mod registry;
pub mod socket;

pub use registry::RealtimeState;
