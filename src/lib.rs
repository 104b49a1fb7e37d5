//! Taskboard conversation engine
//!
//! Library crate backing the `taskboard-server` binary. The `shared` module
//! holds the pure data types exchanged with clients (thread tree, header
//! codec, realtime events); the `backend` module holds the Axum server, the
//! conversation mutation/persistence layer, the realtime fan-out, and the
//! automatic change annotator.

pub mod backend;
pub mod shared;
