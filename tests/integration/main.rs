//! Integration tests
//!
//! End-to-end flows over the in-memory repositories: the HTTP surface,
//! the annotator pipeline, and the realtime fan-out.

mod common;

mod annotator_flow;
mod conversation_flow;
mod realtime_flow;
mod socket_flow;
