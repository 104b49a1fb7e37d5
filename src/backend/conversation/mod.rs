//! Conversation Engine
//!
//! The task conversation subsystem:
//!
//! - **`mutator`** - pure tree transformations (append, reply, edit) with
//!   the relocate-to-bottom ordering rule
//! - **`repository`** - the durable-store seam (Postgres and in-memory)
//! - **`store`** - per-task document load/persist with serialized
//!   read-modify-write cycles
//! - **`handlers`** - the HTTP read/write surface

pub mod handlers;
pub mod mutator;
pub mod repository;
pub mod store;

pub use repository::{ConversationRepository, MemoryConversationRepository, PgConversationRepository};
pub use store::ConversationStore;
