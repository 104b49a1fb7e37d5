//! Backend Error Handling
//!
//! - **`types`** - the `BackendError` enum used by HTTP handlers
//! - **`conversion`** - mapping to HTTP responses with a structured
//!   `{ok: false, reason, message}` JSON body

pub mod conversion;
pub mod types;

pub use types::BackendError;
