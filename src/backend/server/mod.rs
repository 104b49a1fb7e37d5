//! Server Wiring
//!
//! - **`config`** - environment-driven configuration (database, port,
//!   storage timeout)
//! - **`state`** - the `AppState` container and its `FromRef` extractions
//! - **`init`** - application assembly: repositories, store, realtime,
//!   annotator, router

pub mod config;
pub mod init;
pub mod state;
