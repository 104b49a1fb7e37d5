//! Request Middleware
//!
//! Cross-cutting request concerns. Currently just identity extraction;
//! authentication itself happens upstream of this service.

pub mod identity;
