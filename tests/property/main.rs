//! Property-based tests
//!
//! Uses proptest to generate random threads and message content and verify
//! the structural invariants of mutations and the header codec.
