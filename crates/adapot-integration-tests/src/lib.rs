//! Integration test crate for adapot.
//!
//! This crate has no library code. It only contains integration tests
//! that settle epoch ranges end to end, across every workspace crate.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p adapot-integration-tests
//! ```
