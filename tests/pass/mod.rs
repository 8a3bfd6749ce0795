//! General pass tests
//!
//! End-to-end runs against in-memory collaborators:
//! - Priority ordering of commits
//! - Cancellation, abort and restart
//! - Skipping ancestors of errors
//! - Problem reporting and per-document flags
//! - Injected documents

pub mod tests_injected;
pub mod tests_priority;
pub mod tests_skip;
