//! Shared helpers.
//!
//! - [`http`] - `reqwest` client construction and failure classification
//! - [`retry`] - bounded, transient-only retry for transport calls

pub mod http;
pub mod retry;

pub use retry::{RetryPolicy, with_retry};
