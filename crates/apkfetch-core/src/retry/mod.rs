//! Per-range retry and backoff policy.
//!
//! Error classification (timeouts, throttling, connection failures, short
//! bodies) and exponential backoff decisions for range workers. Only used when
//! the configuration opts in; otherwise a failed range fails the download.

mod classify;
mod policy;
mod run;

pub use classify::classify;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
