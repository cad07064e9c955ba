//! Range math and download planning.
//!
//! Derives the worker budget from available parallelism and splits a
//! resource into contiguous inclusive byte ranges, one per worker.

mod range;

pub use range::{plan_ranges, plan_worker_count, worker_budget, ByteRange};
