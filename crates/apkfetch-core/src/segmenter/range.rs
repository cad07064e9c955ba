//! ByteRange type, worker budget and range planning.

use std::fmt;

/// A single byte range: [start, end] (inclusive on both sides).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "empty byte range {}-{}", start, end);
        Self { start, end }
    }

    /// Number of bytes covered by this range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// Range spec without the unit, as libcurl expects it: `start-end`.
    pub(crate) fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Thread budget for a machine with `parallelism` hardware threads:
/// half of them from 4 upward, all of them below that. Never less than 1.
pub fn worker_budget(parallelism: usize) -> usize {
    let budget = if parallelism >= 4 {
        parallelism / 2
    } else {
        parallelism
    };
    budget.max(1)
}

/// Number of range workers for a resource of `total_size` bytes.
///
/// Starts from `worker_budget(parallelism)`, applies the optional configured
/// cap, and never exceeds `total_size` so every range holds at least one byte.
pub fn plan_worker_count(parallelism: usize, cap: Option<usize>, total_size: u64) -> usize {
    let mut n = worker_budget(parallelism);
    if let Some(cap) = cap {
        n = n.min(cap.max(1));
    }
    if total_size > 0 && (total_size as u128) < n as u128 {
        n = total_size as usize;
    }
    n
}

/// Splits [0, total_size-1] into `workers` contiguous ranges of
/// `total_size / workers` bytes. The last range runs to `total_size - 1`
/// and absorbs the remainder.
///
/// Returns an empty plan if `total_size` or `workers` is 0. `workers` is
/// clamped to `total_size`.
pub fn plan_ranges(total_size: u64, workers: usize) -> Vec<ByteRange> {
    if total_size == 0 || workers == 0 {
        return Vec::new();
    }

    let workers = (workers as u64).min(total_size);
    let chunk = total_size / workers;

    let mut out = Vec::with_capacity(workers as usize);
    for i in 0..workers {
        let start = i * chunk;
        let end = if i + 1 < workers {
            (i + 1) * chunk - 1
        } else {
            total_size - 1
        };
        out.push(ByteRange::new(start, end));
    }
    out
}
