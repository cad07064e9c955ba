//! Shared transfer progress (bytes done, total, rate, ETA).
//!
//! Range workers add to one atomic counter; any UI layer reads it through
//! `snapshot()` and computes rate and ETA from the returned stats.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Sentinel stored in `total` while the size is unknown.
const UNKNOWN_TOTAL: u64 = u64::MAX;

#[derive(Debug)]
struct Inner {
    bytes_done: AtomicU64,
    total: AtomicU64,
    started: Instant,
}

/// Clone-able handle to the progress of one download.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    inner: Arc<Inner>,
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferProgress {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                bytes_done: AtomicU64::new(0),
                total: AtomicU64::new(UNKNOWN_TOTAL),
                started: Instant::now(),
            }),
        }
    }

    /// Record the expected total size once it is known.
    pub fn set_total(&self, total: u64) {
        self.inner.total.store(total, Ordering::Relaxed);
    }

    /// Add `n` freshly transferred bytes.
    pub fn add(&self, n: u64) {
        self.inner.bytes_done.fetch_add(n, Ordering::Relaxed);
    }

    /// Take back bytes reported by a transfer attempt that is about to be retried.
    pub fn rewind(&self, n: u64) {
        let _ = self
            .inner
            .bytes_done
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| {
                Some(cur.saturating_sub(n))
            });
    }

    /// Bytes transferred so far.
    pub fn bytes_done(&self) -> u64 {
        self.inner.bytes_done.load(Ordering::Relaxed)
    }

    /// Read-only view of the current progress.
    pub fn snapshot(&self) -> ProgressStats {
        let total = self.inner.total.load(Ordering::Relaxed);
        ProgressStats {
            bytes_done: self.bytes_done(),
            total_bytes: (total != UNKNOWN_TOTAL).then_some(total),
            elapsed_secs: self.inner.started.elapsed().as_secs_f64(),
        }
    }
}

/// Snapshot of download progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStats {
    /// Bytes written so far.
    pub bytes_done: u64,
    /// Total size in bytes, when the server told us.
    pub total_bytes: Option<u64>,
    /// Elapsed time since the download started (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Download rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if the total is unknown or nothing moved yet).
    pub fn eta_secs(&self) -> Option<f64> {
        let total = self.total_bytes?;
        let remaining = total.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0], if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total_bytes?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.bytes_done as f64 / total as f64).min(1.0))
    }
}
