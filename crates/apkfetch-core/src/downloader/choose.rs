//! Strategy selection from the probe result.

use crate::probe::ContentProbe;
use crate::segmenter::plan_worker_count;

/// How a download is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One streamed GET; `expected_len` is the probed size when known.
    Sequential { expected_len: Option<u64> },
    /// `workers` concurrent ranged GETs over `total_size` bytes.
    Partitioned { total_size: u64, workers: usize },
}

impl Strategy {
    /// Partitioned when the probe reported a size and range support, sequential otherwise
    /// (including when there was no probe at all).
    pub fn select(probe: Option<&ContentProbe>, parallelism: usize, max_workers: Option<usize>) -> Self {
        match probe {
            Some(p) if p.can_partition() => Strategy::Partitioned {
                total_size: p.total_size,
                workers: plan_worker_count(parallelism, max_workers, p.total_size),
            },
            _ => Strategy::Sequential {
                expected_len: probe.map(|p| p.total_size).filter(|n| *n > 0),
            },
        }
    }

    pub fn is_partitioned(&self) -> bool {
        matches!(self, Strategy::Partitioned { .. })
    }
}
