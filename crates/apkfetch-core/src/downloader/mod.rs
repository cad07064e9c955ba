//! Partitioned downloader.
//!
//! Probes the resource, then either streams it with one GET or splits it into
//! contiguous byte ranges fetched by concurrent workers into a preallocated
//! temp file. The temp file is renamed onto the destination only after the
//! whole transfer succeeded.

mod choose;
mod run;
mod segment;
mod single;

pub use choose::Strategy;

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::FetchConfig;
use crate::error::DownloadError;
use crate::http::{CurlClient, HttpClient};
use crate::probe;
use crate::progress::TransferProgress;
use crate::retry::RetryPolicy;
use crate::segmenter::plan_ranges;
use crate::storage::StorageWriter;

/// Where to fetch from and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    url: String,
    destination: PathBuf,
}

impl DownloadTarget {
    /// Validates that `url` is an absolute http(s) URL.
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Result<Self, DownloadError> {
        let url = url.into();
        let invalid = |reason: String| DownloadError::InvalidTarget {
            url: url.clone(),
            reason,
        };
        if url.trim().is_empty() {
            return Err(invalid("empty URL".to_string()));
        }
        let parsed = url::Url::parse(&url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", parsed.scheme())));
        }
        Ok(Self {
            url,
            destination: destination.into(),
        })
    }

    /// Target for `file_name` inside `download_dir`.
    pub fn in_dir(
        url: impl Into<String>,
        download_dir: impl AsRef<Path>,
        file_name: &str,
    ) -> Result<Self, DownloadError> {
        Self::new(url, download_dir.as_ref().join(file_name))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// Summary of a finished download.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub bytes: u64,
    pub strategy: Strategy,
    pub elapsed: Duration,
}

/// Downloads single resources, picking sequential or partitioned transfer per call.
pub struct PartitionedDownloader<C = CurlClient> {
    client: C,
    probe_timeout: Duration,
    max_workers: Option<usize>,
    retry_policy: Option<RetryPolicy>,
    parallelism: usize,
}

impl PartitionedDownloader<CurlClient> {
    /// libcurl-backed downloader configured from `cfg`.
    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self::with_client(CurlClient::from_config(cfg), cfg)
    }
}

impl<C: HttpClient> PartitionedDownloader<C> {
    pub fn with_client(client: C, cfg: &FetchConfig) -> Self {
        Self {
            client,
            probe_timeout: cfg.probe_timeout(),
            max_workers: cfg.max_workers,
            retry_policy: cfg.retry_policy(),
            parallelism: available_parallelism(),
        }
    }

    /// Override the detected hardware parallelism the worker budget is derived from.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Download `target`, reporting into a fresh progress handle.
    pub fn download(&self, target: &DownloadTarget) -> Result<DownloadOutcome, DownloadError> {
        self.download_with_progress(target, &TransferProgress::new())
    }

    /// Download `target`, adding transferred bytes to `progress`.
    pub fn download_with_progress(
        &self,
        target: &DownloadTarget,
        progress: &TransferProgress,
    ) -> Result<DownloadOutcome, DownloadError> {
        let started = Instant::now();
        let url = target.url();
        let dest = target.destination();

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| DownloadError::local_io("create directory", parent, e))?;
        }

        let probe = probe::probe(&self.client, url, self.probe_timeout);
        let strategy = Strategy::select(probe.as_ref(), self.parallelism, self.max_workers);
        tracing::info!(url, dest = %dest.display(), ?strategy, "starting download");

        let result = match strategy {
            Strategy::Sequential { expected_len } => {
                single::download_sequential(&self.client, url, dest, expected_len, progress)
            }
            Strategy::Partitioned { total_size, workers } => run::download_partitioned(
                &self.client,
                url,
                dest,
                total_size,
                &plan_ranges(total_size, workers),
                self.retry_policy.as_ref(),
                progress,
            ),
        };

        match result {
            Ok(bytes) => {
                let elapsed = started.elapsed();
                tracing::info!(
                    dest = %dest.display(),
                    bytes,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "download complete"
                );
                Ok(DownloadOutcome {
                    path: dest.to_path_buf(),
                    bytes,
                    strategy,
                    elapsed,
                })
            }
            Err(e) => {
                tracing::error!(url, stage = e.stage(), "download failed: {}", e);
                Err(e)
            }
        }
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Sync the temp file and rename it onto `final_path`.
fn commit(writer: StorageWriter, final_path: &Path) -> Result<(), DownloadError> {
    let temp_path = writer.temp_path().to_path_buf();
    if let Err(e) = writer.sync() {
        writer.discard();
        return Err(DownloadError::local_io("sync", &temp_path, e));
    }
    writer.finalize(final_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        DownloadError::local_io("rename", &temp_path, e)
    })
}
