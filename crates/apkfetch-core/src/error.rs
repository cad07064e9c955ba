//! Error types for transfers and whole downloads.
//!
//! `TransferError` is what one HTTP exchange can fail with; it is classified
//! for per-range retry before being wrapped into a `DownloadError`, which
//! names the stage that failed.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::segmenter::ByteRange;

/// Failure of a single HTTP exchange (probe, full GET or ranged GET).
#[derive(Debug, Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// A ranged GET came back with something other than 206 Partial Content.
    #[error("server ignored Range request (HTTP {0})")]
    RangeNotHonored(u32),
    /// Transfer completed but fewer bytes arrived than the range covers
    /// (e.g. server closed early).
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// The sink rejected the body (disk full, permission denied, overlong body).
    #[error("storage: {0}")]
    Sink(#[source] io::Error),
    /// The worker thread panicked before reporting a result.
    #[error("range worker panicked: {0}")]
    Panicked(String),
}

/// Failure of a whole `download` call.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// URL empty, unparseable, or not http(s).
    #[error("invalid download target {url:?}: {reason}")]
    InvalidTarget { url: String, reason: String },
    /// Sequential transfer failed (non-2xx status or network error).
    #[error("transfer of {url} failed: {source}")]
    Transfer {
        url: String,
        #[source]
        source: TransferError,
    },
    /// Creating, writing, syncing or renaming a local file failed.
    #[error("{action} {}: {source}", .path.display())]
    LocalIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// At least one range worker failed; reported after all workers were joined.
    #[error("{failed} of {workers} range workers failed, first at bytes {range}: {source}")]
    Worker {
        range: ByteRange,
        failed: usize,
        workers: usize,
        #[source]
        source: TransferError,
    },
}

impl DownloadError {
    pub(crate) fn local_io(action: &'static str, path: &Path, source: io::Error) -> Self {
        DownloadError::LocalIo {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Map a failed sequential transfer, keeping sink failures in the local I/O bucket.
    pub(crate) fn from_transfer(url: &str, path: &Path, err: TransferError) -> Self {
        match err {
            TransferError::Sink(source) => DownloadError::local_io("write", path, source),
            source => DownloadError::Transfer {
                url: url.to_string(),
                source,
            },
        }
    }

    /// Short name of the stage that failed, for terminal messages.
    pub fn stage(&self) -> &'static str {
        match self {
            DownloadError::InvalidTarget { .. } => "target",
            DownloadError::Transfer { .. } => "transfer",
            DownloadError::LocalIo { .. } => "local io",
            DownloadError::Worker { .. } => "range worker",
        }
    }
}
