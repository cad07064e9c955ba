pub mod config;
pub mod logging;

pub mod downloader;
pub mod error;
pub mod http;
pub mod probe;
pub mod progress;
pub mod retry;
pub mod segmenter;
pub mod storage;
pub mod unpack;

pub use downloader::{DownloadOutcome, DownloadTarget, PartitionedDownloader, Strategy};
pub use error::{DownloadError, TransferError};
pub use progress::{ProgressStats, TransferProgress};
