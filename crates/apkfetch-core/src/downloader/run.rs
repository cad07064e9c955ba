//! Partitioned execution: one worker thread per range, each on its own file handle.

use std::any::Any;
use std::path::Path;
use std::thread;

use crate::error::{DownloadError, TransferError};
use crate::http::HttpClient;
use crate::progress::TransferProgress;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::segmenter::ByteRange;
use crate::storage::{self, StorageWriter, StorageWriterBuilder};

use super::commit;
use super::segment;

/// Downloads `ranges` (covering `total_size` bytes) concurrently into `final_path`.
///
/// The temp file is sized to `total_size` before any worker starts. Every
/// worker is joined before the outcome is decided; if any failed, the temp
/// file is removed and the first failure in range order is returned.
pub(super) fn download_partitioned<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    final_path: &Path,
    total_size: u64,
    ranges: &[ByteRange],
    retry_policy: Option<&RetryPolicy>,
    progress: &TransferProgress,
) -> Result<u64, DownloadError> {
    let temp_path = storage::temp_path(final_path);
    let mut builder = StorageWriterBuilder::create(&temp_path)
        .map_err(|e| DownloadError::local_io("create", &temp_path, e))?;
    if let Err(e) = builder.preallocate(total_size) {
        builder.build().discard();
        return Err(DownloadError::local_io("preallocate", &temp_path, e));
    }
    let storage = builder.build();

    let handles = match ranges
        .iter()
        .map(|_| storage.reopen())
        .collect::<std::io::Result<Vec<StorageWriter>>>()
    {
        Ok(h) => h,
        Err(e) => {
            storage.discard();
            return Err(DownloadError::local_io("open", &temp_path, e));
        }
    };
    progress.set_total(total_size);

    let results: Vec<(ByteRange, Result<(), TransferError>)> = thread::scope(|s| {
        let workers: Vec<_> = ranges
            .iter()
            .copied()
            .zip(handles)
            .map(|(range, handle)| {
                let join = s.spawn(move || {
                    tracing::debug!(%range, "range worker started");
                    match retry_policy {
                        Some(p) => run_with_retry(p, || {
                            segment::fetch_range(client, url, range, &handle, progress)
                        }),
                        None => segment::fetch_range(client, url, range, &handle, progress),
                    }
                });
                (range, join)
            })
            .collect();

        workers
            .into_iter()
            .map(|(range, join)| {
                let res = join
                    .join()
                    .unwrap_or_else(|payload| Err(TransferError::Panicked(panic_message(payload))));
                (range, res)
            })
            .collect()
    });

    let mut failed = 0usize;
    let mut first_error: Option<(ByteRange, TransferError)> = None;
    for (range, res) in results {
        match res {
            Ok(()) => tracing::debug!(%range, "range complete"),
            Err(e) => {
                tracing::warn!(%range, "range failed: {}", e);
                failed += 1;
                if first_error.is_none() {
                    first_error = Some((range, e));
                }
            }
        }
    }

    if let Some((range, source)) = first_error {
        storage.discard();
        return Err(DownloadError::Worker {
            range,
            failed,
            workers: ranges.len(),
            source,
        });
    }

    commit(storage, final_path)?;
    Ok(total_size)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
