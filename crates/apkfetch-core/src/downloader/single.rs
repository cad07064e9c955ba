//! Single-stream HTTP GET downloader (no Range).
//!
//! Used when the server cannot be split into ranges or did not tell us the
//! size. Writes the body sequentially to the temp file and streams until EOF.

use std::io;
use std::path::Path;

use crate::error::DownloadError;
use crate::http::HttpClient;
use crate::progress::TransferProgress;
use crate::storage::{self, StorageWriterBuilder};

use super::commit;

/// Downloads `url` with one GET into `final_path`. Returns the number of bytes written.
pub(super) fn download_sequential<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    final_path: &Path,
    expected_len: Option<u64>,
    progress: &TransferProgress,
) -> Result<u64, DownloadError> {
    let temp_path = storage::temp_path(final_path);
    let writer = StorageWriterBuilder::create(&temp_path)
        .map_err(|e| DownloadError::local_io("create", &temp_path, e))?
        .build();
    if let Some(n) = expected_len {
        progress.set_total(n);
    }

    let mut offset = 0u64;
    let res = client.get(url, None, &mut |data: &[u8]| -> io::Result<()> {
        writer.write_at(offset, data)?;
        offset += data.len() as u64;
        progress.add(data.len() as u64);
        Ok(())
    });
    if let Err(e) = res {
        writer.discard();
        return Err(DownloadError::from_transfer(url, &temp_path, e));
    }

    match expected_len {
        Some(exp) if exp != offset => {
            tracing::warn!(url, expected = exp, written = offset, "body length differs from probed Content-Length");
        }
        _ => {}
    }
    progress.set_total(offset);

    commit(writer, final_path)?;
    Ok(offset)
}
