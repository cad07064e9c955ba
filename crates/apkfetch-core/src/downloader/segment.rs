//! Single-range HTTP GET written to storage at the range offset.

use std::io;

use crate::error::TransferError;
use crate::http::HttpClient;
use crate::progress::TransferProgress;
use crate::segmenter::ByteRange;
use crate::storage::StorageWriter;

/// Downloads one range: GET with `Range`, write body to `storage` starting at
/// `range.start`. Bytes are added to `progress` as they land and taken back if
/// the attempt fails, so a retry does not count them twice.
pub(super) fn fetch_range<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    range: ByteRange,
    storage: &StorageWriter,
    progress: &TransferProgress,
) -> Result<(), TransferError> {
    let expected = range.len();
    let mut received = 0u64;

    let res = client.get(url, Some(range), &mut |data: &[u8]| -> io::Result<()> {
        let n = data.len() as u64;
        if received + n > expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("server sent more than {} bytes for range {}", expected, range),
            ));
        }
        storage.write_at(range.start + received, data)?;
        received += n;
        progress.add(n);
        Ok(())
    });

    let outcome = match res {
        Ok(_) if received != expected => Err(TransferError::PartialTransfer { expected, received }),
        Ok(_) => Ok(()),
        Err(e) => Err(e),
    };
    if outcome.is_err() {
        progress.rewind(received);
    }
    outcome
}
