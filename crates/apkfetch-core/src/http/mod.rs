//! HTTP client seam used by the downloader.
//!
//! The downloader only needs a metadata probe and a streamed, optionally
//! ranged GET. `CurlClient` is the production implementation on libcurl.

mod curl_client;
mod parse;

#[cfg(test)]
pub(crate) mod memory;

use std::io;
use std::time::Duration;

use crate::error::TransferError;
use crate::segmenter::ByteRange;

pub use curl_client::CurlClient;
pub use parse::parse_headers;

/// Headers of a HEAD response that matter for strategy selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present and numeric.
    pub content_length: Option<u64>,
    /// True if `Accept-Ranges` lists the `bytes` unit.
    pub accept_ranges: bool,
}

/// Blocking HTTP client capable of a HEAD probe and streamed GETs.
///
/// Implementations follow redirects. Called concurrently from range worker
/// threads, one request per call.
pub trait HttpClient: Send + Sync {
    /// Metadata-only request bounded by `timeout`. Non-2xx is an error.
    fn head(&self, url: &str, timeout: Duration) -> Result<HeadResult, TransferError>;

    /// Streams the body of a GET into `sink` and returns the final status.
    ///
    /// Without `range` any 2xx is accepted; with `range` only 206 is, and the
    /// request carries `Range: bytes=<start>-<end>`. For any other status the
    /// sink is never called and `Http` / `RangeNotHonored` is returned. A sink
    /// error aborts the transfer and comes back as `TransferError::Sink`.
    fn get(
        &self,
        url: &str,
        range: Option<ByteRange>,
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<u32, TransferError>;
}

/// True if `code` is an acceptable final status for a GET.
pub(crate) fn status_accepted(code: u32, ranged: bool) -> bool {
    if ranged {
        code == 206
    } else {
        (200..300).contains(&code)
    }
}

/// Error for a GET whose final status was not accepted.
pub(crate) fn status_error(code: u32, ranged: bool) -> TransferError {
    if ranged && (200..300).contains(&code) {
        TransferError::RangeNotHonored(code)
    } else {
        TransferError::Http(code)
    }
}
