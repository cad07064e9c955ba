//! Metadata probe: learn size and range support without fetching the body.
//!
//! A failed probe is not an error for the caller. It is logged and the
//! downloader falls back to a single sequential GET.

use std::time::Duration;

use crate::http::{HeadResult, HttpClient};

/// What the server told us about the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentProbe {
    /// Size in bytes; 0 when `Content-Length` was missing or unparseable.
    pub total_size: u64,
    /// Server advertised `Accept-Ranges: bytes`.
    pub supports_ranges: bool,
}

impl From<&HeadResult> for ContentProbe {
    fn from(head: &HeadResult) -> Self {
        Self {
            total_size: head.content_length.unwrap_or(0),
            supports_ranges: head.accept_ranges,
        }
    }
}

impl ContentProbe {
    /// True if the resource can be split into concurrent ranged GETs.
    pub fn can_partition(&self) -> bool {
        self.total_size > 0 && self.supports_ranges
    }
}

/// HEAD `url` with `timeout`. Any failure yields `None`.
pub fn probe<C: HttpClient + ?Sized>(client: &C, url: &str, timeout: Duration) -> Option<ContentProbe> {
    match client.head(url, timeout) {
        Ok(head) => {
            let probe = ContentProbe::from(&head);
            tracing::debug!(
                url,
                total_size = probe.total_size,
                supports_ranges = probe.supports_ranges,
                "metadata probe"
            );
            Some(probe)
        }
        Err(e) => {
            tracing::warn!(url, "metadata probe failed, falling back to sequential download: {}", e);
            None
        }
    }
}
