//! In-memory `HttpClient` for unit tests of strategy selection and workers.

use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::TransferError;
use crate::segmenter::ByteRange;

use super::{HeadResult, HttpClient};

/// Serves a fixed body. HEAD behaviour, range support and per-range failures
/// are configurable; every GET is recorded.
pub(crate) struct MemoryClient {
    body: Vec<u8>,
    head: Result<HeadResult, u32>,
    honor_ranges: bool,
    fail_range_at: Option<u64>,
    get_status: u32,
    chunk: usize,
    requests: Mutex<Vec<Option<ByteRange>>>,
}

impl MemoryClient {
    /// Range-capable server advertising the body's length.
    pub(crate) fn new(body: Vec<u8>) -> Self {
        let head = HeadResult {
            content_length: Some(body.len() as u64),
            accept_ranges: true,
            ..HeadResult::default()
        };
        Self {
            body,
            head: Ok(head),
            honor_ranges: true,
            fail_range_at: None,
            get_status: 200,
            chunk: 1000,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_head(mut self, head: HeadResult) -> Self {
        self.head = Ok(head);
        self
    }

    /// HEAD fails with this HTTP status.
    pub(crate) fn with_head_error(mut self, code: u32) -> Self {
        self.head = Err(code);
        self
    }

    /// Answer ranged GETs with 200 and the full body.
    pub(crate) fn ignoring_ranges(mut self) -> Self {
        self.honor_ranges = false;
        self
    }

    /// The ranged GET starting at `start` fails with HTTP 500.
    pub(crate) fn failing_range_at(mut self, start: u64) -> Self {
        self.fail_range_at = Some(start);
        self
    }

    /// Status for full (non-ranged) GETs.
    pub(crate) fn with_get_status(mut self, code: u32) -> Self {
        self.get_status = code;
        self
    }

    pub(crate) fn requests(&self) -> Vec<Option<ByteRange>> {
        self.requests.lock().unwrap().clone()
    }

    fn stream(
        &self,
        bytes: &[u8],
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<(), TransferError> {
        for piece in bytes.chunks(self.chunk) {
            sink(piece).map_err(TransferError::Sink)?;
        }
        Ok(())
    }
}

impl HttpClient for MemoryClient {
    fn head(&self, _url: &str, _timeout: Duration) -> Result<HeadResult, TransferError> {
        self.head.clone().map_err(TransferError::Http)
    }

    fn get(
        &self,
        _url: &str,
        range: Option<ByteRange>,
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<u32, TransferError> {
        self.requests.lock().unwrap().push(range);
        match range {
            None => {
                if !(200..300).contains(&self.get_status) {
                    return Err(TransferError::Http(self.get_status));
                }
                self.stream(&self.body, sink)?;
                Ok(self.get_status)
            }
            Some(r) if Some(r.start) == self.fail_range_at => Err(TransferError::Http(500)),
            Some(_) if !self.honor_ranges => Err(TransferError::RangeNotHonored(200)),
            Some(r) => {
                let end = (r.end as usize).min(self.body.len().saturating_sub(1));
                self.stream(&self.body[r.start as usize..=end], sink)?;
                Ok(206)
            }
        }
    }
}
