//! libcurl-backed `HttpClient`: one Easy handle per request.

use std::cell::Cell;
use std::io;
use std::str;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::TransferError;
use crate::segmenter::ByteRange;

use super::parse::{parse_headers, parse_status_line};
use super::{status_accepted, status_error, HeadResult, HttpClient};

const MAX_REDIRECTIONS: u32 = 10;

/// Blocking HTTP client on libcurl. Cheap to share across range worker threads.
#[derive(Debug, Clone)]
pub struct CurlClient {
    headers: Vec<(String, String)>,
    user_agent: Option<String>,
    buffer_size: usize,
}

impl Default for CurlClient {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

impl CurlClient {
    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self {
            headers: cfg
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            user_agent: cfg.user_agent.clone(),
            buffer_size: cfg.buffer_size,
        }
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Easy handle with the settings shared by HEAD and GET.
    fn easy(&self, url: &str) -> Result<curl::easy::Easy, TransferError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }
        if !self.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in &self.headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))?;
            }
            easy.http_headers(list)?;
        }
        Ok(easy)
    }
}

impl HttpClient for CurlClient {
    fn head(&self, url: &str, timeout: Duration) -> Result<HeadResult, TransferError> {
        let mut lines: Vec<String> = Vec::new();

        let mut easy = self.easy(url)?;
        easy.nobody(true)?;
        easy.timeout(timeout)?;
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }
        Ok(parse_headers(&lines))
    }

    fn get(
        &self,
        url: &str,
        range: Option<ByteRange>,
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<u32, TransferError> {
        let ranged = range.is_some();
        let status = Cell::new(0u32);
        let mut sink_error: Option<io::Error> = None;

        let mut easy = self.easy(url)?;
        easy.buffer_size(self.buffer_size)?;
        if let Some(range) = range {
            easy.range(&range.curl_range())?;
        }

        let performed = {
            let mut transfer = easy.transfer();
            // Status lines arrive once per redirect hop; the last one is the response we stream.
            transfer.header_function(|data| {
                if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| {
                let code = status.get();
                if (300..400).contains(&code) {
                    // Body of a redirect hop.
                    return Ok(data.len());
                }
                if !status_accepted(code, ranged) {
                    return Ok(0);
                }
                match sink(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        sink_error = Some(e);
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = sink_error {
            return Err(TransferError::Sink(e));
        }
        // Code 0: no response arrived, so the curl error is the real cause.
        let code = easy.response_code()?;
        if code != 0 && !status_accepted(code, ranged) {
            return Err(status_error(code, ranged));
        }
        performed?;
        if !status_accepted(code, ranged) {
            return Err(status_error(code, ranged));
        }
        Ok(code)
    }
}
