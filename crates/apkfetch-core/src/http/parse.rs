//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Status code from a status line such as `HTTP/1.1 206 Partial Content`.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Parse collected header lines into HeadResult.
///
/// Only the last response counts: a status line (as seen after each redirect
/// hop) discards everything gathered before it.
pub fn parse_headers(lines: &[String]) -> HeadResult {
    let mut head = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if parse_status_line(line).is_some() {
            head = HeadResult::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                head.content_length = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case("accept-ranges") {
                head.accept_ranges = value
                    .split(',')
                    .any(|unit| unit.trim().eq_ignore_ascii_case("bytes"));
            }
        }
    }

    head
}
