//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body, one request per connection. Responds to HEAD
//! with Content-Length and Accept-Ranges: bytes; responds to GET with Range
//! with 206 Partial Content. Requests under `/moved` get a 302 to `/`.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If false, omit `Accept-Ranges: bytes`.
    pub advertise_ranges: bool,
    /// If false, omit Content-Length everywhere and close the connection to end the body.
    pub send_length: bool,
    /// If set, every HEAD and GET is answered with this status and an empty body.
    pub force_status: Option<u16>,
    /// If set, HEAD responses are held back this long (simulates a stalled probe).
    pub head_delay: Option<Duration>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            support_ranges: true,
            advertise_ranges: true,
            send_length: true,
            force_status: None,
            head_delay: None,
        }
    }
}

/// Handle to a running server.
pub struct RangeServer {
    pub base_url: String,
    ranged_gets: Arc<AtomicUsize>,
}

impl RangeServer {
    /// URL of the served file.
    pub fn url(&self) -> String {
        format!("{}file.xapk", self.base_url)
    }

    /// URL that redirects to the served file.
    pub fn moved_url(&self) -> String {
        format!("{}moved/file.xapk", self.base_url)
    }

    /// Number of GET requests that carried a Range header.
    pub fn ranged_gets(&self) -> usize {
        self.ranged_gets.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`.
/// The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior (HEAD blocked, ranges missing, etc.).
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let ranged_gets = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ranged_gets);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let counter = Arc::clone(&counter);
            thread::spawn(move || handle(stream, &body, opts, &counter));
        }
    });
    RangeServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        ranged_gets,
    }
}

struct Request<'a> {
    method: &'a str,
    path: &'a str,
    range: Option<(u64, u64)>,
}

fn handle(mut stream: TcpStream, body: &[u8], opts: RangeServerOptions, ranged_gets: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let raw = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let req = parse_request(raw);
    let is_head = req.method.eq_ignore_ascii_case("HEAD");
    let is_get = req.method.eq_ignore_ascii_case("GET");

    if !is_head && !is_get {
        write_empty(&mut stream, "405 Method Not Allowed");
        return;
    }
    if req.path.starts_with("/moved") {
        let _ = stream.write_all(
            b"HTTP/1.1 302 Found\r\nLocation: /file.xapk\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }
    if let Some(code) = opts.force_status {
        write_empty(&mut stream, &format!("{} Forced", code));
        return;
    }
    if is_head && !opts.head_allowed {
        write_empty(&mut stream, "405 Method Not Allowed");
        return;
    }

    let total = body.len() as u64;
    let accept_ranges = if opts.advertise_ranges {
        "Accept-Ranges: bytes\r\n"
    } else {
        ""
    };

    if is_head {
        if let Some(delay) = opts.head_delay {
            thread::sleep(delay);
        }
        let length = if opts.send_length {
            format!("Content-Length: {}\r\n", total)
        } else {
            String::new()
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\n{}{}Connection: close\r\n\r\n",
            length, accept_ranges
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if req.range.is_some() {
        ranged_gets.fetch_add(1, Ordering::SeqCst);
    }
    let (status, content_range, slice) = match req.range.filter(|_| opts.support_ranges) {
        Some((start, end_incl)) => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl || start >= total {
                let response = format!(
                    "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    total
                );
                let _ = stream.write_all(response.as_bytes());
                return;
            }
            (
                "206 Partial Content",
                format!("Content-Range: bytes {}-{}/{}\r\n", start, end_incl, total),
                &body[start as usize..=end_incl as usize],
            )
        }
        None => ("200 OK", String::new(), body),
    };
    let length = if opts.send_length {
        format!("Content-Length: {}\r\n", slice.len())
    } else {
        String::new()
    };
    let response = format!(
        "HTTP/1.1 {}\r\n{}{}{}Connection: close\r\n\r\n",
        status, length, content_range, accept_ranges
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

fn write_empty(stream: &mut TcpStream, status: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Method, path and optional (start, end_inclusive) for `Range: bytes=X-Y`.
fn parse_request(request: &str) -> Request<'_> {
    let mut req = Request {
        method: "",
        path: "/",
        range: None,
    };
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if req.method.is_empty() {
            let mut parts = line.split_whitespace();
            req.method = parts.next().unwrap_or("");
            req.path = parts.next().unwrap_or("/");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if let Some(spec) = value.strip_prefix("bytes=") {
                    if let Some((a, b)) = spec.split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end = b.trim();
                        let end_incl = if end.is_empty() {
                            u64::MAX
                        } else {
                            end.parse::<u64>().unwrap_or(0)
                        };
                        req.range = Some((start, end_incl));
                    }
                }
            }
        }
    }
    req
}
