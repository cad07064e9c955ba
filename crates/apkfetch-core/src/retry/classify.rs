//! Map a failed range attempt to an `ErrorKind`.

use crate::error::TransferError;
use crate::retry::policy::ErrorKind;

pub fn classify(e: &TransferError) -> ErrorKind {
    match e {
        TransferError::Curl(ce) => curl_kind(ce),
        TransferError::Http(code) => status_kind(*code),
        TransferError::PartialTransfer { .. } => ErrorKind::Connection,
        TransferError::RangeNotHonored(_) | TransferError::Sink(_) | TransferError::Panicked(_) => {
            ErrorKind::Other
        }
    }
}

fn status_kind(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

fn curl_kind(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        ErrorKind::Timeout
    } else if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_got_nothing()
        || e.is_send_error()
        || e.is_recv_error()
        || e.is_read_error()
        || e.is_partial_file()
    {
        ErrorKind::Connection
    } else {
        ErrorKind::Other
    }
}
