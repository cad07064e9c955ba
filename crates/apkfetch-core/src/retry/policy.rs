use std::time::Duration;

/// Why a range attempt failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    /// 429 or 503 from the mirror.
    Throttled,
    /// Connect/DNS/socket failure, empty reply, or a body cut short.
    Connection,
    /// 5xx other than 503.
    Http5xx(u16),
    /// 4xx, ignored Range, local I/O, worker panic.
    Other,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Capped exponential backoff for one range. Built from the `[retry]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per range, the first one included.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Doubling stops after this many steps; `max_delay` usually caps earlier.
const MAX_DOUBLINGS: u32 = 8;

impl RetryPolicy {
    /// Wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(MAX_DOUBLINGS);
        self.base_delay
            .saturating_mul(1 << doublings)
            .min(self.max_delay)
    }

    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt < self.max_attempts && kind.is_retryable() {
            RetryDecision::RetryAfter(self.backoff(attempt))
        } else {
            RetryDecision::NoRetry
        }
    }
}
