use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompletionResult {
    /// A response arrived, whatever its status.
    Status(u16),
    TimedOut,
    ConnectionError,
}

#[derive(Debug, Clone)]
pub(crate) struct RequestOutcome {
    pub(crate) executor_id: usize,
    pub(crate) request_number: usize,
    pub(crate) elapsed: Duration,
    pub(crate) bytes_read: u64,
    pub(crate) result: CompletionResult,
}

impl RequestOutcome {
    pub(crate) fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_micros() as f64 / 1000_f64
    }
}

impl From<&reqwest::Error> for CompletionResult {
    fn from(value: &reqwest::Error) -> Self {
        if value.is_timeout() {
            CompletionResult::TimedOut
        } else {
            CompletionResult::ConnectionError
        }
    }
}
