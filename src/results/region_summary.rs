use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use super::request_outcome::{CompletionResult, RequestOutcome};

/// Aggregated results of one region, as reported in every result batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct RegionSummary {
    pub total_requests: u64,
    pub total_timed_out: u64,
    pub total_conn_error: u64,
    pub bytes_read: u64,
    pub statuses: BTreeMap<u16, u64>,
    pub fastest_ms: f64,
    pub slowest_ms: f64,
    pub average_ms: f64,
    pub requests_per_second: f64,
    pub finished: bool,
    #[serde(skip)]
    total_ms: f64,
}

impl RegionSummary {
    pub fn record(&mut self, outcome: &RequestOutcome) {
        self.total_requests += 1;
        self.bytes_read += outcome.bytes_read;
        match outcome.result {
            CompletionResult::Status(status) => {
                *self.statuses.entry(status).or_default() += 1;
            }
            CompletionResult::TimedOut => self.total_timed_out += 1,
            CompletionResult::ConnectionError => self.total_conn_error += 1,
        }

        let elapsed_ms = outcome.elapsed_ms();
        if self.total_requests == 1 || elapsed_ms < self.fastest_ms {
            self.fastest_ms = elapsed_ms;
        }
        if elapsed_ms > self.slowest_ms {
            self.slowest_ms = elapsed_ms;
        }
        self.total_ms += elapsed_ms;
        self.average_ms = self.total_ms / self.total_requests as f64;
    }

    /// Copy of the summary with throughput computed over `elapsed`.
    pub fn snapshot(&self, elapsed: Duration) -> Self {
        let mut snapshot = self.clone();
        let seconds = elapsed.as_secs_f64();
        if seconds > 0f64 {
            snapshot.requests_per_second = self.total_requests as f64 / seconds;
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(ms: u64, result: CompletionResult) -> RequestOutcome {
        RequestOutcome {
            executor_id: 0,
            request_number: 0,
            elapsed: Duration::from_millis(ms),
            bytes_read: 10,
            result,
        }
    }

    #[test]
    fn counts_by_completion() {
        let mut summary = RegionSummary::default();
        summary.record(&outcome(10, CompletionResult::Status(200)));
        summary.record(&outcome(30, CompletionResult::Status(200)));
        summary.record(&outcome(20, CompletionResult::Status(503)));
        summary.record(&outcome(5, CompletionResult::TimedOut));
        summary.record(&outcome(1, CompletionResult::ConnectionError));

        assert_eq!(summary.total_requests, 5);
        assert_eq!(summary.statuses.get(&200), Some(&2));
        assert_eq!(summary.statuses.get(&503), Some(&1));
        assert_eq!(summary.total_timed_out, 1);
        assert_eq!(summary.total_conn_error, 1);
        assert_eq!(summary.bytes_read, 50);
    }

    #[test]
    fn tracks_latency_bounds() {
        let mut summary = RegionSummary::default();
        summary.record(&outcome(20, CompletionResult::Status(200)));
        summary.record(&outcome(10, CompletionResult::Status(200)));
        summary.record(&outcome(30, CompletionResult::Status(200)));

        assert_eq!(summary.fastest_ms, 10f64);
        assert_eq!(summary.slowest_ms, 30f64);
        assert_eq!(summary.average_ms, 20f64);
    }

    #[test]
    fn snapshot_computes_throughput() {
        let mut summary = RegionSummary::default();
        for _ in 0..10 {
            summary.record(&outcome(1, CompletionResult::Status(204)));
        }
        let snapshot = summary.snapshot(Duration::from_secs(2));
        assert_eq!(snapshot.requests_per_second, 5f64);
        assert_eq!(summary.requests_per_second, 0f64);
    }
}
