mod region_summary;
mod request_outcome;

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::time::Instant;
use tracing::trace;

pub(crate) use region_summary::RegionSummary;
pub(crate) use request_outcome::{CompletionResult, RequestOutcome};

/// One report of a run in progress, keyed by region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct ResultBatch {
    pub regions: BTreeMap<String, RegionSummary>,
}

/// Folds request outcomes of a single region into result batches.
#[derive(Debug)]
pub(crate) struct Aggregator {
    region: String,
    started: Instant,
    summary: RegionSummary,
}

impl Aggregator {
    pub(crate) fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            started: Instant::now(),
            summary: RegionSummary::default(),
        }
    }

    pub(crate) fn record(&mut self, outcome: &RequestOutcome) {
        trace!(
            executor = outcome.executor_id,
            request = outcome.request_number,
            result = ?outcome.result,
            "request completed"
        );
        self.summary.record(outcome);
    }

    pub(crate) fn batch(&self) -> ResultBatch {
        let mut regions = BTreeMap::new();
        regions.insert(
            self.region.clone(),
            self.summary.snapshot(self.started.elapsed()),
        );
        ResultBatch { regions }
    }

    pub(crate) fn finish(mut self) -> ResultBatch {
        self.summary.finished = true;
        self.batch()
    }
}
