use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::batch_executor::{BatchExecutor, Signal};
use crate::batcher;
use crate::config::RunConfig;
use crate::request::Target;
use crate::results::{Aggregator, RequestOutcome, ResultBatch};

/// Action that stops a run and releases what it holds.
pub(crate) type Teardown = Box<dyn FnOnce() + Send>;

/// A started run: result batches arrive on `results` until the run is over.
pub(crate) struct Run {
    pub(crate) results: mpsc::Receiver<ResultBatch>,
    pub(crate) teardown: Teardown,
}

/// Executes a resolved configuration.
#[async_trait]
pub(crate) trait Engine {
    async fn start(&self, config: RunConfig) -> anyhow::Result<Run>;
}

const LOCAL_REGION: &str = "local";

/// Sends all requests from this process.
#[derive(Debug, Clone)]
pub(crate) struct LocalEngine {
    report_interval: Duration,
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_secs(1),
        }
    }
}

#[async_trait]
impl Engine for LocalEngine {
    async fn start(&self, config: RunConfig) -> anyhow::Result<Run> {
        let target = Target::try_from(&config)?;
        if config.run_docker {
            warn!("container execution is not available, running in-process");
        }
        if !config.runner_path.is_empty() {
            info!(runner = %config.runner_path, "runner is only used by remote backends");
        }
        info!(regions = ?config.regions, "reporting all requests under region {}", LOCAL_REGION);

        // creating a client is an expensive task
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .no_proxy()
            .build()
            .context("error creating http client")?;

        let (signal_sender, signal_receiver) = watch::channel(Signal::Waiting);
        let (outcome_sender, mut outcome_receiver) = mpsc::unbounded_channel();
        let (batch_sender, batch_receiver) = mpsc::channel(16);

        let executors = create_executors(
            &config,
            target,
            client,
            signal_receiver,
            outcome_sender,
        );
        info!("executors created");
        signal_sender
            .send(Signal::Go)
            .context("error sending start signal")?;

        let report_interval = self.report_interval;
        tokio::spawn(async move {
            let mut aggregator = Aggregator::new(LOCAL_REGION);
            let mut ticker = tokio::time::interval_at(
                Instant::now() + report_interval,
                report_interval,
            );
            // closes once every executor dropped its sender
            loop {
                tokio::select! {
                    outcome = outcome_receiver.recv() => match outcome {
                        Some(outcome) => aggregator.record(&outcome),
                        None => break,
                    },
                    _ = ticker.tick() => {
                        if batch_sender.send(aggregator.batch()).await.is_err() {
                            return;
                        }
                    }
                }
            }
            let _ = batch_sender.send(aggregator.finish()).await;
        });

        let teardown: Teardown = Box::new(move || {
            let _ = signal_sender.send(Signal::Stop);
            executors.iter().for_each(JoinHandle::abort);
            info!("teardown done");
        });

        Ok(Run {
            results: batch_receiver,
            teardown,
        })
    }
}

#[instrument(skip_all, fields(concurrency = config.concurrency, requests = config.requests))]
fn create_executors(
    config: &RunConfig,
    target: Target,
    client: reqwest::Client,
    signal_receiver: watch::Receiver<Signal>,
    outcome_sender: mpsc::UnboundedSender<RequestOutcome>,
) -> FuturesUnordered<JoinHandle<()>> {
    let total = match config.requests {
        0 => usize::MAX,
        n => usize::try_from(n).unwrap_or(usize::MAX),
    };
    let workers = config.concurrency.max(1);
    let slots = std::iter::repeat(()).take(total);
    let deadline = Instant::now() + Duration::from_secs(config.timelimit);

    let executors = FuturesUnordered::new();
    for (id, batch) in batcher::split(&slots, workers).into_iter().enumerate() {
        let executor = BatchExecutor::new(
            id,
            workers,
            batch,
            target.clone(),
            client.clone(),
            deadline,
            outcome_sender.clone(),
        );
        let rx = signal_receiver.clone();
        executors.push(tokio::spawn(async move {
            executor.start(rx).await;
        }));
    }
    executors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_target(requests: u64, concurrency: usize) -> RunConfig {
        RunConfig {
            // nothing listens on port 1
            url: "http://127.0.0.1:1/".into(),
            method: "GET".into(),
            concurrency,
            requests,
            timelimit: 30,
            timeout: 5,
            ..RunConfig::default()
        }
    }

    async fn last_batch(mut run: Run) -> ResultBatch {
        let mut last = None;
        while let Some(batch) = run.results.recv().await {
            last = Some(batch);
        }
        (run.teardown)();
        last.expect("at least one result batch")
    }

    #[tokio::test]
    async fn every_request_slot_is_reported() {
        let run = LocalEngine::default()
            .start(unreachable_target(5, 2))
            .await
            .unwrap();
        let last = last_batch(run).await;

        let local = &last.regions[LOCAL_REGION];
        assert!(local.finished);
        assert_eq!(local.total_requests, 5);
        assert_eq!(local.total_conn_error, 5);
    }

    #[tokio::test]
    async fn unlimited_requests_stop_at_the_time_limit() {
        let mut config = unreachable_target(0, 1);
        config.timelimit = 1;
        let run = LocalEngine::default().start(config).await.unwrap();
        let last = last_batch(run).await;

        assert!(last.regions[LOCAL_REGION].finished);
        assert!(last.regions[LOCAL_REGION].total_requests > 0);
    }

    #[tokio::test]
    async fn invalid_method_fails_to_start() {
        let mut config = unreachable_target(1, 1);
        config.method = "NOT A METHOD".into();
        assert!(LocalEngine::default().start(config).await.is_err());
    }
}
